//! Show files: the authored session and cue list as pretty-printed JSON.
//!
//! Only authored data is stored. Resolved bus state is re-derived by replaying records in
//! order on load.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use dcaplot_types::{BusDelta, RecordId, RecordKind, SessionConfig};

use crate::error::{ShowError, ShowResult};
use crate::state::{ShowSettings, ShowState};

pub const SHOW_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ShowFile {
    version: u32,
    session: SessionConfig,
    #[serde(default)]
    records: Vec<RecordFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RecordFile {
    id: RecordId,
    #[serde(default)]
    label: String,
    #[serde(flatten)]
    data: RecordData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RecordData {
    Reset { new_name: String },
    Change { buses: Vec<BusDelta> },
}

impl From<&RecordKind> for RecordData {
    fn from(kind: &RecordKind) -> Self {
        match kind {
            RecordKind::Reset { new_name } => RecordData::Reset {
                new_name: new_name.clone(),
            },
            RecordKind::Change { deltas } => RecordData::Change {
                buses: deltas.clone(),
            },
        }
    }
}

impl From<RecordData> for RecordKind {
    fn from(data: RecordData) -> Self {
        match data {
            RecordData::Reset { new_name } => RecordKind::Reset { new_name },
            RecordData::Change { buses } => RecordKind::Change { deltas: buses },
        }
    }
}

/// Load a show, rebuilding the ledger from its records.
pub fn load_show(path: &Path, settings: ShowSettings) -> ShowResult<ShowState> {
    let contents = fs::read_to_string(path).map_err(|source| ShowError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let show = parse_show(&contents, settings)?;
    log::info!(
        target: "show",
        "loaded {} records on {} buses from {}",
        show.ledger.len(),
        show.bus_count(),
        path.display()
    );
    Ok(show)
}

/// Parse a show document.
pub fn parse_show(contents: &str, settings: ShowSettings) -> ShowResult<ShowState> {
    let file: ShowFile = serde_json::from_str(contents)?;
    if file.version > SHOW_FILE_VERSION {
        return Err(ShowError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut session = file.session;
    session.bus_count = session.bus_count.min(dcaplot_types::MAX_BUSES);
    let mut show = ShowState::new(session, settings);
    for record in file.records {
        if !show.restore(record.id, record.label, record.data.into()) {
            return Err(ShowError::DuplicateRecord(record.id));
        }
    }
    Ok(show)
}

/// Serialise a show to the on-disk document.
pub fn show_to_string(show: &ShowState) -> ShowResult<String> {
    let file = ShowFile {
        version: SHOW_FILE_VERSION,
        session: show.session.clone(),
        records: show
            .ledger
            .records()
            .iter()
            .map(|slot| RecordFile {
                id: slot.id,
                label: slot.label.clone(),
                data: RecordData::from(&slot.kind),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

/// Write a show, creating parent directories as needed.
pub fn save_show(path: &Path, show: &ShowState) -> ShowResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ShowError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = show_to_string(show)?;
    fs::write(path, json).map_err(|source| ShowError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(target: "show", "saved {} records to {}", show.ledger.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcaplot_types::{AssignState, Assignment, BusIndex, ChoirConfig};

    const SAMPLE: &str = r#"{
        "version": 1,
        "session": {
            "bus_count": 2,
            "inputs": [{"number": 1, "name": "Hamlet"}],
            "choirs": [{"id": 1, "name": "Chorus", "members": [["input", 4], ["input", 5]]}]
        },
        "records": [
            {"id": 1, "label": "Act 1", "buses": [{"name": "Leads", "add": [["input", 1]]}, {"name": null}]},
            {"id": 2, "buses": [{"name": null, "add": [["choir", 1]]}]},
            {"id": 3, "label": "Blackout", "new_name": "Off"}
        ]
    }"#;

    #[test]
    fn parses_sample_and_rebuilds_ledger() {
        let show = parse_show(SAMPLE, ShowSettings::default()).unwrap();
        assert_eq!(show.bus_count(), 2);
        assert_eq!(show.ledger.len(), 3);
        assert_eq!(show.session.display_name(Assignment::input(1)), "Hamlet");

        let second = show.ledger.record(RecordId::new(2)).unwrap();
        let bus0 = second.bus(BusIndex::new(0)).unwrap();
        assert_eq!(bus0.name(), "Leads");
        let inherited = bus0.entry(Assignment::input(1)).unwrap();
        assert_eq!(inherited.state, AssignState::None);
        assert!(inherited.inherited);

        assert!(show.ledger.record(RecordId::new(3)).unwrap().is_reset());
        assert_eq!(show.ledger.record(RecordId::new(1)).unwrap().label, "Act 1");
    }

    #[test]
    fn save_then_load_preserves_authored_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("show.json");

        let mut show = parse_show(SAMPLE, ShowSettings::default()).unwrap();
        show.session.groups.choirs.push(ChoirConfig {
            id: 2,
            name: "Band".into(),
            members: vec![Assignment::fx(1)],
        });
        save_show(&path, &show).unwrap();

        let loaded = load_show(&path, ShowSettings::default()).unwrap();
        assert_eq!(loaded.session, show.session);
        assert_eq!(loaded.ledger, show.ledger);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        match load_show(&path, ShowSettings::default()) {
            Err(ShowError::FileRead { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected FileRead, got {:?}", other.map(|s| s.ledger.len())),
        }
    }

    #[test]
    fn newer_version_is_rejected() {
        let doc = r#"{"version": 99, "session": {"bus_count": 1}}"#;
        assert!(matches!(
            parse_show(doc, ShowSettings::default()),
            Err(ShowError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doc = r#"{"version": 1, "session": {"bus_count": 1},
            "records": [{"id": 4, "new_name": "A"}, {"id": 4, "new_name": "B"}]}"#;
        assert!(matches!(
            parse_show(doc, ShowSettings::default()),
            Err(ShowError::DuplicateRecord(id)) if id == RecordId::new(4)
        ));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            parse_show("{", ShowSettings::default()),
            Err(ShowError::Json(_))
        ));
    }
}
