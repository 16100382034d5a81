//! Authored show state: session configuration, the cue ledger and per-show settings.
//!
//! Live surface state is not here; it belongs to the coordinator.

use dcaplot_types::{BusDelta, RecordId, RecordKind, SessionConfig, SourceKind};

use crate::ledger::Ledger;
use crate::resolver::GroupResolver;
use crate::tracker::CueTarget;

/// Behaviour switches read from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowSettings {
    /// Resolve cues against everything before them. Off means a cue applies only its own deltas.
    pub track_inheritance: bool,
    /// Name unnamed buses after their single added assignment.
    pub auto_name_buses: bool,
}

impl Default for ShowSettings {
    fn default() -> Self {
        Self {
            track_inheritance: true,
            auto_name_buses: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShowState {
    pub session: SessionConfig,
    pub ledger: Ledger,
    pub settings: ShowSettings,
    next_id: u32,
}

impl ShowState {
    pub fn new(session: SessionConfig, settings: ShowSettings) -> Self {
        let ledger = Ledger::new(session.bus_count);
        Self {
            session,
            ledger,
            settings,
            next_id: 1,
        }
    }

    pub fn bus_count(&self) -> usize {
        self.session.bus_count
    }

    /// Next unused record id. Ids are never reused within a session.
    pub fn allocate_id(&mut self) -> RecordId {
        let floor = self.ledger.max_id().map(|id| id.get() + 1).unwrap_or(1);
        let id = RecordId::new(self.next_id.max(floor));
        self.next_id = id.get() + 1;
        id
    }

    /// Append a record with a known id, as when loading a show. Returns false for a duplicate.
    pub fn restore(&mut self, id: RecordId, label: impl Into<String>, kind: RecordKind) -> bool {
        let added = self.ledger.append(id, label, kind);
        if added {
            self.next_id = self.next_id.max(id.get() + 1);
        }
        added
    }

    /// What executing `id` should make the surface look like.
    pub fn target_for(&self, id: RecordId) -> Option<CueTarget> {
        self.ledger
            .record(id)
            .map(|slot| CueTarget::from_slot(slot, self.settings.track_inheritance))
    }

    pub fn is_last(&self, id: RecordId) -> bool {
        self.ledger.is_last(id)
    }

    /// A resolver over this show's groups.
    pub fn resolver(&self) -> GroupResolver {
        GroupResolver::new(self.session.groups.clone())
    }

    /// Fill in names for unnamed buses with exactly one added individual or role.
    /// Returns how many buses were named. No-op unless `auto_name_buses` is set.
    pub fn auto_name(&self, deltas: &mut [BusDelta]) -> usize {
        if !self.settings.auto_name_buses {
            return 0;
        }
        let mut named = 0;
        for delta in deltas.iter_mut().filter(|d| d.name.is_none()) {
            if let [only] = delta.add.as_slice() {
                if only.kind() != SourceKind::Choir {
                    delta.name = Some(self.session.display_name(*only));
                    named += 1;
                }
            }
        }
        named
    }
}

impl Default for ShowState {
    fn default() -> Self {
        Self::new(SessionConfig::default(), ShowSettings::default())
    }
}
