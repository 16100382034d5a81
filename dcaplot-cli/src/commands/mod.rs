pub mod init;
pub mod plan;
pub mod preview;
pub mod run;

use std::path::Path;

use anyhow::Context;
use dcaplot_core::config::Config;
use dcaplot_core::persistence::load_show;
use dcaplot_core::state::ShowState;
use dcaplot_types::RecordId;

/// Load a show with settings from `config`.
pub fn open_show(path: &Path, config: &Config) -> anyhow::Result<ShowState> {
    load_show(path, config.settings()).with_context(|| format!("opening show {}", path.display()))
}

/// Check that `id` names a record in `show`.
pub fn find_record(show: &ShowState, id: u32) -> anyhow::Result<RecordId> {
    let id = RecordId::new(id);
    if show.ledger.record(id).is_none() {
        anyhow::bail!("no cue {} in this show", id);
    }
    Ok(id)
}
