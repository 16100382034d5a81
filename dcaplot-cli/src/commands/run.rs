//! Sequential cue execution.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use dcaplot_core::config::{Config, SinkKind};
use dcaplot_core::coordinator::CueHandle;
use dcaplot_core::sink::{ActionSink, LogSink};

use crate::render::format_action;

#[derive(Args)]
pub struct RunArgs {
    /// Show file
    #[arg(value_name = "SHOW")]
    show: PathBuf,

    /// Stop after this cue
    #[arg(long, value_name = "ID")]
    until: Option<u32>,
}

pub fn run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let show = super::open_show(&args.show, config)?;
    let until = args
        .until
        .map(|id| super::find_record(&show, id))
        .transpose()?;

    let sink: Option<Arc<dyn ActionSink>> = match config.sink() {
        SinkKind::Log => Some(Arc::new(LogSink)),
        SinkKind::None => None,
    };
    let cues = CueHandle::new(show.bus_count(), show.resolver(), sink);

    let mut failures = 0;
    for slot in show.ledger.records() {
        let Some(target) = show.target_for(slot.id) else {
            continue;
        };
        let report = cues
            .execute_blocking(target, show.is_last(slot.id))
            .map_err(anyhow::Error::msg)?;

        println!("Cue {} {}", slot.id, slot.label);
        for action in &report.delivered {
            println!("  {}", format_action(action, &show.session));
        }
        for (action, reason) in &report.failed {
            println!("  FAILED {}: {}", format_action(action, &show.session), reason);
        }
        failures += report.failed.len();

        if until == Some(slot.id) {
            break;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} actions failed", failures);
    }
    Ok(())
}
