//! Single-cue preview against an idle console.

use std::path::PathBuf;

use clap::Args;
use dcaplot_core::config::Config;
use dcaplot_core::tracker;
use dcaplot_types::LiveState;

use crate::render::format_action;

#[derive(Args)]
pub struct PreviewArgs {
    /// Show file
    #[arg(value_name = "SHOW")]
    show: PathBuf,

    /// Cue id to preview
    #[arg(long, value_name = "ID")]
    cue: u32,
}

pub fn run(args: PreviewArgs, config: &Config) -> anyhow::Result<()> {
    let show = super::open_show(&args.show, config)?;
    let id = super::find_record(&show, args.cue)?;
    let target = show
        .target_for(id)
        .ok_or_else(|| anyhow::anyhow!("no cue {} in this show", id))?;

    let live = LiveState::new(show.bus_count());
    let actions = tracker::diff(&target, &live, &show.resolver());

    if actions.is_empty() {
        println!("Cue {} changes nothing.", id);
        return Ok(());
    }
    for action in &actions {
        println!("{}", format_action(action, &show.session));
    }
    Ok(())
}
