//! Resolved cue listing.

use std::path::PathBuf;

use clap::Args;
use dcaplot_core::config::Config;

use crate::render::{format_record_header, format_resolved_bus};

#[derive(Args)]
pub struct PlanArgs {
    /// Show file
    #[arg(value_name = "SHOW")]
    show: PathBuf,

    /// Include buses with nothing on them
    #[arg(long)]
    all: bool,
}

pub fn run(args: PlanArgs, config: &Config) -> anyhow::Result<()> {
    let show = super::open_show(&args.show, config)?;

    if show.ledger.is_empty() {
        println!("No cues.");
        return Ok(());
    }

    for slot in show.ledger.records() {
        println!("{}", format_record_header(slot));
        for (i, bus) in slot.buses.iter().enumerate() {
            if !args.all && bus.entries.is_empty() && bus.explicit_name.is_none() {
                continue;
            }
            println!("{}", format_resolved_bus(i, bus, &show.session));
        }
        println!();
    }
    Ok(())
}
