//! Show creation command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use dcaplot_core::config::Config;
use dcaplot_core::persistence::save_show;
use dcaplot_core::state::ShowState;
use dcaplot_types::{SessionConfig, MAX_BUSES};

#[derive(Args)]
pub struct InitArgs {
    /// Show file to create
    #[arg(value_name = "SHOW")]
    show: PathBuf,

    /// Number of DCA buses (defaults to the configured bus count)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_BUSES as i64))]
    buses: Option<u16>,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: InitArgs, config: &Config) -> anyhow::Result<()> {
    if args.show.exists() && !args.force {
        anyhow::bail!("{} already exists (use --force to overwrite)", args.show.display());
    }

    let bus_count = args
        .buses
        .map(usize::from)
        .unwrap_or_else(|| config.default_bus_count());
    let show = ShowState::new(SessionConfig::new(bus_count), config.settings());
    save_show(&args.show, &show).with_context(|| format!("writing {}", args.show.display()))?;

    println!("Created {} with {} DCA buses", args.show.display(), bus_count);
    Ok(())
}
