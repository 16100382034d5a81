//! dcaplot - plan, preview and run DCA cue sequences from the command line.

mod commands;
mod render;

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

#[derive(Parser)]
#[command(name = "dcaplot")]
#[command(author, version, about = "DCA cue planner", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    stderr: bool,

    /// Read configuration from this file instead of the user config
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty show file
    Init(commands::init::InitArgs),

    /// Print every cue's resolved bus state
    Plan(commands::plan::PlanArgs),

    /// Print the actions a cue would send to an idle console
    Preview(commands::preview::PreviewArgs),

    /// Execute cues in order
    Run(commands::run::RunArgs),
}

fn init_logging(verbose: bool, stderr: bool) -> anyhow::Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    if stderr {
        TermLogger::init(log_level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
        return Ok(());
    }

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dcaplot")
        .join("dcaplot.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = File::create(&log_path)
        .or_else(|_| File::create(std::env::temp_dir().join("dcaplot.log")))?;

    WriteLogger::init(log_level, Config::default(), log_file)?;

    log::info!("dcaplot starting (log level: {:?})", log_level);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.stderr)?;

    let config = match &cli.config {
        Some(path) => dcaplot_core::config::Config::load_from(path),
        None => dcaplot_core::config::Config::load(),
    };

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &config),
        Commands::Plan(args) => commands::plan::run(args, &config),
        Commands::Preview(args) => commands::preview::run(args, &config),
        Commands::Run(args) => commands::run::run(args, &config),
    }
}
