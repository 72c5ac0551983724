use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "windwatch")]
#[command(about = "Keeps a daylight wind forecast for one location in a local store")]
pub struct Cli {
    /// Config file (default: <config_dir>/windwatch/config.toml)
    #[arg(short, long, env = "WINDWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the provider accepts the configured location and key
    Check,
    /// Run the pipeline once
    Run {
        /// Fetch and transform, print the records, write nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the pipeline every `schedule.refresh_minutes` until Ctrl-C
    Watch,
    /// Print the stored forecast
    Show {
        /// Only the first N slots
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the effective configuration
    Config,
}
