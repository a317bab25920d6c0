//! Command-line argument definition.

use std::path::PathBuf;

use clap::Parser;

/// tablesync - replay table-view scenarios against the query synchronization engine
#[derive(Parser, Debug)]
#[command(name = "tablesync")]
#[command(version)]
#[command(about = "Replay table-view scenarios against the query sync engine", long_about = None)]
pub struct Args {
    /// Scenario file (YAML) to replay
    pub scenario: PathBuf,

    /// Settings file to use instead of ~/.config/tablesync/settings.conf
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable verbose output (equivalent to --log-level debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the report as a single line instead of pretty JSON
    #[arg(long)]
    pub compact: bool,
}
