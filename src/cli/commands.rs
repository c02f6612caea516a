//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Singer-style tap for the Iterable marketing API
#[derive(Parser, Debug)]
#[command(name = "tap-iterable")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (overrides --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test the API connection
    Check,

    /// Print the catalog of available streams
    Discover,

    /// Extract records and emit them as line-delimited messages
    Read {
        /// Streams to extract (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Abort the run on the first stream failure
        #[arg(long)]
        fail_fast: bool,

        /// Root directory for export staging files
        #[arg(long)]
        staging_dir: Option<PathBuf>,
    },
}
