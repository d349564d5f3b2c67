//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod commands;
pub mod output;

pub use commands::Commands;

#[derive(Parser, Debug)]
#[command(
    name = "lexicon",
    version,
    about = "Read-only query service over a SQLite dictionary",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (replaces the global and local lexicon.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dictionary database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,
}
