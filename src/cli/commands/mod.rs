//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod facts;
pub mod lookup;
pub mod search;
pub mod serve;

use crate::app::AppContext;
use crate::error::Result;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve(serve::ServeArgs),

    /// Look up one entry by identifier or headword
    Lookup(lookup::LookupArgs),

    /// Prefix or exact search
    Search(search::SearchArgs),

    /// Run a canned query over the dictionary
    Facts(facts::FactsArgs),
}

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => serve::run(ctx, args),
        Commands::Lookup(args) => lookup::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Facts(args) => facts::run(ctx, args),
    }
}
