//! lexicon lookup - Fetch one entry

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::{LexiconError, Result};
use crate::server::{Definition, Envelope};

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Entry identifier (uri), or headword with --word
    pub key: String,

    /// Treat the key as a headword
    #[arg(long)]
    pub word: bool,

    /// Columns to return (e.g. uri,word,excerpt)
    #[arg(long)]
    pub fields: Option<String>,

    /// Include the previous and next entries (identifier lookups only)
    #[arg(long, conflicts_with = "word")]
    pub siblings: bool,
}

pub fn run(ctx: &AppContext, args: &LookupArgs) -> Result<()> {
    let version = ctx.config.database.version.clone();
    let not_found = || LexiconError::NotFound("Entry Not Found".to_string());

    if args.word {
        let definition = ctx
            .service
            .lookup_by_key(&args.key, args.fields.as_deref())?
            .ok_or_else(not_found)?;
        emit_json(&Envelope::new(version, Definition { definition }))
    } else {
        let found = ctx
            .service
            .lookup_by_identifier(&args.key, args.fields.as_deref(), args.siblings)?
            .ok_or_else(not_found)?;
        emit_json(&Envelope::new(version, found))
    }
}
