//! lexicon search - Search normalized headwords

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::{LexiconError, Result};
use crate::server::Envelope;
use crate::service::SearchParams;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Normalized search string (unaccented Greek)
    pub searchable: String,

    /// Columns to return (e.g. uri,word,excerpt)
    #[arg(long)]
    pub fields: Option<String>,

    /// Match the whole string instead of a prefix
    #[arg(long)]
    pub exact: bool,

    /// Compare case-sensitively
    #[arg(long)]
    pub case_sensitive: bool,

    /// Maximum number of results
    #[arg(long, short)]
    pub limit: Option<u64>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<u64>,
}

impl From<&SearchArgs> for SearchParams {
    fn from(args: &SearchArgs) -> Self {
        Self {
            searchable: args.searchable.clone(),
            fields: args.fields.clone(),
            exact: args.exact,
            case_sensitive: args.case_sensitive,
            limit: args.limit,
            offset: args.offset,
        }
    }
}

pub fn run(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let result = ctx
        .service
        .search(&SearchParams::from(args))?
        .ok_or_else(|| LexiconError::NotFound("Entries Not Found".to_string()))?;
    emit_json(&Envelope::new(ctx.config.database.version.clone(), result))
}
