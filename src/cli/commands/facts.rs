//! lexicon facts - Canned dictionary queries

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::{LexiconError, Result};
use crate::query::Fact;
use crate::server::{Envelope, Facts};

#[derive(Args, Debug)]
pub struct FactsArgs {
    /// Fact title (longest-words)
    pub title: String,
}

pub fn run(ctx: &AppContext, args: &FactsArgs) -> Result<()> {
    let fact: Fact = args.title.parse().map_err(LexiconError::NotFound)?;
    let facts = ctx.service.facts(fact)?;
    emit_json(&Envelope::new(ctx.config.database.version.clone(), Facts { facts }))
}
