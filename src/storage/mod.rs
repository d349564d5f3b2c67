//! Storage layer for lexicon
//!
//! The dictionary is a single read-only SQLite table. Everything above this
//! module talks to it through the [`Store`] trait.

use crate::error::Result;
use crate::query::CompiledQuery;

pub mod schema;
pub mod sqlite;

pub use sqlite::{Database, DatabaseOptions};

/// One result row, keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Parameterized read access to the dictionary.
pub trait Store: Send + Sync {
    /// First row of the result, if any.
    fn get_one(&self, query: &CompiledQuery) -> Result<Option<Row>>;

    /// All rows of the result, in query order.
    fn get_many(&self, query: &CompiledQuery) -> Result<Vec<Row>>;
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn get_one(&self, query: &CompiledQuery) -> Result<Option<Row>> {
        (**self).get_one(query)
    }

    fn get_many(&self, query: &CompiledQuery) -> Result<Vec<Row>> {
        (**self).get_many(query)
    }
}
