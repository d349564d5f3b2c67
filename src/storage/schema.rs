//! The `dictionary` table layout.

use rusqlite::Connection;

use crate::error::{LexiconError, Result};

pub const TABLE: &str = "dictionary";

/// Every column the service reads, internal ones included.
pub const COLUMNS: [&str; 7] = [
    "orderedID",
    "uri",
    "word",
    "searchable",
    "searchableCaseInsensitive",
    "excerpt",
    "htmlDefinition",
];

/// DDL matching what the service expects. Used to build fixture databases;
/// production files come from the external loader.
pub const CREATE_TABLE: &str = "CREATE TABLE dictionary (
    orderedID INTEGER PRIMARY KEY,
    uri TEXT NOT NULL UNIQUE,
    word TEXT NOT NULL UNIQUE,
    searchable TEXT NOT NULL,
    searchableCaseInsensitive TEXT NOT NULL,
    excerpt TEXT,
    htmlDefinition TEXT
);
CREATE INDEX idx_dictionary_searchable ON dictionary(searchable);
CREATE INDEX idx_dictionary_searchable_ci ON dictionary(searchableCaseInsensitive);";

/// Fail unless the table exists with all of [`COLUMNS`].
pub fn verify(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let present = stmt
        .query_map([TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if present.is_empty() {
        return Err(LexiconError::Schema(format!("table `{TABLE}` not found")));
    }

    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|column| !present.iter().any(|name| name == column))
        .collect();
    if !missing.is_empty() {
        return Err(LexiconError::Schema(format!(
            "table `{TABLE}` lacks column(s) {}",
            missing.join(", ")
        )));
    }
    Ok(())
}
