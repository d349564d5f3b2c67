//! Output column projection.
//!
//! Column names cannot be bound as SQL parameters, so they are spliced into
//! the query text. [`FieldSelection`] is the only way to get a column list
//! into SQL, and it can only be built from allowlisted names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LexiconError, Result};

/// A public column of the `dictionary` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "word")]
    Word,
    #[serde(rename = "searchable")]
    Searchable,
    #[serde(rename = "searchableCaseInsensitive")]
    SearchableCaseInsensitive,
    #[serde(rename = "excerpt")]
    Excerpt,
    #[serde(rename = "htmlDefinition")]
    HtmlDefinition,
}

impl Field {
    pub const ALL: [Self; 6] = [
        Self::Uri,
        Self::Word,
        Self::Searchable,
        Self::SearchableCaseInsensitive,
        Self::Excerpt,
        Self::HtmlDefinition,
    ];

    /// Column name as it appears in the schema.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Uri => "uri",
            Self::Word => "word",
            Self::Searchable => "searchable",
            Self::SearchableCaseInsensitive => "searchableCaseInsensitive",
            Self::Excerpt => "excerpt",
            Self::HtmlDefinition => "htmlDefinition",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.column() == s)
            .ok_or_else(|| LexiconError::InvalidFields(format!("unknown column {s:?}")))
    }
}

/// Validated, non-empty list of columns to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<Field>,
}

impl FieldSelection {
    /// Parse a comma-separated list such as `"uri, word,excerpt,"`.
    ///
    /// Whitespace anywhere and trailing commas are dropped; every remaining
    /// token must name an allowlisted column. Repeated names keep their first
    /// position.
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let normalized = normalized.trim_end_matches(',');
        if normalized.is_empty() {
            return Err(LexiconError::InvalidFields("no fields requested".to_string()));
        }

        let mut fields = Vec::new();
        for token in normalized.split(',') {
            if token.is_empty() {
                return Err(LexiconError::InvalidFields(format!(
                    "empty column name in {raw:?}"
                )));
            }
            let field: Field = token.parse()?;
            if !fields.contains(&field) {
                fields.push(field);
            }
        }

        Ok(Self { fields })
    }

    #[must_use]
    pub fn all() -> Self {
        Self {
            fields: Field::ALL.to_vec(),
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Comma-joined column list for a `SELECT` clause.
    #[must_use]
    pub fn to_sql(&self) -> String {
        self.fields
            .iter()
            .map(|field| field.column())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for FieldSelection {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// `true` when `raw` parses into a [`FieldSelection`].
#[must_use]
pub fn validate(raw: &str) -> bool {
    FieldSelection::parse(raw).is_ok()
}
