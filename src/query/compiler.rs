//! Parameterized SQL for every read the service performs.
//!
//! User-derived values are always bound as named parameters. The only text
//! spliced into SQL is a [`FieldSelection`] column list and fixed column
//! names chosen here.

use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::fields::FieldSelection;
use super::validate::is_acceptable;
use crate::error::{LexiconError, Result};

/// Internal sequence column. Never part of a response.
pub const ORDERED_ID: &str = "orderedID";

/// Alias of the prefix-count sub-select in search queries.
pub const COUNT_ALL: &str = "countAll";

/// Default ceiling on rows per search.
pub const DEFAULT_MAX_ROWS: u64 = 2500;

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Text(String),
    Integer(i64),
}

impl ToSql for Param {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Text(value) => ToSqlOutput::from(value.as_str()),
            Self::Integer(value) => ToSqlOutput::from(*value),
        })
    }
}

/// SQL text plus its named parameters (names include the leading `:`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<(&'static str, Param)>,
}

impl CompiledQuery {
    fn new(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    fn bind(mut self, name: &'static str, value: Param) -> Self {
        self.params.push((name, value));
        self
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// How a search limit above the configured maximum is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Refuse the request. A limit is mandatory.
    #[default]
    Reject,
    /// Lower it to the maximum. A missing limit means the maximum.
    Clamp,
}

impl FromStr for LimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "clamp" => Ok(Self::Clamp),
            other => Err(format!("invalid limit policy {other} (expected reject|clamp)")),
        }
    }
}

/// Row-count rules applied to every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_rows: u64,
    pub policy: LimitPolicy,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            policy: LimitPolicy::default(),
        }
    }
}

impl QueryLimits {
    /// Effective row cap for a requested limit.
    pub fn resolve(&self, requested: Option<u64>) -> Result<u64> {
        let example = self.max_rows.saturating_sub(5).max(1);
        match (requested, self.policy) {
            (Some(0), _) | (None, LimitPolicy::Reject) => Err(LexiconError::MissingLimit { example }),
            (None, LimitPolicy::Clamp) => Ok(self.max_rows),
            (Some(limit), LimitPolicy::Reject) if limit > self.max_rows => {
                Err(LexiconError::LimitExceeded {
                    requested: limit,
                    max: self.max_rows,
                })
            }
            (Some(limit), LimitPolicy::Clamp) if limit > self.max_rows => {
                info!(
                    requested = limit,
                    max_rows = self.max_rows,
                    "request exceeds the authorized limit and was reduced to {} rows",
                    self.max_rows
                );
                Ok(self.max_rows)
            }
            (Some(limit), _) => Ok(limit),
        }
    }
}

/// A validated search.
///
/// Construction checks the search value, so a `SearchRequest` always holds
/// an acceptable string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    searchable: String,
    fields: FieldSelection,
    exact: bool,
    case_sensitive: bool,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SearchRequest {
    pub fn new(searchable: impl Into<String>, fields: FieldSelection) -> Result<Self> {
        let searchable = searchable.into();
        if !is_acceptable(&searchable) {
            return Err(LexiconError::UnacceptableSearch(searchable));
        }
        Ok(Self {
            searchable,
            fields,
            exact: false,
            case_sensitive: false,
            limit: None,
            offset: None,
        })
    }

    #[must_use]
    pub const fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    #[must_use]
    pub const fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: Option<u64>) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn searchable(&self) -> &str {
        &self.searchable
    }

    #[must_use]
    pub const fn fields(&self) -> &FieldSelection {
        &self.fields
    }

    #[must_use]
    pub const fn is_exact(&self) -> bool {
        self.exact
    }

    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Plain prefix search: no `exact`, no offset, limit unset or positive.
    ///
    /// Only these searches read from or write to the negative cache.
    #[must_use]
    pub fn is_default_regime(&self) -> bool {
        !self.exact && self.offset.is_none() && self.limit.is_none_or(|limit| limit > 0)
    }
}

/// `SELECT <fields>,orderedID FROM dictionary WHERE uri = :uri`
#[must_use]
pub fn compile_by_identifier(uri: &str, fields: &FieldSelection) -> CompiledQuery {
    CompiledQuery::new(format!(
        "SELECT {},{ORDERED_ID} FROM dictionary WHERE uri = :uri",
        fields.to_sql()
    ))
    .bind(":uri", Param::Text(uri.to_string()))
}

/// Neighbours of the entry at `ordered_id`, in sequence order.
#[must_use]
pub fn compile_siblings(ordered_id: i64) -> CompiledQuery {
    CompiledQuery::new(format!(
        "SELECT {ORDERED_ID},uri,word FROM dictionary \
         WHERE {ORDERED_ID} = :previousID OR {ORDERED_ID} = :nextID \
         ORDER BY {ORDERED_ID}"
    ))
    .bind(":previousID", Param::Integer(ordered_id.saturating_sub(1)))
    .bind(":nextID", Param::Integer(ordered_id.saturating_add(1)))
}

/// `SELECT <fields> FROM dictionary WHERE word = :word`
#[must_use]
pub fn compile_by_key(word: &str, fields: &FieldSelection) -> CompiledQuery {
    CompiledQuery::new(format!(
        "SELECT {} FROM dictionary WHERE word = :word",
        fields.to_sql()
    ))
    .bind(":word", Param::Text(word.to_string()))
}

/// Build the search query and its `countAll` sub-select.
///
/// The main predicate is equality when `exact`, else a prefix `LIKE`. The
/// count always uses the prefix form, so `countAll` answers "how many
/// entries start with this" whatever the narrowing.
pub fn compile_search(request: &SearchRequest, limits: &QueryLimits) -> Result<CompiledQuery> {
    let limit = limits.resolve(request.limit)?;

    let (column, needle) = if request.case_sensitive {
        ("searchable", request.searchable.clone())
    } else {
        ("searchableCaseInsensitive", lowercase(&request.searchable))
    };
    let prefix = format!("{needle}%");

    let predicate = if request.exact {
        format!("{column} = :needle")
    } else {
        format!("{column} LIKE :prefix")
    };

    let mut sql = format!(
        "SELECT {fields},(SELECT COUNT({ORDERED_ID}) FROM dictionary WHERE {column} LIKE :prefix) AS {COUNT_ALL} \
         FROM dictionary WHERE {predicate} ORDER BY {ORDERED_ID} LIMIT :limit",
        fields = request.fields.to_sql(),
    );
    if request.offset.is_some() {
        sql.push_str(" OFFSET :offset");
    }

    let mut query = CompiledQuery::new(sql)
        .bind(":prefix", Param::Text(prefix))
        .bind(":limit", Param::Integer(to_i64(limit)));
    if request.exact {
        query = query.bind(":needle", Param::Text(needle));
    }
    if let Some(offset) = request.offset {
        query = query.bind(":offset", Param::Integer(to_i64(offset)));
    }
    Ok(query)
}

/// Canned queries over the whole dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fact {
    /// The fifteen longest headwords.
    LongestWords,
}

impl Fact {
    pub const ALL: [Self; 1] = [Self::LongestWords];

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::LongestWords => "longest-words",
        }
    }
}

impl FromStr for Fact {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fact| fact.title() == s)
            .ok_or_else(|| format!("unknown fact {s:?}"))
    }
}

#[must_use]
pub fn compile_fact(fact: Fact) -> CompiledQuery {
    match fact {
        Fact::LongestWords => CompiledQuery::new(
            "SELECT uri, word, LENGTH(word) AS length FROM dictionary \
             ORDER BY LENGTH(word) DESC LIMIT 15"
                .to_string(),
        ),
    }
}

// Per-char lowering: `str::to_lowercase` would turn a trailing Σ into ς,
// which never appears in the normalized columns.
fn lowercase(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
