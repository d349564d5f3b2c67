//! Turns raw store rows into response shapes.

use serde::Serialize;
use serde_json::Value;

use super::compiler::{COUNT_ALL, ORDERED_ID};
use crate::storage::Row;

/// Outcome of a search that matched at least one entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub count: usize,
    /// Entries matching the prefix form of the search, ignoring `exact`
    /// and pagination.
    #[serde(rename = "countAll")]
    pub count_all: u64,
    pub definitions: Vec<Row>,
}

/// Adjacent entries in sequence order. A missing side is an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Siblings {
    pub previous: Row,
    pub next: Row,
}

/// Sequence position of a row, if it carries one.
#[must_use]
pub fn ordered_id(row: &Row) -> Option<i64> {
    row.get(ORDERED_ID).and_then(Value::as_i64)
}

/// Remove storage-internal columns.
pub fn strip_internal(row: &mut Row) {
    row.remove(ORDERED_ID);
}

/// Build a [`SearchResult`]; `None` when there are no rows.
///
/// `countAll` is repeated on every row by the sub-select; it is read once
/// from the first row and removed from all of them.
#[must_use]
pub fn shape_search(mut rows: Vec<Row>) -> Option<SearchResult> {
    let first = rows.first()?;
    let count = rows.len();
    let count_all = first
        .get(COUNT_ALL)
        .and_then(Value::as_u64)
        .unwrap_or(count as u64);

    for row in &mut rows {
        row.remove(COUNT_ALL);
        strip_internal(row);
    }

    Some(SearchResult {
        count,
        count_all,
        definitions: rows,
    })
}

/// Place sibling rows on either side of the entry at `ordered_id`.
///
/// A single row is placed by comparing its position with the neighbours';
/// two rows are taken as `[previous, next]` since the query orders them.
#[must_use]
pub fn assign_siblings(ordered_id: i64, mut rows: Vec<Row>) -> Siblings {
    let mut siblings = Siblings::default();

    match rows.len() {
        0 => {}
        1 => {
            let row = rows.remove(0);
            let position = self::ordered_id(&row);
            if position == Some(ordered_id.saturating_sub(1)) {
                siblings.previous = row;
            } else if position == Some(ordered_id.saturating_add(1)) {
                siblings.next = row;
            }
        }
        _ => {
            let mut rows = rows.into_iter();
            siblings.previous = rows.next().unwrap_or_default();
            siblings.next = rows.next().unwrap_or_default();
        }
    }

    strip_internal(&mut siblings.previous);
    strip_internal(&mut siblings.next);
    siblings
}
