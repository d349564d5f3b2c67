//! SQLite store adapter

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, ToSql};
use serde_json::Value;
use tracing::{debug, trace};

use super::{Row, Store, schema};
use crate::error::{LexiconError, Result};
use crate::query::CompiledQuery;

/// Connection pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    pub pool_size: usize,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self { pool_size: 4 }
    }
}

/// Read-only dictionary database.
///
/// Holds a few connections so concurrent requests rarely wait on each
/// other; a request takes the first free one, round-robin.
pub struct Database {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
    path: PathBuf,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("pool_size", &self.connections.len())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open database at the given path with default options
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, DatabaseOptions::default())
    }

    /// Open database at the given path, read-only, and check its schema
    pub fn open_with(path: impl AsRef<Path>, options: DatabaseOptions) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LexiconError::Config(format!(
                "database file {} not found",
                path.display()
            )));
        }

        let pool_size = options.pool_size.max(1);
        let mut connections = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
                    | OpenFlags::SQLITE_OPEN_URI,
            )?;
            Self::configure_pragmas(&conn)?;
            connections.push(Mutex::new(conn));
        }
        schema::verify(&connections[0].lock())?;

        debug!(path = %path.display(), pool_size, "opened dictionary database");

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }

    fn configure_pragmas(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA query_only = ON;
             PRAGMA cache_size = -64000;
             PRAGMA mmap_size = 268435456;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let len = self.connections.len();
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        for offset in 0..len {
            if let Some(conn) = self.connections[(start + offset) % len].try_lock() {
                return f(&conn);
            }
        }
        let conn = self.connections[start % len].lock();
        f(&conn)
    }
}

impl Store for Database {
    fn get_one(&self, query: &CompiledQuery) -> Result<Option<Row>> {
        self.with_connection(|conn| Ok(fetch(conn, query, Some(1))?.pop()))
    }

    fn get_many(&self, query: &CompiledQuery) -> Result<Vec<Row>> {
        self.with_connection(|conn| fetch(conn, query, None))
    }
}

fn fetch(conn: &Connection, query: &CompiledQuery, max_rows: Option<usize>) -> Result<Vec<Row>> {
    trace!(sql = %query.sql, params = ?query.params, "executing query");

    let mut stmt = conn.prepare_cached(&query.sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let params: Vec<(&str, &dyn ToSql)> = query
        .params
        .iter()
        .map(|(name, value)| (*name, value as &dyn ToSql))
        .collect();

    let mut rows = stmt.query(params.as_slice())?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(row_to_map(row, &columns)?);
        if max_rows.is_some_and(|max| out.len() >= max) {
            break;
        }
    }
    Ok(out)
}

fn row_to_map(row: &rusqlite::Row<'_>, columns: &[String]) -> Result<Row> {
    let mut map = Row::new();
    for (idx, name) in columns.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null | ValueRef::Blob(_) => Value::Null,
            ValueRef::Integer(value) => Value::from(value),
            ValueRef::Real(value) => Value::from(value),
            ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        };
        map.insert(name.clone(), value);
    }
    Ok(map)
}
