use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::storage::{Database, schema};

/// One row of a fixture dictionary.
#[derive(Debug, Clone)]
pub struct FixtureEntry {
    pub ordered_id: i64,
    pub uri: &'static str,
    pub word: &'static str,
    pub searchable: &'static str,
    pub searchable_ci: &'static str,
}

impl FixtureEntry {
    #[must_use]
    pub const fn new(
        ordered_id: i64,
        uri: &'static str,
        word: &'static str,
        searchable: &'static str,
        searchable_ci: &'static str,
    ) -> Self {
        Self {
            ordered_id,
            uri,
            word,
            searchable,
            searchable_ci,
        }
    }
}

/// Small sample in dictionary order.
///
/// Under the case-insensitive prefix `ανθρωπ` there are three entries
/// (4, 5, 6); `Ανθ` matches only entry 3 case-sensitively; `α` prefixes
/// entries 1 to 6.
pub const SAMPLE_ENTRIES: [FixtureEntry; 7] = [
    FixtureEntry::new(1, "a", "α", "α", "α"),
    FixtureEntry::new(2, "aaron", "Ἀαρών", "Ααρων", "ααρων"),
    FixtureEntry::new(3, "antheia", "Ἄνθεια", "Ανθεια", "ανθεια"),
    FixtureEntry::new(4, "anthropeios", "ἀνθρώπειος", "ανθρωπειοσ", "ανθρωπειοσ"),
    FixtureEntry::new(5, "anthropinos", "ἀνθρώπινος", "ανθρωπινοσ", "ανθρωπινοσ"),
    FixtureEntry::new(6, "anthropos", "ἄνθρωπος", "ανθρωποσ", "ανθρωποσ"),
    FixtureEntry::new(7, "logos", "λόγος", "λογοσ", "λογοσ"),
];

/// Temporary dictionary database on disk.
pub struct DictionaryFixture {
    _temp_dir: TempDir,
    db_path: PathBuf,
}

impl Default for DictionaryFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryFixture {
    /// Fixture holding [`SAMPLE_ENTRIES`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_entries(&SAMPLE_ENTRIES)
    }

    #[must_use]
    pub fn with_entries(entries: &[FixtureEntry]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("dictionary.db");

        let conn = Connection::open(&db_path).expect("Failed to create fixture database");
        conn.execute_batch(schema::CREATE_TABLE)
            .expect("Failed to create dictionary table");
        for entry in entries {
            conn.execute(
                "INSERT INTO dictionary
                 (orderedID, uri, word, searchable, searchableCaseInsensitive, excerpt, htmlDefinition)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.ordered_id,
                    entry.uri,
                    entry.word,
                    entry.searchable,
                    entry.searchable_ci,
                    format!("excerpt of {}", entry.word),
                    format!("<p>{}</p>", entry.word),
                ],
            )
            .expect("Failed to insert fixture entry");
        }

        Self {
            _temp_dir: temp_dir,
            db_path,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open the fixture through the production adapter.
    #[must_use]
    pub fn open(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to open fixture database")
    }
}
