//! Dictionary operations composed from the query engine and a store.
//!
//! [`DictionaryService`] is what the HTTP routes and CLI commands call. It
//! owns the negative cache and the query limits so each instance is fully
//! isolated, which lets tests build one per case.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::query::shaper::{self, assign_siblings, shape_search};
use crate::query::{
    Fact, FieldSelection, NegativeCache, QueryLimits, SearchRequest, SearchResult, Siblings,
    compile_by_identifier, compile_by_key, compile_fact, compile_search, compile_siblings,
};
use crate::storage::{Database, DatabaseOptions, Row, Store};

/// An entry found by identifier, with its neighbours when asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryLookup {
    pub definition: Row,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siblings: Option<Siblings>,
}

/// Raw search parameters as a caller supplies them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub searchable: String,
    pub fields: Option<String>,
    pub exact: bool,
    pub case_sensitive: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SearchParams {
    pub fn new(searchable: impl Into<String>) -> Self {
        Self {
            searchable: searchable.into(),
            ..Self::default()
        }
    }
}

pub struct DictionaryService {
    store: Arc<dyn Store>,
    cache: NegativeCache,
    limits: QueryLimits,
    default_fields: FieldSelection,
}

impl std::fmt::Debug for DictionaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryService")
            .field("limits", &self.limits)
            .field("default_fields", &self.default_fields)
            .field("cache_capacity", &self.cache.capacity())
            .finish_non_exhaustive()
    }
}

impl DictionaryService {
    /// Service over `store` with default limits, fields and cache.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cache: NegativeCache::default(),
            limits: QueryLimits::default(),
            default_fields: FieldSelection::parse("uri,word,excerpt")
                .unwrap_or_else(|_| FieldSelection::all()),
        }
    }

    /// Open the configured database and apply the `[query]` and `[cache]`
    /// settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let database = Database::open_with(
            &config.database.path,
            DatabaseOptions {
                pool_size: config.database.pool_size,
            },
        )?;
        let default_fields = FieldSelection::parse(&config.query.default_fields)?;

        Ok(Self::new(Arc::new(database))
            .with_limits(config.query.limits())
            .with_default_fields(default_fields)
            .with_cache(NegativeCache::new(
                config.cache.effective_capacity(),
                config.cache.overflow,
            )))
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn with_default_fields(mut self, fields: FieldSelection) -> Self {
        self.default_fields = fields;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: NegativeCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &NegativeCache {
        &self.cache
    }

    #[must_use]
    pub const fn limits(&self) -> QueryLimits {
        self.limits
    }

    fn resolve_fields(&self, fields: Option<&str>) -> Result<FieldSelection> {
        match fields {
            Some(raw) => FieldSelection::parse(raw),
            None => Ok(self.default_fields.clone()),
        }
    }

    /// Entry whose `uri` matches, optionally with its neighbours.
    pub fn lookup_by_identifier(
        &self,
        uri: &str,
        fields: Option<&str>,
        with_siblings: bool,
    ) -> Result<Option<EntryLookup>> {
        let fields = self.resolve_fields(fields)?;
        let Some(mut definition) = self.store.get_one(&compile_by_identifier(uri, &fields))? else {
            debug!(uri, "no entry for identifier");
            return Ok(None);
        };

        let position = shaper::ordered_id(&definition);
        shaper::strip_internal(&mut definition);

        let siblings = match (with_siblings, position) {
            (false, _) => None,
            (true, None) => Some(Siblings::default()),
            (true, Some(position)) => {
                let rows = self.store.get_many(&compile_siblings(position))?;
                Some(assign_siblings(position, rows))
            }
        };

        Ok(Some(EntryLookup {
            definition,
            siblings,
        }))
    }

    /// Entry whose headword matches exactly.
    pub fn lookup_by_key(&self, word: &str, fields: Option<&str>) -> Result<Option<Row>> {
        let fields = self.resolve_fields(fields)?;
        let mut row = self.store.get_one(&compile_by_key(word, &fields))?;
        if let Some(row) = row.as_mut() {
            shaper::strip_internal(row);
        }
        Ok(row)
    }

    /// Prefix or exact search.
    ///
    /// Validation runs before anything else, so a malformed request fails the
    /// same way whether or not its string is a known miss. Default-regime
    /// searches consult the negative cache first and record misses in it.
    pub fn search(&self, params: &SearchParams) -> Result<Option<SearchResult>> {
        let fields = self.resolve_fields(params.fields.as_deref())?;
        let request = SearchRequest::new(params.searchable.as_str(), fields)?
            .exact(params.exact)
            .case_sensitive(params.case_sensitive)
            .limit(params.limit)
            .offset(params.offset);
        let query = compile_search(&request, &self.limits)?;

        let cacheable = request.is_default_regime();
        if cacheable && self.cache.contains(request.searchable(), request.is_case_sensitive()) {
            debug!(
                searchable = request.searchable(),
                case_sensitive = request.is_case_sensitive(),
                "negative cache hit"
            );
            return Ok(None);
        }

        debug!(sql = %query, "running search");
        let result = shape_search(self.store.get_many(&query)?);

        if result.is_none() && cacheable {
            self.cache
                .record(request.searchable(), request.is_case_sensitive());
        }
        Ok(result)
    }

    /// Rows of a canned query.
    pub fn facts(&self, fact: Fact) -> Result<Vec<Row>> {
        self.store.get_many(&compile_fact(fact))
    }
}
