use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LexiconError, Result};
use crate::query::{FieldSelection, LimitPolicy, OverflowPolicy, QueryLimits};
use crate::query::compiler::DEFAULT_MAX_ROWS;
use crate::query::negative_cache::DEFAULT_CAPACITY;

/// Local config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "lexicon.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Defaults, then config files, then `LEXICON_*` environment overrides.
    ///
    /// An explicit path (argument or `LEXICON_CONFIG`) replaces the global
    /// and local files.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("LEXICON_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            let patch = Self::load_patch(&path)?.ok_or_else(|| {
                LexiconError::Config(format!("config file {} not found", path.display()))
            })?;
            config.merge_patch(patch);
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(local) = Self::load_patch(Path::new(LOCAL_CONFIG_FILE))? {
                config.merge_patch(local);
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("lexicon/config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| LexiconError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| LexiconError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    /// Parse a TOML document as a patch over the defaults.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let patch: ConfigPatch = toml::from_str(raw)
            .map_err(|err| LexiconError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.server {
            self.server.merge(patch);
        }
        if let Some(patch) = patch.database {
            self.database.merge(patch);
        }
        if let Some(patch) = patch.query {
            self.query.merge(patch);
        }
        if let Some(patch) = patch.cache {
            self.cache.merge(patch);
        }
    }

    /// Apply `LEXICON_<SECTION>_<KEY>` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        if let Some(value) = env.string("LEXICON_SERVER_HOST") {
            self.server.host = value;
        }
        if let Some(value) = env.parse::<u16>("LEXICON_SERVER_PORT")? {
            self.server.port = value;
        }
        if let Some(value) = env.string("LEXICON_SERVER_URL_PREFIX") {
            self.server.url_prefix = value;
        }

        if let Some(value) = env.string("LEXICON_DATABASE_PATH") {
            self.database.path = PathBuf::from(value);
        }
        if let Some(value) = env.string("LEXICON_DATABASE_VERSION") {
            self.database.version = Some(value);
        }
        if let Some(value) = env.parse::<usize>("LEXICON_DATABASE_POOL_SIZE")? {
            self.database.pool_size = value;
        }

        if let Some(value) = env.string("LEXICON_QUERY_DEFAULT_FIELDS") {
            self.query.default_fields = value;
        }
        if let Some(value) = env.parse::<u64>("LEXICON_QUERY_MAX_ROWS")? {
            self.query.max_rows = value;
        }
        if let Some(value) = env.parse::<LimitPolicy>("LEXICON_QUERY_LIMIT_POLICY")? {
            self.query.limit_policy = value;
        }

        if let Some(value) = env.bool("LEXICON_CACHE_ENABLED") {
            self.cache.enabled = value;
        }
        if let Some(value) = env.parse::<usize>("LEXICON_CACHE_CAPACITY")? {
            self.cache.capacity = value;
        }
        if let Some(value) = env.parse::<OverflowPolicy>("LEXICON_CACHE_OVERFLOW")? {
            self.cache.overflow = value;
        }

        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self
            .server
            .url_prefix
            .chars()
            .all(|c| c.is_ascii_lowercase())
        {
            return Err(LexiconError::Config(format!(
                "server.url_prefix {:?} must contain only lowercase ASCII letters",
                self.server.url_prefix
            )));
        }
        FieldSelection::parse(&self.query.default_fields).map_err(|err| {
            LexiconError::Config(format!("query.default_fields: {err}"))
        })?;
        if self.query.max_rows == 0 {
            return Err(LexiconError::Config("query.max_rows must be positive".to_string()));
        }
        if self.database.pool_size == 0 {
            return Err(LexiconError::Config(
                "database.pool_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    /// Routes are served under `/<url_prefix>` when non-empty.
    #[serde(default)]
    pub url_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            url_prefix: String::new(),
        }
    }
}

impl ServerConfig {
    fn merge(&mut self, patch: ServerPatch) {
        if let Some(value) = patch.host {
            self.host = value;
        }
        if let Some(value) = patch.port {
            self.port = value;
        }
        if let Some(value) = patch.url_prefix {
            self.url_prefix = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub path: PathBuf,
    /// Dataset version echoed in every response envelope.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub pool_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dictionary.db"),
            version: None,
            pool_size: 4,
        }
    }
}

impl DatabaseConfig {
    fn merge(&mut self, patch: DatabasePatch) {
        if let Some(value) = patch.path {
            self.path = value;
        }
        if let Some(value) = patch.version {
            self.version = Some(value);
        }
        if let Some(value) = patch.pool_size {
            self.pool_size = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Columns returned when a request has no `fields` parameter.
    #[serde(default)]
    pub default_fields: String,
    #[serde(default)]
    pub max_rows: u64,
    #[serde(default)]
    pub limit_policy: LimitPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_fields: "uri,word,excerpt".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            limit_policy: LimitPolicy::default(),
        }
    }
}

impl QueryConfig {
    fn merge(&mut self, patch: QueryPatch) {
        if let Some(value) = patch.default_fields {
            self.default_fields = value;
        }
        if let Some(value) = patch.max_rows {
            self.max_rows = value;
        }
        if let Some(value) = patch.limit_policy {
            self.limit_policy = value;
        }
    }

    #[must_use]
    pub const fn limits(&self) -> QueryLimits {
        QueryLimits {
            max_rows: self.max_rows,
            policy: self.limit_policy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Entries per case-sensitivity pool.
    #[serde(default)]
    pub capacity: usize,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl CacheConfig {
    fn merge(&mut self, patch: CachePatch) {
        if let Some(value) = patch.enabled {
            self.enabled = value;
        }
        if let Some(value) = patch.capacity {
            self.capacity = value;
        }
        if let Some(value) = patch.overflow {
            self.overflow = value;
        }
    }

    /// Capacity actually used; zero when the cache is turned off.
    #[must_use]
    pub const fn effective_capacity(&self) -> usize {
        if self.enabled { self.capacity } else { 0 }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub server: Option<ServerPatch>,
    pub database: Option<DatabasePatch>,
    pub query: Option<QueryPatch>,
    pub cache: Option<CachePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServerPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub url_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DatabasePatch {
    pub path: Option<PathBuf>,
    pub version: Option<String>,
    pub pool_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct QueryPatch {
    pub default_fields: Option<String>,
    pub max_rows: Option<u64>,
    pub limit_policy: Option<LimitPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CachePatch {
    pub enabled: Option<bool>,
    pub capacity: Option<usize>,
    pub overflow: Option<OverflowPolicy>,
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn bool(&self, key: &str) -> Option<bool> {
        (self.lookup)(key).map(|value| {
            matches!(
                value.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            Some(value) => value.parse::<T>().map(Some).map_err(|err| {
                LexiconError::Config(format!("invalid {key} value {value}: {err}"))
            }),
            None => Ok(None),
        }
    }
}
