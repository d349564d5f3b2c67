//! Error types for lexicon

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LexiconError>;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("invalid fields: {0}")]
    InvalidFields(String),

    #[error("the request must carry a positive `limit` parameter (e.g. ?limit={example})")]
    MissingLimit { example: u64 },

    #[error("limit {requested} exceeds the maximum of {max} rows")]
    LimitExceeded { requested: u64, max: u64 },

    #[error("invalid value {value:?} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: String },

    #[error("unacceptable search value: {0:?}")]
    UnacceptableSearch(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("{0}")]
    NotFound(String),
}

/// Coarse classification used at the HTTP and CLI boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent something malformed. Never retried, never logged as a fault.
    Validation,
    /// Query execution or I/O failed.
    Store,
    /// Startup-time misconfiguration.
    Config,
    /// Nothing matched. Only raised at the CLI boundary.
    NotFound,
}

impl LexiconError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidFields(_)
            | Self::MissingLimit { .. }
            | Self::LimitExceeded { .. }
            | Self::InvalidParameter { .. }
            | Self::UnacceptableSearch(_) => ErrorClass::Validation,
            Self::Store(_) | Self::Io(_) | Self::Schema(_) | Self::Serialization(_) => {
                ErrorClass::Store
            }
            Self::Config(_) => ErrorClass::Config,
            Self::NotFound(_) => ErrorClass::NotFound,
        }
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self.class(), ErrorClass::Validation)
    }
}
