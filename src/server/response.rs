//! Response bodies and the error-to-status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{ErrorClass, LexiconError};
use crate::storage::Row;

/// `{"data": {"version"?, ...body}}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Versioned<T>,
}

#[derive(Debug, Serialize)]
pub struct Versioned<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    pub const fn new(version: Option<String>, body: T) -> Self {
        Self {
            data: Versioned { version, body },
        }
    }
}

/// Body of a lookup by headword.
#[derive(Debug, Serialize)]
pub struct Definition {
    pub definition: Row,
}

/// Body of a facts request.
#[derive(Debug, Serialize)]
pub struct Facts {
    pub facts: Vec<Row>,
}

/// Everything a route can answer besides success.
#[derive(Debug)]
pub enum ApiError {
    Lexicon(LexiconError),
    NotFound(&'static str),
    /// A blocking task panicked or was cancelled.
    Task(String),
}

impl From<LexiconError> for ApiError {
    fn from(err: LexiconError) -> Self {
        Self::Lexicon(err)
    }
}

impl ApiError {
    /// Status and the JSON string sent as body.
    #[must_use]
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, (*message).to_string()),
            Self::Lexicon(LexiconError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, message.clone())
            }
            Self::Lexicon(LexiconError::InvalidFields(_)) => {
                (StatusCode::BAD_REQUEST, "Request Invalid Fields".to_string())
            }
            Self::Lexicon(err) if err.is_validation() => (StatusCode::BAD_REQUEST, err.to_string()),
            Self::Lexicon(_) | Self::Task(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Lexicon(err)
                if matches!(err.class(), ErrorClass::Validation | ErrorClass::NotFound) =>
            {
                debug!(error = %err, "rejected request");
            }
            Self::Lexicon(err) => error!(error = %err, "request failed"),
            Self::Task(err) => error!(error = %err, "request task failed"),
            Self::NotFound(_) => {}
        }

        let (status, message) = self.status_and_message();
        (status, Json(message)).into_response()
    }
}
