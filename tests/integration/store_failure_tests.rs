use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use lexicon::query::CompiledQuery;
use lexicon::server::{self, ServerState};
use lexicon::service::DictionaryService;
use lexicon::storage::{Row, Store};
use lexicon::{LexiconError, Result};

use crate::common::get;

/// A store whose every query fails.
struct BrokenStore;

impl Store for BrokenStore {
    fn get_one(&self, _query: &CompiledQuery) -> Result<Option<Row>> {
        Err(LexiconError::Store(rusqlite::Error::InvalidQuery))
    }

    fn get_many(&self, _query: &CompiledQuery) -> Result<Vec<Row>> {
        Err(LexiconError::Store(rusqlite::Error::InvalidQuery))
    }
}

fn broken_router() -> (Arc<DictionaryService>, axum::Router) {
    let service = Arc::new(DictionaryService::new(Arc::new(BrokenStore)));
    let router = server::router(ServerState::new(Arc::clone(&service), None));
    (service, router)
}

#[tokio::test]
async fn test_store_failure_is_server_error() {
    let (_, router) = broken_router();

    for path in [
        "/definition/logos",
        "/definition/word/λόγος",
        "/definitions/λογ?limit=5",
        "/facts/longest-words",
    ] {
        let (status, body) = get(&router, path).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(body, json!("Internal Server Error"));
    }
}

#[tokio::test]
async fn test_failed_search_is_not_cached() {
    let (service, router) = broken_router();

    let (status, _) = get(&router, "/definitions/λογ?limit=5").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(service.cache().sizes(), (0, 0));
}

#[tokio::test]
async fn test_validation_precedes_store() {
    let (_, router) = broken_router();

    let (status, body) = get(&router, "/definition/logos?fields=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!("Request Invalid Fields"));
}
