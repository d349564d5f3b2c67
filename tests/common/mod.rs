//! Common test utilities shared across the test suites.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use lexicon::server::{self, ServerState};
use lexicon::service::DictionaryService;
use lexicon::test_utils::fixtures::DictionaryFixture;

pub const VERSION: &str = "test-1";

/// In-process application over a fixture database.
pub struct TestApp {
    pub fixture: DictionaryFixture,
    pub service: Arc<DictionaryService>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, |service| service)
    }

    pub fn with_prefix(prefix: &str) -> Self {
        Self::build(Some(prefix), |service| service)
    }

    pub fn with_service(configure: impl FnOnce(DictionaryService) -> DictionaryService) -> Self {
        Self::build(None, configure)
    }

    fn build(
        prefix: Option<&str>,
        configure: impl FnOnce(DictionaryService) -> DictionaryService,
    ) -> Self {
        let fixture = DictionaryFixture::new();
        let service = Arc::new(configure(DictionaryService::new(Arc::new(fixture.open()))));
        let mut state = ServerState::new(Arc::clone(&service), Some(VERSION.to_string()));
        if let Some(prefix) = prefix {
            state = state.with_prefix(prefix);
        }

        Self {
            fixture,
            service,
            router: server::router(state),
        }
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        get(&self.router, path).await
    }
}

/// Issue a GET against `router` and decode the JSON body.
pub async fn get(router: &Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(encode_path(path))
        .header(header::HOST, "dictionary.test")
        .body(Body::empty())
        .expect("build request");

    let response = router.clone().oneshot(request).await.expect("route request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, body)
}

/// Percent-encode each path segment so Greek and spaces form a valid URI.
/// The query string is passed through as written.
pub fn encode_path(path: &str) -> String {
    let (path, query) = match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    };
    let encoded = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    match query {
        Some(query) => format!("{encoded}?{query}"),
        None => encoded,
    }
}
