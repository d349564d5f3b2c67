//! HTTP surface over [`DictionaryService`].
//!
//! Routes, optionally nested under `/<url_prefix>`:
//!
//! - `GET /` health check
//! - `GET /definition/{uri}?fields&siblings`
//! - `GET /definition/word/{word}?fields`
//! - `GET /definitions/{searchable}?fields&exact&caseSensitive&limit&offset`
//! - `GET /facts/{title}`
//!
//! Boolean flags are presence-based. Store work runs on the blocking pool.

pub mod response;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::HOST;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::{LexiconError, Result};
use crate::query::Fact;
use crate::service::{DictionaryService, SearchParams};

pub use response::{ApiError, Definition, Envelope, Facts};

type Params = HashMap<String, String>;

/// Shared by every handler.
#[derive(Debug)]
pub struct ServerState {
    pub service: Arc<DictionaryService>,
    /// Dataset version echoed in response envelopes.
    pub version: Option<String>,
    prefix: Option<String>,
}

impl ServerState {
    pub fn new(service: Arc<DictionaryService>, version: Option<String>) -> Self {
        Self {
            service,
            version,
            prefix: None,
        }
    }

    /// Serve every route under `/<prefix>`. Empty means no prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

type SharedState = Arc<ServerState>;

/// Build the full application router.
pub fn router(state: ServerState) -> Router {
    let state = Arc::new(state);

    let api = Router::new()
        .route("/", get(health))
        .route("/definition/{uri}", get(definition))
        .route("/definition/word/{word}", get(definition_by_word))
        .route("/definitions/{searchable}", get(definitions))
        .route("/facts/{title}", get(facts))
        .fallback(not_found);

    let app = match state.prefix() {
        // The nested router only answers `/{prefix}`, not `/{prefix}/`.
        Some(prefix) => Router::new()
            .route(&format!("/{prefix}/"), get(health))
            .nest(&format!("/{prefix}"), api)
            .fallback(wrong_location),
        None => api,
    };

    app.layer(middleware::from_fn(log_request)).with_state(state)
}

/// Bind and serve until SIGINT or SIGTERM.
pub async fn serve(config: &ServerConfig, state: ServerState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(
        addr = %listener.local_addr()?,
        prefix = state.prefix().unwrap_or(""),
        "lexicon listening"
    );

    let service = Arc::clone(&state.service);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_cache_stats(&service);
    info!("server stopped");
    Ok(())
}

fn log_cache_stats(service: &DictionaryService) {
    let stats = service.cache().stats();
    let (case_sensitive, case_insensitive) = service.cache().sizes();
    info!(
        hits = stats.hits,
        misses = stats.misses,
        recorded = stats.recorded,
        evicted = stats.evicted,
        resets = stats.resets,
        hit_rate = stats.hit_rate(),
        case_sensitive,
        case_insensitive,
        "negative cache stats"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        method = %method,
        path = uri.path(),
        query = uri.query().unwrap_or(""),
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request"
    );
    response
}

/// Run a service call on the blocking pool.
async fn blocking<T, F>(state: &SharedState, f: F) -> std::result::Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&DictionaryService) -> Result<T> + Send + 'static,
{
    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|err| ApiError::Task(err.to_string()))?
        .map_err(ApiError::from)
}

fn flag(params: &Params, name: &str) -> bool {
    params.contains_key(name)
}

/// Parse a numeric parameter. A parameter present without a value yields
/// `when_empty`.
fn number(
    params: &Params,
    name: &'static str,
    when_empty: Option<u64>,
) -> std::result::Result<Option<u64>, ApiError> {
    match params.get(name).map(|value| value.trim()) {
        None => Ok(None),
        Some("") => Ok(when_empty),
        Some(value) => value.parse().map(Some).map_err(|_| {
            ApiError::from(LexiconError::InvalidParameter {
                name,
                value: value.to_string(),
            })
        }),
    }
}

async fn health() -> Json<&'static str> {
    Json("OK")
}

async fn definition(
    State(state): State<SharedState>,
    Path(uri): Path<String>,
    Query(params): Query<Params>,
) -> std::result::Result<Response, ApiError> {
    let fields = params.get("fields").cloned();
    let siblings = flag(&params, "siblings");

    let found = blocking(&state, move |service| {
        service.lookup_by_identifier(&uri, fields.as_deref(), siblings)
    })
    .await?
    .ok_or(ApiError::NotFound("Entry Not Found"))?;

    Ok(Json(Envelope::new(state.version.clone(), found)).into_response())
}

async fn definition_by_word(
    State(state): State<SharedState>,
    Path(word): Path<String>,
    Query(params): Query<Params>,
) -> std::result::Result<Response, ApiError> {
    let fields = params.get("fields").cloned();

    let definition = blocking(&state, move |service| {
        service.lookup_by_key(&word, fields.as_deref())
    })
    .await?
    .ok_or(ApiError::NotFound("Entry Not Found"))?;

    Ok(Json(Envelope::new(state.version.clone(), Definition { definition })).into_response())
}

async fn definitions(
    State(state): State<SharedState>,
    Path(searchable): Path<String>,
    Query(params): Query<Params>,
) -> std::result::Result<Response, ApiError> {
    let search = SearchParams {
        searchable,
        fields: params.get("fields").cloned(),
        exact: flag(&params, "exact"),
        case_sensitive: flag(&params, "caseSensitive"),
        limit: number(&params, "limit", None)?,
        offset: number(&params, "offset", Some(0))?,
    };

    let result = blocking(&state, move |service| service.search(&search))
        .await?
        .ok_or(ApiError::NotFound("Entries Not Found"))?;

    Ok(Json(Envelope::new(state.version.clone(), result)).into_response())
}

async fn facts(
    State(state): State<SharedState>,
    Path(title): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let fact: Fact = title.parse().map_err(|_| ApiError::NotFound("Not Found"))?;
    let facts = blocking(&state, move |service| service.facts(fact)).await?;

    Ok(Json(Envelope::new(state.version.clone(), Facts { facts })).into_response())
}

async fn not_found() -> (StatusCode, Json<&'static str>) {
    (StatusCode::NOT_FOUND, Json("Not Found"))
}

async fn wrong_location(State(state): State<SharedState>, request: Request) -> Response {
    let prefix = state.prefix().unwrap_or_default();
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let message = format!("The API is located at {host}/{prefix}");
    (StatusCode::MOVED_PERMANENTLY, Json(message)).into_response()
}
