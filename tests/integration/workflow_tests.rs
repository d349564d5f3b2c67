use std::sync::Arc;

use axum::http::StatusCode;

use lexicon::app::AppContext;
use lexicon::config::Config;
use lexicon::query::{LimitPolicy, OverflowPolicy};
use lexicon::server::{self, ServerState};
use lexicon::service::SearchParams;
use lexicon::test_utils::fixtures::DictionaryFixture;

use crate::common::get;

fn write_config(dir: &std::path::Path, fixture: &DictionaryFixture, extra: &str) -> std::path::PathBuf {
    let path = dir.join("lexicon.toml");
    let body = format!(
        "[database]\npath = {:?}\nversion = \"2024.1\"\npool_size = 2\n{extra}",
        fixture.path().display().to_string()
    );
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_context_from_config_file() {
    let fixture = DictionaryFixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        &fixture,
        "[query]\nlimit_policy = \"clamp\"\nmax_rows = 4\ndefault_fields = \"uri\"\n\n[cache]\ncapacity = 1\noverflow = \"reset\"\n",
    );

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.query.limit_policy, LimitPolicy::Clamp);
    assert_eq!(config.cache.overflow, OverflowPolicy::Reset);

    let ctx = AppContext::from_config(config).unwrap();
    let result = ctx.service.search(&SearchParams::new("α")).unwrap().unwrap();
    assert_eq!(result.count, 4);
    assert_eq!(result.count_all, 6);
    assert!(result.definitions.iter().all(|row| row.len() == 1));

    for miss in ["ωω", "ψψ"] {
        assert!(ctx.service.search(&SearchParams::new(miss)).unwrap().is_none());
    }
    assert_eq!(ctx.service.cache().sizes(), (0, 1));
}

#[test]
fn test_context_rejects_missing_database() {
    let mut config = Config::default();
    config.database.path = tempfile::tempdir().unwrap().path().join("absent.db");
    assert!(AppContext::from_config(config).is_err());
}

#[tokio::test]
async fn test_version_from_config_reaches_envelope() {
    let fixture = DictionaryFixture::new();
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), &fixture, "[server]\nurl_prefix = \"v\"\n");

    let ctx = AppContext::from_config(Config::load(Some(&path)).unwrap()).unwrap();
    let state = ServerState::new(Arc::clone(&ctx.service), ctx.config.database.version.clone())
        .with_prefix(ctx.config.server.url_prefix.clone());
    let router = server::router(state);

    let (status, body) = get(&router, "/v/definition/logos").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], "2024.1");
}
