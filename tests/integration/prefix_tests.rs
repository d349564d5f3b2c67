use axum::http::StatusCode;
use serde_json::json;

use crate::common::TestApp;

#[tokio::test]
async fn test_routes_live_under_prefix() {
    let app = TestApp::with_prefix("api");

    let (status, body) = app.get("/api/definition/logos?fields=uri").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["definition"], json!({"uri": "logos"}));

    let (status, body) = app.get("/api/definitions/λογ?fields=uri&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn test_prefix_root_is_health() {
    let app = TestApp::with_prefix("api");
    for path in ["/api", "/api/"] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body, json!("OK"));
    }
}

#[tokio::test]
async fn test_outside_prefix_is_moved() {
    let app = TestApp::with_prefix("api");

    for path in ["/", "/definition/logos", "/apiary/definition/logos"] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::MOVED_PERMANENTLY, "{path}");
        assert_eq!(body, json!("The API is located at dictionary.test/api"));
    }
}

#[tokio::test]
async fn test_unknown_route_inside_prefix() {
    let app = TestApp::with_prefix("api");
    let (status, body) = app.get("/api/lemma/logos").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Not Found"));
}
