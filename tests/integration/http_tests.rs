use axum::http::StatusCode;
use serde_json::json;

use lexicon::query::{LimitPolicy, QueryLimits};

use crate::common::{TestApp, VERSION};

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_definition_default_fields() {
    let app = TestApp::new();
    let (status, body) = app.get("/definition/logos").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": {
            "version": VERSION,
            "definition": {"uri": "logos", "word": "λόγος", "excerpt": "excerpt of λόγος"}
        }})
    );
}

#[tokio::test]
async fn test_definition_with_siblings() {
    let app = TestApp::new();
    let (status, body) = app.get("/definition/anthropinos?fields=word&siblings").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({
            "version": VERSION,
            "definition": {"word": "ἀνθρώπινος"},
            "siblings": {
                "previous": {"uri": "anthropeios", "word": "ἀνθρώπειος"},
                "next": {"uri": "anthropos", "word": "ἄνθρωπος"}
            }
        })
    );
}

#[tokio::test]
async fn test_last_entry_siblings() {
    let app = TestApp::new();
    let (_, body) = app.get("/definition/logos?siblings").await;
    assert_eq!(body["data"]["siblings"]["next"], json!({}));
    assert_eq!(body["data"]["siblings"]["previous"]["uri"], "anthropos");
}

#[tokio::test]
async fn test_definition_not_found() {
    let app = TestApp::new();
    let (status, body) = app.get("/definition/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Entry Not Found"));
}

#[tokio::test]
async fn test_definition_invalid_fields() {
    let app = TestApp::new();
    for path in [
        "/definition/logos?fields=uri,orderedID",
        "/definition/logos?fields=",
        "/definition/logos?fields=uri,,word",
    ] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(body, json!("Request Invalid Fields"));
    }
}

#[tokio::test]
async fn test_trailing_comma_in_fields_is_ignored() {
    let app = TestApp::new();
    let (status, body) = app.get("/definition/logos?fields=uri,").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["definition"], json!({"uri": "logos"}));
}

#[tokio::test]
async fn test_definition_by_word() {
    let app = TestApp::new();
    let (status, body) = app.get("/definition/word/ἄνθρωπος?fields=uri,htmlDefinition").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["definition"],
        json!({"uri": "anthropos", "htmlDefinition": "<p>ἄνθρωπος</p>"})
    );
    assert!(body["data"].get("siblings").is_none());
}

#[tokio::test]
async fn test_prefix_search() {
    let app = TestApp::new();
    let (status, body) = app.get("/definitions/ανθρωπ?fields=uri&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"data": {
            "version": VERSION,
            "count": 2,
            "countAll": 3,
            "definitions": [{"uri": "anthropeios"}, {"uri": "anthropinos"}]
        }})
    );
}

#[tokio::test]
async fn test_search_pagination() {
    let app = TestApp::new();
    let (_, body) = app.get("/definitions/ανθρωπ?fields=uri&limit=2&offset=2").await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["countAll"], 3);
    assert_eq!(body["data"]["definitions"], json!([{"uri": "anthropos"}]));
}

#[tokio::test]
async fn test_exact_search() {
    let app = TestApp::new();
    let (status, body) = app.get("/definitions/ΑΝΘΡΩΠΟΣ?exact&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["definitions"][0]["uri"], "anthropos");
    assert!(body["data"]["definitions"][0].get("orderedID").is_none());
}

#[tokio::test]
async fn test_case_sensitive_search() {
    let app = TestApp::new();

    let (status, _) = app.get("/definitions/ανθεια?caseSensitive&limit=10").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/definitions/Ανθεια?caseSensitive&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["definitions"][0]["uri"], "antheia");
}

#[tokio::test]
async fn test_search_not_found_is_cached() {
    let app = TestApp::new();

    for _ in 0..2 {
        let (status, body) = app.get("/definitions/ωμεγα?limit=10").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!("Entries Not Found"));
    }

    assert_eq!(app.service.cache().sizes(), (0, 1));
    assert_eq!(app.service.cache().stats().hits, 1);
}

#[tokio::test]
async fn test_empty_offset_bypasses_cache() {
    let app = TestApp::new();

    let (status, _) = app.get("/definitions/ωω?limit=5&offset=").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.service.cache().sizes(), (0, 0));

    let (status, _) = app.get("/definitions/ωω?limit=5").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.service.cache().sizes(), (0, 1));
}

#[tokio::test]
async fn test_search_limit_errors() {
    let app = TestApp::new();

    for path in [
        "/definitions/αν",
        "/definitions/αν?limit",
        "/definitions/αν?limit=0",
        "/definitions/αν?limit=2501",
        "/definitions/αν?limit=ten",
        "/definitions/αν?limit=5&offset=-1",
    ] {
        let (status, body) = app.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
        assert!(body.is_string(), "{path}");
    }
}

#[tokio::test]
async fn test_missing_limit_message_suggests_value() {
    let app = TestApp::new();
    let (_, body) = app.get("/definitions/αν").await;
    assert!(body.as_str().unwrap().contains("limit=2495"));
}

#[tokio::test]
async fn test_clamped_limit() {
    let app = TestApp::with_service(|service| {
        service.with_limits(QueryLimits {
            max_rows: 3,
            policy: LimitPolicy::Clamp,
        })
    });

    let (status, body) = app.get("/definitions/α?limit=100").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
    assert_eq!(body["data"]["countAll"], 6);

    let (status, body) = app.get("/definitions/α").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3);
}

#[tokio::test]
async fn test_unacceptable_search() {
    let app = TestApp::new();
    for path in [
        "/definitions/logos?limit=5",
        "/definitions/ αν?limit=5",
        "/definitions/ανhh?limit=5",
        "/definitions/ανθρωππππος?limit=5",
    ] {
        let (status, _) = app.get(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn test_facts() {
    let app = TestApp::new();

    let (status, body) = app.get("/facts/longest-words").await;
    assert_eq!(status, StatusCode::OK);
    let facts = body["data"]["facts"].as_array().unwrap();
    assert_eq!(facts.len(), 7);
    assert!(facts.iter().all(|fact| fact["length"].is_u64()));

    let (status, _) = app.get("/facts/shortest-words").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::new();
    let (status, body) = app.get("/lemma/logos").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!("Not Found"));
}
