mod common;

use axum::http::{StatusCode, header};
use serde_json::json;
use shortlink::application::services::{AllocatorSettings, CodeAllocator};
use shortlink::domain::repositories::LinkRepository;
use std::sync::Arc;

#[tokio::test]
async fn test_shorten_generated_code() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "Example.com/Path" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    let code = json["code"].as_str().unwrap();

    assert!(code.len() > 2);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(json["target_url"], "https://example.com/Path");
    assert_eq!(json["short_url"], format!("{}/{}", common::BASE_URL, code));
    assert_eq!(json["custom"], false);
    assert_eq!(json["click_count"], 0);

    let stored = app.store.find_by_code(code).await.unwrap().unwrap();
    assert!(stored.owner.is_none());
}

#[tokio::test]
async fn test_shorten_sets_owner_from_identity() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/shorten")
        .add_header("X-User-Id", "alice")
        .json(&json!({
            "url": "https://example.com",
            "title": "Example",
            "tags": ["docs", "demo"]
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["title"], "Example");
    assert_eq!(json["tags"], json!(["docs", "demo"]));

    let code = json["code"].as_str().unwrap();
    let stored = app.store.find_by_code(code).await.unwrap().unwrap();
    assert_eq!(stored.owner.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_shorten_with_custom_alias() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://example.com", "custom_alias": "My_Link-1" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["code"], "My_Link-1");
    assert_eq!(json["custom"], true);
}

#[tokio::test]
async fn test_shorten_alias_taken_returns_conflict() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "taken", "https://a.example", None).await;

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://b.example", "custom_alias": "taken" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "alias_taken");
}

#[tokio::test]
async fn test_shorten_invalid_alias() {
    let app = common::spawn_app();

    for alias in ["with space", "ünï", "a/b", "api"] {
        let response = app
            .server
            .post("/api/urls/shorten")
            .json(&json!({ "url": "https://example.com", "custom_alias": alias }))
            .await;

        response.assert_status_bad_request();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["error"]["code"], "invalid_alias", "alias {alias:?}");
    }
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let app = common::spawn_app();

    for url in ["", "ftp://example.com/file", "javascript:alert(1)"] {
        let response = app
            .server
            .post("/api/urls/shorten")
            .json(&json!({ "url": url }))
            .await;

        response.assert_status_bad_request();
    }
}

#[tokio::test]
async fn test_shorten_past_expiry_rejected() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://example.com", "expires_at": "2001-01-01T00:00:00Z" }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_shorten_exhausted_returns_retry_after() {
    // Clock 10 encodes to "a" and suffix index 1 to "1": every candidate is "a1".
    let app = common::spawn_app_with_allocator(|links| {
        let settings = AllocatorSettings {
            max_attempts: 3,
            suffix_length: 1,
        };
        CodeAllocator::new(links, settings)
            .with_clock(Arc::new(common::FrozenClock(10)))
            .with_random(Arc::new(common::ConstantRandom(1)))
    });
    common::create_test_link(&app.store, "a1", "https://seeded.example/", None).await;

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.header(header::RETRY_AFTER), "1");
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "code_exhausted");
    assert_eq!(json["error"]["details"]["retryable"], true);

    let seeded = app.store.find_by_code("a1").await.unwrap().unwrap();
    assert_eq!(seeded.target_url, "https://seeded.example/");

    // Custom aliases never touch the allocator.
    app.server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://example.com", "custom_alias": "manual" }))
        .await
        .assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_shorten_frozen_allocator_uses_free_candidate() {
    let app = common::spawn_app_with_allocator(|links| {
        let settings = AllocatorSettings {
            max_attempts: 3,
            suffix_length: 1,
        };
        CodeAllocator::new(links, settings)
            .with_clock(Arc::new(common::FrozenClock(10)))
            .with_random(Arc::new(common::ConstantRandom(2)))
    });
    common::create_test_link(&app.store, "a1", "https://seeded.example/", None).await;

    let response = app
        .server
        .post("/api/urls/shorten")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.json::<serde_json::Value>()["code"], "a2");
}

#[tokio::test]
async fn test_bulk_shorten_partial_failure() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/bulk")
        .add_header("X-User-Id", "alice")
        .json(&json!({
            "urls": ["https://a.example", "ftp://bad.example", "b.example/page"]
        }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["summary"]["total"], 3);
    assert_eq!(json["summary"]["successful"], 2);
    assert_eq!(json["summary"]["failed"], 1);

    let items = json["items"].as_array().unwrap();
    let failed: Vec<_> = items.iter().filter(|i| i.get("error").is_some()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["long_url"], "ftp://bad.example");

    let summary = app.store.owner_summary("alice").await.unwrap();
    assert_eq!(summary.total_links, 2);
}

#[tokio::test]
async fn test_bulk_shorten_requires_identity() {
    let app = common::spawn_app();

    let response = app
        .server
        .post("/api/urls/bulk")
        .json(&json!({ "urls": ["https://a.example"] }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_bulk_shorten_rejects_oversized_batch() {
    let app = common::spawn_app();
    let urls: Vec<String> = (0..51).map(|i| format!("https://{i}.example")).collect();

    let response = app
        .server
        .post("/api/urls/bulk")
        .add_header("X-User-Id", "alice")
        .json(&json!({ "urls": urls }))
        .await;

    response.assert_status_bad_request();
}
