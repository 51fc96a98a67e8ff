mod common;

use axum::http::StatusCode;
use serde_json::json;
use shortlink::domain::repositories::LinkRepository;

#[tokio::test]
async fn test_list_links_requires_identity() {
    let app = common::spawn_app();

    let response = app.server.get("/api/urls").await;

    response.assert_status_unauthorized();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn test_list_links_only_returns_own_links() {
    let app = common::spawn_app();
    for i in 0..5 {
        common::create_test_link(
            &app.store,
            &format!("alice{i}"),
            "https://example.com/",
            Some("alice"),
        )
        .await;
    }
    common::create_test_link(&app.store, "bob0", "https://example.com/", Some("bob")).await;

    let response = app
        .server
        .get("/api/urls")
        .add_query_param("page", 2)
        .add_query_param("limit", 2)
        .add_header("X-User-Id", "alice")
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();

    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(
        items
            .iter()
            .all(|i| i["code"].as_str().unwrap().starts_with("alice"))
    );
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["total"], 5);
    assert_eq!(json["pagination"]["pages"], 3);
}

#[tokio::test]
async fn test_list_links_invalid_limit() {
    let app = common::spawn_app();

    app.server
        .get("/api/urls")
        .add_query_param("limit", 500)
        .add_header("X-User-Id", "alice")
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_link_details_owner_and_stranger() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "mine", "https://example.com/", Some("alice")).await;

    let response = app
        .server
        .get("/api/urls/mine")
        .add_header("X-User-Id", "alice")
        .await;
    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["short_url"], format!("{}/mine", common::BASE_URL));

    app.server
        .get("/api/urls/mine")
        .add_header("X-User-Id", "mallory")
        .await
        .assert_status_forbidden();

    app.server
        .get("/api/urls/mine")
        .add_header("X-User-Id", "root")
        .add_header("X-User-Role", "admin")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_link_details_not_found() {
    let app = common::spawn_app();

    app.server
        .get("/api/urls/missing")
        .add_header("X-User-Id", "alice")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_link() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "edit", "https://example.com/", Some("alice")).await;

    let response = app
        .server
        .put("/api/urls/edit")
        .add_header("X-User-Id", "alice")
        .json(&json!({ "title": "Renamed", "tags": ["x"], "active": false }))
        .await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["tags"], json!(["x"]));
    assert_eq!(json["active"], false);

    let stored = app.store.find_by_code("edit").await.unwrap().unwrap();
    assert!(!stored.active);
    assert_eq!(stored.target_url, "https://example.com/");

    // Clearing the title with an explicit null.
    let response = app
        .server
        .put("/api/urls/edit")
        .add_header("X-User-Id", "alice")
        .json(&json!({ "title": null }))
        .await;
    response.assert_status_ok();
    assert!(response.json::<serde_json::Value>()["title"].is_null());
}

#[tokio::test]
async fn test_update_link_rejects_empty_patch() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "edit", "https://example.com/", Some("alice")).await;

    app.server
        .put("/api/urls/edit")
        .add_header("X-User-Id", "alice")
        .json(&json!({}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn test_update_title_too_long_rejected() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "titled", "https://example.com/", Some("alice")).await;

    app.server
        .put("/api/urls/titled")
        .add_header("X-User-Id", "alice")
        .json(&json!({ "title": "t".repeat(201) }))
        .await
        .assert_status_bad_request();

    app.server
        .put("/api/urls/titled")
        .add_header("X-User-Id", "alice")
        .json(&json!({ "title": "t".repeat(200) }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_update_link_by_stranger_forbidden() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "edit", "https://example.com/", Some("alice")).await;

    app.server
        .put("/api/urls/edit")
        .add_header("X-User-Id", "bob")
        .json(&json!({ "active": false }))
        .await
        .assert_status_forbidden();

    let stored = app.store.find_by_code("edit").await.unwrap().unwrap();
    assert!(stored.active);
}

#[tokio::test]
async fn test_delete_link() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "gone", "https://example.com/", Some("alice")).await;

    app.server
        .delete("/api/urls/gone")
        .add_header("X-User-Id", "alice")
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(app.store.find_by_code("gone").await.unwrap().is_none());

    app.server
        .delete("/api/urls/gone")
        .add_header("X-User-Id", "alice")
        .await
        .assert_status_not_found();

    app.server.get("/gone").await.assert_status_not_found();
}

#[tokio::test]
async fn test_anonymous_link_cannot_be_deleted() {
    let app = common::spawn_app();
    common::create_test_link(&app.store, "anon", "https://example.com/", None).await;

    app.server
        .delete("/api/urls/anon")
        .add_header("X-User-Id", "alice")
        .await
        .assert_status_forbidden();

    app.server
        .delete("/api/urls/anon")
        .add_header("X-User-Id", "root")
        .add_header("X-User-Role", "admin")
        .await
        .assert_status_forbidden();

    assert!(app.store.find_by_code("anon").await.unwrap().is_some());
}
