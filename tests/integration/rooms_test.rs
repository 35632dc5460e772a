//! Room lifecycle over HTTP.

use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::json;
use websharex_core::traits::storage::StorageProvider;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_get_and_list_rooms() {
    let app = TestApp::new();
    app.create_room("demo", "s3cret").await;
    app.create_room("alpha", "pw").await;

    let response = app.request("GET", "/api/rooms/demo", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["name"], "demo");
    assert!(response.data()["entries"].as_array().unwrap().is_empty());
    assert!(response.data().get("password_hash").is_none());

    let response = app.request("GET", "/api/rooms", None).await;
    let names: Vec<&str> = response
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "demo"]);
}

#[tokio::test]
async fn test_create_room_rejects_duplicates_and_bad_names() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;

    let dup = app
        .request("POST", "/api/rooms", Some(json!({ "name": "demo", "password": "x" })))
        .await;
    assert_eq!(dup.status, StatusCode::CONFLICT);
    assert_eq!(dup.error_code(), "CONFLICT");

    let slash = app
        .request("POST", "/api/rooms", Some(json!({ "name": "a/b", "password": "x" })))
        .await;
    assert_eq!(slash.status, StatusCode::BAD_REQUEST);
    assert_eq!(slash.error_code(), "INVALID_NAME");

    let blank = app
        .request("POST", "/api/rooms", Some(json!({ "name": "", "password": "x" })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.error_code(), "VALIDATION");
}

#[tokio::test]
async fn test_verify_password() {
    let app = TestApp::new();
    app.create_room("demo", "s3cret").await;

    let ok = app
        .request("POST", "/api/rooms/demo/verify", Some(json!({ "password": "s3cret" })))
        .await;
    assert_eq!(ok.data()["valid"], true);

    let wrong = app
        .request("POST", "/api/rooms/demo/verify", Some(json!({ "password": "nope" })))
        .await;
    assert_eq!(wrong.data()["valid"], false);

    let missing = app
        .request("POST", "/api/rooms/ghost/verify", Some(json!({ "password": "x" })))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_room_removes_its_objects() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    app.upload("demo", None, &[("a.txt", "aaa"), ("b.txt", "bbb")]).await;
    app.storage
        .put("other/keep.txt", Bytes::from_static(b"k"), "text/plain")
        .await
        .unwrap();

    let response = app.request("DELETE", "/api/rooms/demo", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["objects_deleted"], 2);
    assert_eq!(app.storage.keys().await, vec!["other/keep.txt".to_string()]);

    let gone = app.request("GET", "/api/rooms/demo", None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let response = app.request("GET", "/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");

    let detailed = app.request("GET", "/api/health/detailed", None).await;
    assert_eq!(detailed.data()["status"], "ok");
    assert_eq!(detailed.data()["storage_provider"], "memory");

    app.storage.set_unavailable(true).await;
    let degraded = app.request("GET", "/api/health/detailed", None).await;
    assert_eq!(degraded.data()["status"], "degraded");
    assert_eq!(degraded.data()["storage"], "unavailable");
}
