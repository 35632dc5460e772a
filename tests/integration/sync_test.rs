//! Reconciliation over HTTP against out-of-band object store changes.

use axum::http::StatusCode;
use bytes::Bytes;
use websharex_core::traits::storage::StorageProvider;

use crate::helpers::{TestApp, find_entry};

async fn put(app: &TestApp, key: &str, data: &'static [u8]) {
    app.storage
        .put(key, Bytes::from_static(data), "application/octet-stream")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_sync_synthesizes_entries_from_listing() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    put(&app, "demo/a/b/c.txt", b"ccc").await;
    put(&app, "demo/a/d.txt", b"dddd").await;
    put(&app, "demo/e.json", b"{}").await;

    let response = app.request("POST", "/api/rooms/demo/sync", None).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["added"], 5);
    assert_eq!(response.data()["removed"], 0);

    let entries = app.entries("demo").await;
    let a = find_entry(&entries, "a");
    let b = find_entry(&entries, "b");
    assert_eq!(a["type"], "folder");
    assert!(a["parent_id"].is_null());
    assert_eq!(b["parent_id"], a["id"]);
    assert_eq!(find_entry(&entries, "c.txt")["parent_id"], b["id"]);
    assert_eq!(find_entry(&entries, "d.txt")["size"], 4);
    assert_eq!(find_entry(&entries, "e.json")["mime_type"], "application/json");

    let second = app.request("POST", "/api/rooms/demo/sync", None).await;
    assert_eq!(second.data()["added"], 0);
    assert_eq!(second.data()["removed"], 0);
    assert_eq!(second.data()["reparented"], 0);
}

#[tokio::test]
async fn test_sync_prunes_entries_whose_objects_vanished() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    app.upload("demo", None, &[("f1.txt", "one"), ("f2.txt", "two")]).await;
    app.storage.delete("demo/f1.txt").await.unwrap();

    let response = app.request("POST", "/api/rooms/demo/sync", None).await;
    assert_eq!(response.data()["removed"], 1);

    let entries = app.entries("demo").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "f2.txt");
}

#[tokio::test]
async fn test_sync_all_rooms_and_unknown_room() {
    let app = TestApp::new();
    app.create_room("alpha", "pw").await;
    app.create_room("beta", "pw").await;
    put(&app, "beta/x.txt", b"x").await;

    let response = app.request("POST", "/api/sync", None).await;
    assert_eq!(response.status, StatusCode::OK);
    let results = response.data().as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[1]["room"], "beta");
    assert_eq!(results[1]["report"]["added"], 1);

    let missing = app.request("POST", "/api/rooms/ghost/sync", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_reports_storage_outage() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    app.storage.set_unavailable(true).await;

    let response = app.request("POST", "/api/rooms/demo/sync", None).await;
    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.error_code(), "STORAGE_UNAVAILABLE");
}
