//! Entry operations over HTTP: folders, uploads, rename, delete, cursor.

use axum::http::StatusCode;
use bytes::Bytes;
use serde_json::json;
use websharex_core::traits::storage::StorageProvider;

use crate::helpers::{TestApp, find_entry};

#[tokio::test]
async fn test_upload_into_folder_and_download() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    assert!(app.storage.contains("demo/docs/.keepfolder").await);

    let response = app.upload("demo", Some(&docs), &[("f2.txt", "hello")]).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let file = &response.data()[0];
    assert_eq!(file["type"], "file");
    assert_eq!(file["storage_key"], "demo/docs/f2.txt");
    assert_eq!(file["size"], 5);
    assert_eq!(file["mime_type"], "text/plain");

    let (bytes, _) = app.storage.get("demo/docs/f2.txt").await.unwrap();
    assert_eq!(&bytes[..], b"hello");

    let id = file["id"].as_str().unwrap();
    let url = app
        .request("GET", &format!("/api/rooms/demo/entries/{id}/download"), None)
        .await;
    assert_eq!(url.status, StatusCode::OK);
    assert!(url.data()["url"].as_str().unwrap().starts_with("memory://"));

    let folder_url = app
        .request("GET", &format!("/api/rooms/demo/entries/{docs}/download"), None)
        .await;
    assert_eq!(folder_url.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_requires_a_file_and_a_live_parent() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;

    let empty = app.upload("demo", None, &[]).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let ghost = "00000000-0000-0000-0000-000000000000";
    let orphan = app.upload("demo", Some(ghost), &[("a.txt", "a")]).await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);
    assert!(app.storage.keys().await.is_empty());
}

#[tokio::test]
async fn test_rename_folder_moves_descendant_keys() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    let inner = app.create_folder("demo", "2024", Some(&docs)).await;
    app.upload("demo", Some(&docs), &[("f2.txt", "two")]).await;
    app.upload("demo", Some(&inner), &[("f3.txt", "three")]).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/rooms/demo/entries/{docs}"),
            Some(json!({ "name": "papers" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["entry"]["name"], "papers");
    assert_eq!(response.data()["rekeyed"], 2);
    assert!(response.data()["storage"]["failed"].as_array().unwrap().is_empty());

    let entries = app.entries("demo").await;
    assert_eq!(find_entry(&entries, "f2.txt")["storage_key"], "demo/papers/f2.txt");
    assert_eq!(find_entry(&entries, "f3.txt")["storage_key"], "demo/papers/2024/f3.txt");

    let keys = app.storage.keys().await;
    assert!(keys.contains(&"demo/papers/f2.txt".to_string()));
    assert!(keys.contains(&"demo/papers/2024/f3.txt".to_string()));
    assert!(!keys.iter().any(|k| k.starts_with("demo/docs/")));
}

#[tokio::test]
async fn test_rename_keeps_unclaimed_objects_at_destination() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    app.upload("demo", Some(&docs), &[("a.txt", "OLD")]).await;
    app.storage
        .put("demo/papers/a.txt", Bytes::from_static(b"OUT-OF-BAND"), "text/plain")
        .await
        .unwrap();

    let response = app
        .request(
            "PATCH",
            &format!("/api/rooms/demo/entries/{docs}"),
            Some(json!({ "name": "papers" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let (bytes, _) = app.storage.get("demo/papers/a.txt").await.unwrap();
    assert_eq!(&bytes[..], b"OUT-OF-BAND");
    let entries = app.entries("demo").await;
    assert_eq!(find_entry(&entries, "docs")["name"], "docs");
    assert_eq!(find_entry(&entries, "a.txt")["storage_key"], "demo/docs/a.txt");
}

#[tokio::test]
async fn test_rename_rejects_blank_and_sibling_names() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    app.create_folder("demo", "papers", None).await;

    let blank = app
        .request(
            "PATCH",
            &format!("/api/rooms/demo/entries/{docs}"),
            Some(json!({ "name": "   " })),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.error_code(), "INVALID_NAME");

    let taken = app
        .request(
            "PATCH",
            &format!("/api/rooms/demo/entries/{docs}"),
            Some(json!({ "name": "papers" })),
        )
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let bad_id = app
        .request(
            "PATCH",
            "/api/rooms/demo/entries/not-a-uuid",
            Some(json!({ "name": "x" })),
        )
        .await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_folder_cascades_and_resets_cursor() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    let inner = app.create_folder("demo", "inner", Some(&docs)).await;
    app.upload("demo", Some(&inner), &[("deep.txt", "d")]).await;
    app.upload("demo", None, &[("top.txt", "t")]).await;

    let cursor = app
        .request(
            "PUT",
            "/api/rooms/demo/cursor",
            Some(json!({ "folder_id": inner })),
        )
        .await;
    assert_eq!(cursor.status, StatusCode::OK);
    assert_eq!(cursor.data()["current_folder_id"], inner.as_str());

    let response = app
        .request("DELETE", &format!("/api/rooms/demo/entries/{docs}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["removed"].as_array().unwrap().len(), 3);
    assert_eq!(response.data()["cursor_reset"], true);

    let entries = app.entries("demo").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "top.txt");
    assert_eq!(app.storage.keys().await, vec!["demo/top.txt".to_string()]);

    let room = app.request("GET", "/api/rooms/demo", None).await;
    assert!(room.data()["current_folder_id"].is_null());
}

#[tokio::test]
async fn test_delete_last_file_keeps_folder_visible() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let docs = app.create_folder("demo", "docs", None).await;
    let uploaded = app.upload("demo", Some(&docs), &[("only.txt", "o")]).await;
    let id = uploaded.data()[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request("DELETE", &format!("/api/rooms/demo/entries/{id}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert!(app.storage.contains("demo/docs/.keepfolder").await);
    assert!(!app.storage.contains("demo/docs/only.txt").await);
    assert_eq!(app.entries("demo").await.len(), 1);
}

#[tokio::test]
async fn test_cursor_must_name_a_live_folder() {
    let app = TestApp::new();
    app.create_room("demo", "pw").await;
    let uploaded = app.upload("demo", None, &[("a.txt", "a")]).await;
    let file_id = uploaded.data()[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PUT",
            "/api/rooms/demo/cursor",
            Some(json!({ "folder_id": file_id })),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let reset = app
        .request("PUT", "/api/rooms/demo/cursor", Some(json!({ "folder_id": null })))
        .await;
    assert_eq!(reset.status, StatusCode::OK);
}
