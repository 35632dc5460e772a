//! Share links over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

async fn upload_one(app: &TestApp) -> String {
    app.create_room("demo", "pw").await;
    let response = app.upload("demo", None, &[("report.txt", "numbers")]).await;
    response.data()[0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_share_without_password() {
    let app = TestApp::new();
    let id = upload_one(&app).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{id}/share"),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    let share = &response.data()["share"];
    assert_eq!(share["enabled"], true);
    assert_eq!(share["has_password"], false);
    let token = share["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);

    let access = app
        .request("GET", &format!("/api/share/demo/{token}"), None)
        .await;
    assert_eq!(access.status, StatusCode::OK);
    assert_eq!(access.data()["name"], "report.txt");
    assert_eq!(access.data()["size"], 7);
    assert!(access.data()["url"].as_str().unwrap().starts_with("memory://"));

    let again = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{id}/share"),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(again.data()["share"]["token"], token.as_str());
}

#[tokio::test]
async fn test_share_password_and_disable() {
    let app = TestApp::new();
    let id = upload_one(&app).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{id}/share"),
            Some(json!({ "enabled": true, "password": "letmein" })),
        )
        .await;
    let share = &response.data()["share"];
    assert_eq!(share["has_password"], true);
    assert!(!response.body.to_string().contains("argon2"));
    let token = share["token"].as_str().unwrap().to_string();

    let missing = app
        .request("GET", &format!("/api/share/demo/{token}"), None)
        .await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), "AUTHENTICATION");

    let wrong = app
        .request("GET", &format!("/api/share/demo/{token}?password=nope"), None)
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let right = app
        .request("GET", &format!("/api/share/demo/{token}?password=letmein"), None)
        .await;
    assert_eq!(right.status, StatusCode::OK);

    let disabled = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{id}/share"),
            Some(json!({ "enabled": false })),
        )
        .await;
    assert_eq!(disabled.data()["share"]["enabled"], false);
    assert!(disabled.data()["share"]["token"].is_null());

    let dead = app
        .request("GET", &format!("/api/share/demo/{token}?password=letmein"), None)
        .await;
    assert_eq!(dead.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_share_and_folder_share() {
    let app = TestApp::new();
    let id = upload_one(&app).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{id}/share"),
            Some(json!({ "enabled": true, "expires_at": "2000-01-01T00:00:00Z" })),
        )
        .await;
    let token = response.data()["share"]["token"].as_str().unwrap().to_string();
    let expired = app
        .request("GET", &format!("/api/share/demo/{token}"), None)
        .await;
    assert_eq!(expired.status, StatusCode::NOT_FOUND);

    let folder = app.create_folder("demo", "docs", None).await;
    let rejected = app
        .request(
            "PUT",
            &format!("/api/rooms/demo/entries/{folder}/share"),
            Some(json!({ "enabled": true })),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.error_code(), "VALIDATION");
}
