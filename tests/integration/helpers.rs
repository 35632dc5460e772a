//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use websharex_core::config::{AppConfig, DatabaseProvider, StorageProviderKind};
use websharex_database::MemoryRoomRepository;
use websharex_service::{ServiceContext, ServiceSettings};
use websharex_storage::MemoryStorageProvider;

const BOUNDARY: &str = "websharex-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Room store shared with the router
    pub store: MemoryRoomRepository,
    /// Object store shared with the router, for out-of-band changes
    pub storage: MemoryStorageProvider,
}

impl TestApp {
    /// Create a new test application over in-memory backends
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.storage.provider = StorageProviderKind::Memory;
        config.storage.list_page_size = 2;

        let store = MemoryRoomRepository::new();
        let storage = MemoryStorageProvider::new();
        let ctx = Arc::new(ServiceContext::new(
            Arc::new(store.clone()),
            Arc::new(storage.clone()),
            ServiceSettings::from_config(&config),
        ));
        let router = websharex_api::build_app(websharex_api::AppState::new(config, ctx));

        Self {
            router,
            store,
            storage,
        }
    }

    /// Make a JSON request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload files as one multipart request
    pub async fn upload(
        &self,
        room: &str,
        parent_id: Option<&str>,
        files: &[(&str, &str)],
    ) -> TestResponse {
        let mut body = String::new();
        if let Some(parent) = parent_id {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"parent_id\"\r\n\r\n{parent}\r\n"
            ));
        }
        for (name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: text/plain\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/rooms/{room}/files"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a room and assert success
    pub async fn create_room(&self, name: &str, password: &str) {
        let response = self
            .request(
                "POST",
                "/api/rooms",
                Some(serde_json::json!({ "name": name, "password": password })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    }

    /// Create a folder and return its id
    pub async fn create_folder(&self, room: &str, name: &str, parent_id: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                &format!("/api/rooms/{room}/folders"),
                Some(serde_json::json!({ "name": name, "parent_id": parent_id })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data()["id"]
            .as_str()
            .expect("folder id")
            .to_string()
    }

    /// All entries of a room
    pub async fn entries(&self, room: &str) -> Vec<Value> {
        let response = self
            .request("GET", &format!("/api/rooms/{room}/entries"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.data().as_array().cloned().unwrap_or_default()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `error` code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Find an entry by name in a listing
pub fn find_entry<'a>(entries: &'a [Value], name: &str) -> &'a Value {
    entries
        .iter()
        .find(|e| e["name"] == name)
        .unwrap_or_else(|| panic!("no entry named {name} in {entries:?}"))
}
