//! Common test utilities for in-process API testing.
//!
//! The fixture builds the real router over a temporary SQLite database and a
//! mock object store, so requests run end to end without external services.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ticketdesk_core::config::{DatabaseConfig, StorageConfig};
use ticketdesk_core::testing::MockObjectStore;
use ticketdesk_core::{Config, FsObjectStore, ObjectStore, SqliteTicketStore, TicketStore};
use ticketdesk_server::api::create_router;
use ticketdesk_server::state::AppState;

/// Re-export fixtures for test convenience
#[allow(unused_imports)]
pub use ticketdesk_core::testing::fixtures;

/// Upload limit used by fixtures, small enough to exceed in a test.
pub const TEST_MAX_FILE_SIZE: u64 = 1024;

const BOUNDARY: &str = "ticketdesk-test-boundary";

/// In-process server with a controllable object store.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock object store, when the fixture was built with one
    pub objects: Arc<MockObjectStore>,
    /// Temporary directory for the database and stored files
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Fixture backed by the mock object store.
    pub async fn new() -> Self {
        let objects = Arc::new(MockObjectStore::new());
        Self::build(|_| Arc::clone(&objects) as Arc<dyn ObjectStore>, objects.clone())
    }

    /// Fixture backed by a filesystem object store in the temp dir.
    #[allow(dead_code)]
    pub async fn with_fs_storage() -> Self {
        Self::build(
            |config| {
                Arc::new(FsObjectStore::new(
                    config.storage.root.clone(),
                    config.storage.public_base_url.clone(),
                )) as Arc<dyn ObjectStore>
            },
            Arc::new(MockObjectStore::new()),
        )
    }

    fn build(
        object_store: impl FnOnce(&Config) -> Arc<dyn ObjectStore>,
        objects: Arc<MockObjectStore>,
    ) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
                ..DatabaseConfig::default()
            },
            storage: StorageConfig {
                root: temp_dir.path().join("attachments"),
                max_file_size: TEST_MAX_FILE_SIZE,
                ..StorageConfig::default()
            },
            ..Config::default()
        };

        let ticket_store: Arc<dyn TicketStore> = Arc::new(
            SqliteTicketStore::new(&config.database.path)
                .expect("Failed to create ticket store"),
        );
        let object_store = object_store(&config);

        let state = Arc::new(AppState::new(config, ticket_store, object_store));
        let router = create_router(state);

        Self {
            router,
            objects,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    #[allow(dead_code)]
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a DELETE request with JSON body.
    #[allow(dead_code)]
    pub async fn delete_with_body(&self, path: &str, body: Value) -> TestResponse {
        self.request("DELETE", path, Some(body)).await
    }

    /// Send a POST request with raw body bytes.
    #[allow(dead_code)]
    pub async fn post_raw(&self, path: &str, body: &[u8]) -> TestResponse {
        self.request_raw("POST", path, body.to_vec(), "application/json")
            .await
    }

    /// Send a multipart form with one file part per `(name, bytes)` pair.
    #[allow(dead_code)]
    pub async fn post_files(&self, path: &str, files: &[(&str, &[u8])]) -> TestResponse {
        let mut body = Vec::new();
        for (name, bytes) in files {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                    name
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        self.request_raw("POST", path, body, &content_type).await
    }

    /// Send a request with raw body and custom content type.
    async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}
