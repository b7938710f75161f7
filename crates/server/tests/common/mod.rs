//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock storage and mailing list injected, so the HTTP surface can be
//! exercised without a database or network.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use timeline_quiz_core::{
    create_mailing_system, firearms,
    testing::{MockMailingList, MockSnapshotStorage},
    Config, ItemCatalog, MailingListHandle,
};
use timeline_quiz_server::state::AppState;

/// Re-export fixtures for test convenience
pub use timeline_quiz_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_open_session() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/sessions", json!({})).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared application state behind the router
    pub state: Arc<AppState>,
    /// Mock snapshot storage - inspect saved progress
    pub storage: Arc<MockSnapshotStorage>,
    /// Mock mailing list - inspect subscriptions
    pub mailing_list: Arc<MockMailingList>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with the built-in items.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let storage = Arc::new(MockSnapshotStorage::new());
        let mailing_list = Arc::new(MockMailingList::new());

        let handle = if test_config.disable_mailing_list {
            MailingListHandle::disabled()
        } else {
            let (handle, worker) = create_mailing_system(mailing_list.clone(), 16);
            tokio::spawn(worker.run());
            handle
        };

        let catalog = test_config.catalog.unwrap_or_else(firearms);
        let state = Arc::new(AppState::new(
            Config::default(),
            Arc::new(catalog),
            storage.clone(),
            handle,
        ));

        let router = timeline_quiz_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            storage,
            mailing_list,
        }
    }

    /// Open a fresh session and return its id.
    pub async fn open_session(&self) -> String {
        let response = self.post("/api/v1/sessions", serde_json::json!({})).await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["session_id"]
            .as_str()
            .expect("session_id in response")
            .to_string()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch a non-JSON body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
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

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Items to serve; the built-in set when `None`
    pub catalog: Option<ItemCatalog>,
    /// Run without a mailing list behind unlock
    pub disable_mailing_list: bool,
}

impl TestConfig {
    /// Create config serving the given items.
    pub fn with_catalog(catalog: ItemCatalog) -> Self {
        Self {
            catalog: Some(catalog),
            ..Default::default()
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
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
