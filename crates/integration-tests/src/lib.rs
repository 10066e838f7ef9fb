//! Integration tests for Event Blog.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests over the in-memory store
//! cargo test -p event-blog-integration-tests
//!
//! # Include the PostgreSQL tests
//! EVENT_BLOG_TEST_DATABASE_URL=postgres://localhost/postgres \
//!     cargo test -p event-blog-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `api_routes` - Full HTTP round trips through the router
//! - `postgres_store` - The consistency layer against a real database

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use event_blog_api::config::{ApiConfig, DatabaseSettings};
use event_blog_api::db::ConnectionSupervisor;
use event_blog_api::db::memory::{MemoryConnector, MemoryStore};
use event_blog_api::routes;
use event_blog_api::state::AppState;

/// A router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub connector: Arc<MemoryConnector>,
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        Self::with_connector(MemoryConnector::new(Arc::new(MemoryStore::new())))
    }

    /// A router whose database connection always fails.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::with_connector(
            MemoryConnector::new(Arc::new(MemoryStore::new())).refusing("connection refused"),
        )
    }

    fn with_connector(connector: MemoryConnector) -> Self {
        let connector = Arc::new(connector);
        let store = Arc::clone(connector.store());
        let supervisor = Arc::new(ConnectionSupervisor::with_settings(
            Arc::clone(&connector) as Arc<dyn event_blog_api::db::Connector>,
            DatabaseSettings::new("memory://", "event_blog_it"),
        ));
        let state = AppState::new(ApiConfig::default(), supervisor);

        Self {
            router: routes::app(state),
            store,
            connector,
        }
    }

    /// Send a request and decode the JSON response body (`Null` if empty).
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&self, method: Method, uri: &str, body: Option<&Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
