//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api                          - Endpoint index
//! GET    /api/health                   - Liveness check
//! GET    /api/health/ready             - Readiness (provisions collections)
//!
//! # Users
//! POST   /api/register                 - Register with email and password
//! POST   /api/login                    - Verify email and password
//!
//! # Events
//! GET    /api/events                   - List events
//! POST   /api/events                   - Create an event
//!
//! # Inventory
//! GET    /api/stocks                   - List stocks
//! POST   /api/stocks                   - Create a stock
//! DELETE /api/stocks/{stock_id}        - Delete a stock and its products
//! GET    /api/products?stock_id=       - List products, optionally by stock
//! PUT    /api/products                 - Create a product
//! DELETE /api/products/{product_id}    - Delete a product
//! GET    /api/categories?stock_id=     - List categories of a stock
//! POST   /api/categories               - Create categories in bulk
//! DELETE /api/categories/{category_id} - Delete a category, clearing product labels
//! ```
//!
//! Handlers validate input here; nothing unvalidated reaches the
//! repositories.

pub mod auth;
pub mod categories;
pub mod events;
pub mod health;
pub mod index;
pub mod products;
pub mod stocks;

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origin);

    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Routes under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index::index))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/events", get(events::list).post(events::create))
        .route("/stocks", get(stocks::list).post(stocks::create))
        .route("/stocks/{stock_id}", delete(stocks::delete))
        .route("/products", get(products::list).put(products::create))
        .route("/products/{product_id}", delete(products::delete))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/{category_id}", delete(categories::delete))
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin, "ignoring invalid CORS origin");
            layer
        }
    }
}

/// Unwrap a JSON body, turning any rejection into a 400.
pub(crate) fn payload<T>(body: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|_| AppError::BadRequest("invalid JSON payload".to_string()))
}

/// A trimmed, non-empty string.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String> {
    optional(value).ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// A trimmed string, with blank treated as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse an identifier supplied by the client.
pub(crate) fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{field} must be a valid UUID")))
}
