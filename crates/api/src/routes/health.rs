//! Liveness and readiness checks.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::error::Result;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns ok if the server is running. Does not touch the database.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness health check endpoint.
///
/// Provisions every collection through the shared supervisor. Returns 503
/// if the database is unconfigured, unreachable or cannot be set up.
pub async fn readiness(State(state): State<AppState>) -> Result<Json<Value>> {
    state.provisioner().provision_all().await?;
    Ok(Json(json!({ "status": "ready" })))
}
