//! Endpoint index for quick discovery.

use axum::Json;
use serde::Serialize;

/// One entry in the endpoint index.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Response body of `GET /api`.
#[derive(Debug, Serialize)]
pub struct ApiIndex {
    pub name: &'static str,
    pub endpoints: &'static [Endpoint],
}

const fn endpoint(
    method: &'static str,
    path: &'static str,
    description: &'static str,
) -> Endpoint {
    Endpoint {
        method,
        path,
        description,
    }
}

const ENDPOINTS: &[Endpoint] = &[
    endpoint("GET", "/api/health", "Health check endpoint"),
    endpoint("GET", "/api/health/ready", "Readiness check (database provisioned)"),
    endpoint("POST", "/api/register", "Register a new user"),
    endpoint("POST", "/api/login", "Login user with email and password"),
    endpoint("POST", "/api/events", "Create a new event"),
    endpoint("GET", "/api/events", "List events"),
    endpoint("GET", "/api/products", "List products"),
    endpoint("PUT", "/api/products", "Create a new product"),
    endpoint("DELETE", "/api/products/{product_id}", "Delete a product"),
    endpoint("GET", "/api/stocks", "List stocks"),
    endpoint("POST", "/api/stocks", "Create a stock"),
    endpoint(
        "DELETE",
        "/api/stocks/{stock_id}",
        "Delete a stock and related products",
    ),
    endpoint("GET", "/api/categories", "List categories for a stock"),
    endpoint("POST", "/api/categories", "Create categories in bulk"),
    endpoint(
        "DELETE",
        "/api/categories/{category_id}",
        "Delete a category and clear related product category labels",
    ),
];

/// `GET /api`
pub async fn index() -> Json<ApiIndex> {
    Json(ApiIndex {
        name: "Event Blog API",
        endpoints: ENDPOINTS,
    })
}
