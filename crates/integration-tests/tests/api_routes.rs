//! HTTP round trips through the full router over the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use event_blog_api::db::Collection;
use event_blog_integration_tests::TestApp;

async fn create_stock(app: &TestApp) -> String {
    let (status, body) = app
        .post(
            "/api/stocks",
            &json!({"owner_id": Uuid::new_v4(), "name": "Pantry"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_owned()
}

async fn create_product(app: &TestApp, stock_id: &str, category: Option<&str>) -> Value {
    let (status, body) = app
        .put(
            "/api/products",
            &json!({
                "stock_id": stock_id,
                "name": "Crackers",
                "category": category,
                "quantity": 3,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

// ============================================================================
// Meta
// ============================================================================

#[tokio::test]
async fn test_index_and_health() {
    let app = TestApp::new();

    let (status, body) = app.get("/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Event Blog API");
    assert!(
        body["endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["method"] == "DELETE" && e["path"] == "/api/categories/{category_id}")
    );

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    // Liveness never touches the database.
    assert_eq!(app.connector.attempts(), 0);
}

#[tokio::test]
async fn test_readiness_provisions_everything() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(app.store.collections_created(), Collection::ALL.len());
    assert_eq!(app.store.indexes_created(), 1);
}

#[tokio::test]
async fn test_unreachable_database_is_503_and_not_retried() {
    let app = TestApp::unreachable();

    let (status, body) = app.get("/api/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Database unavailable");

    let (status, _) = app.get("/api/stocks").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(app.connector.attempts(), 1);
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_register_duplicate_and_login() {
    let app = TestApp::new();
    let form = json!({"email": "mo@example.com", "password": "hunter22", "display_name": "Mo"});

    let (status, user) = app.post("/api/register", &form).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "mo@example.com");
    assert_eq!(user["status"], "ACTIVE");
    assert!(user.get("password_hash").is_none());

    let (status, body) = app.post("/api/register", &form).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = app
        .post(
            "/api/login",
            &json!({"email": "MO@example.com", "password": "hunter22"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user["id"]);

    let (status, _) = app
        .post(
            "/api/login",
            &json!({"email": "mo@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, _) = app
        .post("/api/register", &json!({"email": "a@b.io", "password": "short"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/register", &json!({"email": "nope", "password": "long enough"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/api/login", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "email and password are required");
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_event_create_and_list() {
    let app = TestApp::new();

    let (status, event) = app
        .post(
            "/api/events",
            &json!({
                "owner_id": Uuid::new_v4(),
                "title": "Rust meetup",
                "start_at": "2026-06-01T18:00:00Z",
                "end_at": "2026-06-01T20:00:00Z",
                "location": "Hall B",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(event["status"], "OPEN");
    assert_eq!(event["start_at"], "2026-06-01T18:00:00Z");

    let (status, events) = app.get("/api/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], event["id"]);
}

#[tokio::test]
async fn test_inverted_event_never_reaches_storage() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/events",
            &json!({
                "owner_id": Uuid::new_v4(),
                "title": "Backwards",
                "start_at": "2026-06-01T20:00:00Z",
                "end_at": "2026-06-01T18:00:00Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end_at must not be before start_at");
    assert_eq!(app.store.len(Collection::Events), 0);
}

// ============================================================================
// Inventory
// ============================================================================

#[tokio::test]
async fn test_delete_stock_cascades() {
    let app = TestApp::new();
    let stock = create_stock(&app).await;
    let other = create_stock(&app).await;
    create_product(&app, &stock, None).await;
    create_product(&app, &stock, Some("Snacks")).await;
    create_product(&app, &other, None).await;

    let (status, body) = app.delete(&format!("/api/stocks/{stock}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted_stock": 1, "deleted_products": 2}));

    let (_, products) = app.get(&format!("/api/products?stock_id={stock}")).await;
    assert_eq!(products, json!([]));
    let (_, products) = app.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 1);

    let (status, body) = app.delete(&format!("/api/stocks/{stock}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"deleted_stock": 0, "deleted_products": 0}));
}

#[tokio::test]
async fn test_delete_category_clears_labels() {
    let app = TestApp::new();
    let stock = create_stock(&app).await;
    let snack = create_product(&app, &stock, Some("Snacks")).await;
    let other = create_product(&app, &stock, Some("Other")).await;

    let (status, created) = app
        .post(
            "/api/categories",
            &json!([
                {"stock_id": stock, "name": "Snacks", "description": "Salty things"},
                {"stock_id": stock, "name": "Other"},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let snacks_id = created[0]["id"].as_str().unwrap().to_owned();

    let (status, body) = app.delete(&format!("/api/categories/{snacks_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"updated_products": 1, "deleted_category": 1}));

    let (_, products) = app.get(&format!("/api/products?stock_id={stock}")).await;
    let by_id = |id: &Value| {
        products
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["id"] == *id)
            .unwrap()
            .clone()
    };
    assert_eq!(by_id(&snack["id"])["category"], Value::Null);
    assert_eq!(by_id(&other["id"])["category"], "Other");

    let (_, categories) = app.get(&format!("/api/categories?stock_id={stock}")).await;
    let names: Vec<_> = categories
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["Other"]);
}

#[tokio::test]
async fn test_delete_missing_category_is_404_without_side_effects() {
    let app = TestApp::new();
    let stock = create_stock(&app).await;
    create_product(&app, &stock, Some("Snacks")).await;

    let (status, _) = app
        .delete(&format!("/api/categories/{}", Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, products) = app.get("/api/products").await;
    assert_eq!(products[0]["category"], "Snacks");
}

#[tokio::test]
async fn test_bulk_categories_all_or_nothing() {
    let app = TestApp::new();
    let stock = create_stock(&app).await;

    let (status, body) = app
        .post(
            "/api/categories",
            &json!([
                {"stock_id": stock, "name": "Snacks"},
                {"stock_id": stock, "name": "  "},
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required at index 1");
    assert_eq!(app.store.len(Collection::Categories), 0);

    let (status, _) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_validation_and_delete() {
    let app = TestApp::new();
    let stock = create_stock(&app).await;

    let (status, body) = app
        .put("/api/products", &json!({"stock_id": stock, "name": "Tea"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "quantity must be provided");

    let (status, _) = app
        .put(
            "/api/products",
            &json!({"stock_id": "not-a-uuid", "name": "Tea", "quantity": 1}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let product = create_product(&app, &stock, None).await;
    let uri = format!("/api/products/{}", product["id"].as_str().unwrap());

    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/stocks/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/stocks", &json!(["not", "an", "object"])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid JSON payload");
}
