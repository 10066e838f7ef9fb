//! Category handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use event_blog_core::{CategoryId, StockId};

use super::{parse_id, payload, required};
use crate::db::{CategoryDeletion, CategoryRepository};
use crate::error::{AppError, Result};
use crate::models::category::{Category, NewCategory};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub stock_id: Option<String>,
}

/// One entry in the body of `POST /api/categories`.
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub stock_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Validate every entry before anything is written.
fn validate_all(payload: Vec<CategoryRequest>) -> Result<Vec<NewCategory>> {
    if payload.is_empty() {
        return Err(AppError::BadRequest(
            "at least one category is required".to_string(),
        ));
    }

    payload
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let at = |e: AppError| match e {
                AppError::BadRequest(msg) => AppError::BadRequest(format!("{msg} at index {i}")),
                other => other,
            };
            let stock_id: StockId = required(entry.stock_id, "stock_id")
                .and_then(|raw| parse_id(&raw, "stock_id"))
                .map_err(at)?;
            let name = required(entry.name, "name").map_err(at)?;

            Ok(NewCategory {
                stock_id,
                name,
                description: entry
                    .description
                    .map(|d| d.trim().to_owned())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

/// `GET /api/categories?stock_id=`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<Vec<Category>>> {
    let stock_id: StockId = parse_id(&required(query.stock_id, "stock_id")?, "stock_id")?;
    let categories = CategoryRepository::new(state.provisioner())
        .list_for_stock(stock_id)
        .await?;
    Ok(Json(categories))
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<Vec<CategoryRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Category>>)> {
    let new = validate_all(payload(body)?)?;
    let categories = CategoryRepository::new(state.provisioner())
        .create_many(new)
        .await?;
    Ok((StatusCode::CREATED, Json(categories)))
}

/// `DELETE /api/categories/{category_id}`
///
/// Clears the category label from matching products of the same stock,
/// then removes the category. 404 if it does not exist.
pub async fn delete(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<CategoryDeletion>> {
    let category_id: CategoryId = parse_id(&category_id, "category_id")?;
    let deletion = state.coordinator().delete_category(category_id).await?;
    Ok(Json(deletion))
}
