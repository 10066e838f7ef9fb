//! Stock handlers.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use event_blog_core::StockId;

use super::{parse_id, payload, required};
use crate::db::{StockDeletion, StockRepository};
use crate::error::Result;
use crate::models::stock::{NewStock, Stock};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateStockRequest {
    pub owner_id: Option<String>,
    pub name: Option<String>,
}

/// `GET /api/stocks`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Stock>>> {
    let stocks = StockRepository::new(state.provisioner()).list().await?;
    Ok(Json(stocks))
}

/// `POST /api/stocks`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateStockRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Stock>)> {
    let req = payload(body)?;
    let new = NewStock {
        owner_id: parse_id(&required(req.owner_id, "owner_id")?, "owner_id")?,
        name: required(req.name, "name")?,
    };

    let stock = StockRepository::new(state.provisioner()).create(new).await?;
    Ok((StatusCode::CREATED, Json(stock)))
}

/// `DELETE /api/stocks/{stock_id}`
///
/// Removes the stock and its products. Deleting an unknown stock succeeds
/// with zero counts.
pub async fn delete(
    State(state): State<AppState>,
    Path(stock_id): Path<String>,
) -> Result<Json<StockDeletion>> {
    let stock_id: StockId = parse_id(&stock_id, "stock_id")?;
    let deletion = state.coordinator().delete_stock(stock_id).await?;
    Ok(Json(deletion))
}
