//! Product handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use event_blog_core::{ProductId, StockId};

use super::{optional, parse_id, payload, required};
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::models::product::{NewProduct, Product};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub stock_id: Option<String>,
}

/// Body of `PUT /api/products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub stock_id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: Option<i64>,
}

impl CreateProductRequest {
    fn validate(self) -> Result<NewProduct> {
        let stock_id: StockId = parse_id(&required(self.stock_id, "stock_id")?, "stock_id")?;
        let name = required(self.name, "name")?;
        let quantity = self
            .quantity
            .ok_or_else(|| AppError::BadRequest("quantity must be provided".to_string()))?;
        let quantity = u32::try_from(quantity).map_err(|_| {
            AppError::BadRequest("quantity must be a non-negative integer".to_string())
        })?;

        Ok(NewProduct {
            stock_id,
            name,
            category: optional(self.category),
            unit: optional(self.unit),
            quantity,
        })
    }
}

/// `GET /api/products[?stock_id=]`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>> {
    let stock_id = optional(query.stock_id)
        .map(|raw| parse_id::<StockId>(&raw, "stock_id"))
        .transpose()?;
    let products = ProductRepository::new(state.provisioner())
        .list(stock_id)
        .await?;
    Ok(Json(products))
}

/// `PUT /api/products`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>)> {
    let new = payload(body)?.validate()?;
    let product = ProductRepository::new(state.provisioner())
        .create(new)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `DELETE /api/products/{product_id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<StatusCode> {
    let product_id: ProductId = parse_id(&product_id, "product_id")?;
    ProductRepository::new(state.provisioner())
        .delete(product_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(quantity: Option<i64>) -> CreateProductRequest {
        CreateProductRequest {
            stock_id: Some(StockId::generate().to_string()),
            name: Some("Oat milk".to_owned()),
            category: Some("  ".to_owned()),
            unit: Some("carton".to_owned()),
            quantity,
        }
    }

    #[test]
    fn test_quantity_rules() {
        let new = request(Some(0)).validate().unwrap();
        assert_eq!(new.quantity, 0);
        assert!(new.category.is_none());

        let err = request(None).validate().unwrap_err();
        assert_eq!(err.to_string(), "Bad request: quantity must be provided");

        assert!(request(Some(-1)).validate().is_err());
    }
}
