//! Product domain types.

use serde::{Deserialize, Serialize};

use event_blog_core::{ProductId, StockId};

/// An item held in a stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub stock_id: StockId,
    pub name: String,
    /// Free-text label matched against category names of the same stock.
    /// Cleared (null) when that category is deleted.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub stock_id: StockId,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: u32,
}
