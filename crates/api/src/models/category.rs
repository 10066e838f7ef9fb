//! Category domain types.

use serde::{Deserialize, Serialize};

use event_blog_core::{CategoryId, StockId};

/// A product category within one stock.
///
/// Products refer to a category by name, not by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub stock_id: StockId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub stock_id: StockId,
    pub name: String,
    pub description: String,
}
