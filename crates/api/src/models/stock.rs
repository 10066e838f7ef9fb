//! Stock domain types.

use serde::{Deserialize, Serialize};

use event_blog_core::{StockId, UserId};

/// A named list of products owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub owner_id: UserId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewStock {
    pub owner_id: UserId,
    pub name: String,
}
