//! Document field names used in filters and updates.
//!
//! These must match the serde names of the stored models.

pub const ID: &str = "id";
pub const EMAIL: &str = "email";
pub const STOCK_ID: &str = "stock_id";
pub const CATEGORY: &str = "category";
