//! Logical collections and their storage requirements.

use std::fmt;

/// A unique index over one top-level document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexSpec {
    /// Index name, unique within its collection.
    pub name: &'static str,
    /// Field whose values must be distinct across documents.
    pub field: &'static str,
}

const USERS_EMAIL_UNIQUE: IndexSpec = IndexSpec {
    name: "email_unique",
    field: "email",
};

/// The five logical collections.
///
/// Names double as table names in the PostgreSQL backend, so they are fixed
/// identifiers and never come from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Events,
    Stocks,
    Products,
    Categories,
}

impl Collection {
    /// Every collection, in provisioning order.
    pub const ALL: [Self; 5] = [
        Self::Users,
        Self::Events,
        Self::Stocks,
        Self::Products,
        Self::Categories,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Events => "events",
            Self::Stocks => "stocks",
            Self::Products => "products",
            Self::Categories => "categories",
        }
    }

    /// Unique indexes that must exist before the collection is used.
    ///
    /// Collections with at least one index go through one-time, memoized
    /// setup; the rest are checked (and created if missing) on every request.
    #[must_use]
    pub const fn unique_indexes(self) -> &'static [IndexSpec] {
        match self {
            Self::Users => &[USERS_EMAIL_UNIQUE],
            Self::Events | Self::Stocks | Self::Products | Self::Categories => &[],
        }
    }

    #[must_use]
    pub const fn requires_setup(self) -> bool {
        !self.unique_indexes().is_empty()
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
