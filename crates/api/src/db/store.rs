//! Document store abstraction.
//!
//! A store holds named [`Collection`]s of JSON documents keyed by UUID.
//! Queries are restricted to what the consistency layer needs: equality
//! filters on top-level fields and updates that overwrite top-level fields.
//! Nothing here spans collections or offers atomicity across calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::collection::{Collection, IndexSpec};
use super::fields;
use crate::config::DatabaseSettings;

/// Errors reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An insert collided with a unique index (or the primary key).
    #[error("duplicate key violates unique index {index}")]
    DuplicateKey { index: String },

    /// The collection was created concurrently or earlier.
    #[error("collection {0} already exists")]
    AlreadyExists(Collection),

    /// The collection has not been provisioned.
    #[error("collection {0} does not exist")]
    MissingCollection(Collection),

    /// The operation did not complete within the allotted time.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Equality filter over top-level document fields.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_owned(), value.into());
        self
    }

    /// Whether `document` satisfies every condition.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// The filter as a JSON object (used for JSONB containment).
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// The primary key this filter pins, if it constrains `id`.
    #[must_use]
    pub fn key(&self) -> Option<Uuid> {
        self.0.get(fields::ID)?.as_str()?.parse().ok()
    }
}

/// Overwrites top-level fields of matching documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update(Map<String, Value>);

impl Update {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    #[must_use]
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_owned(), value.into());
        self
    }

    /// Set `field` to null, clearing it.
    #[must_use]
    pub fn clear(self, field: &str) -> Self {
        self.set(field, Value::Null)
    }

    /// Apply to `document`, returning whether anything changed.
    pub fn apply(&self, document: &mut Value) -> bool {
        let Value::Object(fields) = document else {
            return false;
        };
        let mut changed = false;
        for (field, value) in &self.0 {
            if fields.get(field) != Some(value) {
                fields.insert(field.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// The update as a JSON object (used for JSONB concatenation).
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// A backend holding collections of JSON documents.
///
/// Implementations must be safe for concurrent use by many in-flight
/// requests. Counts returned by `delete_*` are documents removed; the count
/// returned by `update_many` only includes documents whose contents changed.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn collection_exists(&self, collection: Collection) -> Result<bool, StoreError>;

    /// Create an empty collection. Fails with [`StoreError::AlreadyExists`]
    /// if it is already there.
    async fn create_collection(&self, collection: Collection) -> Result<(), StoreError>;

    /// Install a unique index. Installing an index that already exists is a
    /// no-op.
    async fn create_unique_index(
        &self,
        collection: Collection,
        index: IndexSpec,
    ) -> Result<(), StoreError>;

    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), StoreError>;

    /// Insert several documents as a unit: either all land or none do.
    async fn insert_many(
        &self,
        collection: Collection,
        documents: Vec<(Uuid, Value)>,
    ) -> Result<u64, StoreError>;

    /// Matching documents in insertion order.
    async fn find(&self, collection: Collection, filter: &Filter)
    -> Result<Vec<Value>, StoreError>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete_one(&self, collection: Collection, filter: &Filter)
    -> Result<u64, StoreError>;

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError>;

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError>;
}

/// Opens a [`DocumentStore`] from connection settings.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(
        &self,
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn DocumentStore>, StoreError>;
}
