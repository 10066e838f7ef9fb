//! Typed access to one provisioned collection.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use super::collection::Collection;
use super::store::{DocumentStore, Filter, StoreError, Update};
use super::{RepositoryError, bounded};

/// A fixed-shape record stored as a document.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// The document's primary key.
    fn key(&self) -> Uuid;
}

/// Handle to a collection that is known to exist.
///
/// Cheap to clone; every clone shares the one store connection. Each call
/// is bounded by [`OPERATION_TIMEOUT`](super::OPERATION_TIMEOUT).
#[derive(Clone)]
pub struct CollectionHandle {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
}

impl std::fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl CollectionHandle {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self { store, collection }
    }

    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Insert one document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique index rejects it.
    pub async fn insert<T: Document>(&self, document: &T) -> Result<(), RepositoryError> {
        let value = encode(document)?;
        bounded(self.store.insert(self.collection, document.key(), value))
            .await
            .map_err(|e| self.failure("insert", e))
    }

    /// Insert several documents; either all are stored or none are.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a unique index rejects any.
    pub async fn insert_many<T: Document>(&self, documents: &[T]) -> Result<u64, RepositoryError> {
        let values = documents
            .iter()
            .map(|document| Ok((document.key(), encode(document)?)))
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        bounded(self.store.insert_many(self.collection, values))
            .await
            .map_err(|e| self.failure("insert_many", e))
    }

    /// All matching documents, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored document does
    /// not decode as `T`.
    pub async fn find<T: Document>(&self, filter: &Filter) -> Result<Vec<T>, RepositoryError> {
        let values = bounded(self.store.find(self.collection, filter))
            .await
            .map_err(|e| self.failure("find", e))?;
        values.into_iter().map(|value| self.decode(value)).collect()
    }

    /// The first matching document, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the lookup fails.
    pub async fn find_one<T: Document>(
        &self,
        filter: &Filter,
    ) -> Result<Option<T>, RepositoryError> {
        bounded(self.store.find_one(self.collection, filter))
            .await
            .map_err(|e| self.failure("find_one", e))?
            .map(|value| self.decode(value))
            .transpose()
    }

    /// Delete at most one matching document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the delete fails.
    pub async fn delete_one(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        bounded(self.store.delete_one(self.collection, filter))
            .await
            .map_err(|e| self.failure("delete_one", e))
    }

    /// Delete every matching document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the delete fails.
    pub async fn delete_many(&self, filter: &Filter) -> Result<u64, RepositoryError> {
        bounded(self.store.delete_many(self.collection, filter))
            .await
            .map_err(|e| self.failure("delete_many", e))
    }

    /// Apply `update` to every matching document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the update fails.
    pub async fn update_many(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, RepositoryError> {
        bounded(self.store.update_many(self.collection, filter, update))
            .await
            .map_err(|e| self.failure("update_many", e))
    }

    fn decode<T: Document>(&self, value: Value) -> Result<T, RepositoryError> {
        serde_json::from_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!(
                "invalid document in {}: {e}",
                self.collection
            ))
        })
    }

    fn failure(&self, operation: &str, err: StoreError) -> RepositoryError {
        match err {
            StoreError::DuplicateKey { index } => RepositoryError::Conflict(format!(
                "{} already has a document with this {index} value",
                self.collection
            )),
            other => RepositoryError::Storage {
                step: format!("{operation} {}", self.collection),
                reason: other.to_string(),
            },
        }
    }
}

fn encode<T: Serialize>(document: &T) -> Result<Value, RepositoryError> {
    serde_json::to_value(document)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode document: {e}")))
}
