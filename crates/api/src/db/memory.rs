//! In-process document store.
//!
//! Mirrors the PostgreSQL backend's semantics: collections must be created
//! before use, unique indexes are enforced on insert, and updates only count
//! documents they actually change. Counters record how often the one-time
//! setup calls were made, and individual operations can be slowed down or
//! made to fail, which is what the concurrency and partial-failure tests
//! rely on.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::collection::{Collection, IndexSpec};
use super::store::{Connector, DocumentStore, Filter, StoreError, Update};
use crate::config::DatabaseSettings;

/// Operations that can be made to fail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Exists,
    CreateCollection,
    CreateIndex,
    Insert,
    Find,
    Delete,
    Update,
}

#[derive(Default)]
struct MemoryCollection {
    documents: Vec<(Uuid, Value)>,
    indexes: Vec<IndexSpec>,
}

impl MemoryCollection {
    fn violated_index(&self, id: Uuid, document: &Value) -> Option<String> {
        if self.documents.iter().any(|(existing, _)| *existing == id) {
            return Some("_id".to_owned());
        }
        self.indexes.iter().find_map(|index| {
            let value = document.get(index.field).filter(|v| !v.is_null())?;
            self.documents
                .iter()
                .any(|(_, existing)| existing.get(index.field) == Some(value))
                .then(|| index.name.to_owned())
        })
    }
}

/// Thread-safe in-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, MemoryCollection>>,
    faults: Mutex<HashSet<(StoreOp, Collection)>>,
    latency: Option<Duration>,
    collections_created: AtomicUsize,
    indexes_created: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency` before it runs.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make `op` on `collection` fail until [`heal`](Self::heal) is called.
    pub fn fail(&self, op: StoreOp, collection: Collection) {
        lock(&self.faults).insert((op, collection));
    }

    /// Clear all injected failures.
    pub fn heal(&self) {
        lock(&self.faults).clear();
    }

    /// Number of successful `create_collection` calls.
    #[must_use]
    pub fn collections_created(&self) -> usize {
        self.collections_created.load(Ordering::SeqCst)
    }

    /// Number of `create_unique_index` calls that reached the store.
    #[must_use]
    pub fn indexes_created(&self) -> usize {
        self.indexes_created.load(Ordering::SeqCst)
    }

    /// Number of documents currently in `collection`.
    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        lock(&self.collections)
            .get(&collection)
            .map_or(0, |c| c.documents.len())
    }

    async fn enter(&self, op: StoreOp, collection: Collection) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if lock(&self.faults).contains(&(op, collection)) {
            return Err(StoreError::Unavailable(format!(
                "injected {op:?} failure on {collection}"
            )));
        }
        Ok(())
    }

    fn with_collection<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut MemoryCollection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut collections = lock(&self.collections);
        let target = collections
            .get_mut(&collection)
            .ok_or(StoreError::MissingCollection(collection))?;
        f(target)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn collection_exists(&self, collection: Collection) -> Result<bool, StoreError> {
        self.enter(StoreOp::Exists, collection).await?;
        Ok(lock(&self.collections).contains_key(&collection))
    }

    async fn create_collection(&self, collection: Collection) -> Result<(), StoreError> {
        self.enter(StoreOp::CreateCollection, collection).await?;
        let mut collections = lock(&self.collections);
        if collections.contains_key(&collection) {
            return Err(StoreError::AlreadyExists(collection));
        }
        collections.insert(collection, MemoryCollection::default());
        self.collections_created.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_unique_index(
        &self,
        collection: Collection,
        index: IndexSpec,
    ) -> Result<(), StoreError> {
        self.indexes_created.fetch_add(1, Ordering::SeqCst);
        self.enter(StoreOp::CreateIndex, collection).await?;
        self.with_collection(collection, |target| {
            if target.indexes.contains(&index) {
                return Ok(());
            }
            let mut seen = HashSet::new();
            for (_, document) in &target.documents {
                if let Some(value) = document.get(index.field).filter(|v| !v.is_null())
                    && !seen.insert(value.to_string())
                {
                    return Err(StoreError::DuplicateKey {
                        index: index.name.to_owned(),
                    });
                }
            }
            target.indexes.push(index);
            Ok(())
        })
    }

    async fn insert(
        &self,
        collection: Collection,
        id: Uuid,
        document: Value,
    ) -> Result<(), StoreError> {
        self.enter(StoreOp::Insert, collection).await?;
        self.with_collection(collection, |target| {
            if let Some(index) = target.violated_index(id, &document) {
                return Err(StoreError::DuplicateKey { index });
            }
            target.documents.push((id, document));
            Ok(())
        })
    }

    async fn insert_many(
        &self,
        collection: Collection,
        documents: Vec<(Uuid, Value)>,
    ) -> Result<u64, StoreError> {
        self.enter(StoreOp::Insert, collection).await?;
        self.with_collection(collection, |target| {
            let before = target.documents.len();
            for (id, document) in documents {
                if let Some(index) = target.violated_index(id, &document) {
                    target.documents.truncate(before);
                    return Err(StoreError::DuplicateKey { index });
                }
                target.documents.push((id, document));
            }
            Ok((target.documents.len() - before) as u64)
        })
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        self.enter(StoreOp::Find, collection).await?;
        self.with_collection(collection, |target| {
            Ok(target
                .documents
                .iter()
                .filter(|(_, document)| filter.matches(document))
                .map(|(_, document)| document.clone())
                .collect())
        })
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Option<Value>, StoreError> {
        self.enter(StoreOp::Find, collection).await?;
        self.with_collection(collection, |target| {
            Ok(target
                .documents
                .iter()
                .find(|(_, document)| filter.matches(document))
                .map(|(_, document)| document.clone()))
        })
    }

    async fn delete_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        self.enter(StoreOp::Delete, collection).await?;
        self.with_collection(collection, |target| {
            let position = target
                .documents
                .iter()
                .position(|(_, document)| filter.matches(document));
            Ok(position.map_or(0, |at| {
                target.documents.remove(at);
                1
            }))
        })
    }

    async fn delete_many(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<u64, StoreError> {
        self.enter(StoreOp::Delete, collection).await?;
        self.with_collection(collection, |target| {
            let before = target.documents.len();
            target
                .documents
                .retain(|(_, document)| !filter.matches(document));
            Ok((before - target.documents.len()) as u64)
        })
    }

    async fn update_many(
        &self,
        collection: Collection,
        filter: &Filter,
        update: &Update,
    ) -> Result<u64, StoreError> {
        self.enter(StoreOp::Update, collection).await?;
        self.with_collection(collection, |target| {
            let mut modified = 0;
            for (_, document) in &mut target.documents {
                if filter.matches(document) && update.apply(document) {
                    modified += 1;
                }
            }
            Ok(modified)
        })
    }
}

/// [`Connector`] that hands out a shared [`MemoryStore`].
///
/// Counts connection attempts and can simulate a slow or unreachable
/// backend.
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    attempts: AtomicUsize,
    latency: Option<Duration>,
    refusal: Option<String>,
}

impl MemoryConnector {
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            attempts: AtomicUsize::new(0),
            latency: None,
            refusal: None,
        }
    }

    /// Take `latency` to establish each connection.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Refuse every connection attempt with `reason`.
    #[must_use]
    pub fn refusing(mut self, reason: impl Into<String>) -> Self {
        self.refusal = Some(reason.into());
        self
    }

    /// Number of times [`Connector::connect`] has been called.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(
        &self,
        settings: &DatabaseSettings,
    ) -> Result<Arc<dyn DocumentStore>, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(database = %settings.name, "opening in-memory store");
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(reason) = &self.refusal {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        Ok(Arc::clone(&self.store) as Arc<dyn DocumentStore>)
    }
}
