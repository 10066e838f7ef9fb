//! Makes sure a collection exists before anyone queries it.
//!
//! Collections that declare unique indexes (users) are set up once per
//! provisioner: existence check, creation if absent, index install. The
//! outcome is memoized like the connection itself, so a failed setup is
//! reported to every later caller without being retried.
//!
//! Collections without indexes are checked on every call and created if
//! missing. Losing a creation race to another caller counts as success.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::instrument;

use super::collection::Collection;
use super::handle::CollectionHandle;
use super::store::{DocumentStore, StoreError};
use super::supervisor::ConnectionSupervisor;
use super::{RepositoryError, bounded};

type SetupOutcome = Result<(), RepositoryError>;

/// Hands out handles to provisioned collections.
pub struct CollectionProvisioner {
    supervisor: Arc<ConnectionSupervisor>,
    setups: HashMap<Collection, OnceCell<SetupOutcome>>,
}

impl CollectionProvisioner {
    #[must_use]
    pub fn new(supervisor: Arc<ConnectionSupervisor>) -> Self {
        let setups = Collection::ALL
            .into_iter()
            .filter(|collection| collection.requires_setup())
            .map(|collection| (collection, OnceCell::new()))
            .collect();
        Self { supervisor, setups }
    }

    /// A handle to `collection`, provisioning it first if needed.
    ///
    /// # Errors
    ///
    /// Returns the supervisor's error if there is no connection, and
    /// `RepositoryError::Provisioning` if the collection could not be created
    /// or its indexes installed.
    pub async fn collection(
        &self,
        collection: Collection,
    ) -> Result<CollectionHandle, RepositoryError> {
        let store = self.supervisor.connection().await?;

        match self.setups.get(&collection) {
            Some(setup) => {
                setup
                    .get_or_init(|| install(Arc::clone(&store), collection))
                    .await
                    .clone()?;
            }
            None => ensure_exists(store.as_ref(), collection)
                .await
                .map_err(|e| provisioning_failed(collection, &e))?,
        }

        Ok(CollectionHandle::new(store, collection))
    }

    /// Provision every collection, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first connection or provisioning error encountered.
    pub async fn provision_all(&self) -> Result<(), RepositoryError> {
        for collection in Collection::ALL {
            self.collection(collection).await?;
        }
        tracing::info!(count = Collection::ALL.len(), "all collections provisioned");
        Ok(())
    }
}

#[instrument(skip(store))]
async fn install(store: Arc<dyn DocumentStore>, collection: Collection) -> SetupOutcome {
    ensure_exists(store.as_ref(), collection)
        .await
        .map_err(|e| provisioning_failed(collection, &e))?;

    for index in collection.unique_indexes() {
        bounded(store.create_unique_index(collection, *index))
            .await
            .map_err(|e| provisioning_failed(collection, &e))?;
        tracing::info!(index = index.name, field = index.field, "unique index installed");
    }

    Ok(())
}

async fn ensure_exists(store: &dyn DocumentStore, collection: Collection) -> Result<(), StoreError> {
    if bounded(store.collection_exists(collection)).await? {
        return Ok(());
    }

    match bounded(store.create_collection(collection)).await {
        Ok(()) => {
            tracing::info!(%collection, "collection created");
            Ok(())
        }
        Err(StoreError::AlreadyExists(_)) => {
            tracing::debug!(%collection, "collection created concurrently");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn provisioning_failed(collection: Collection, err: &StoreError) -> RepositoryError {
    tracing::error!(%collection, error = %err, "collection provisioning failed");
    RepositoryError::Provisioning {
        collection,
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::DatabaseSettings;
    use crate::db::memory::{MemoryConnector, MemoryStore, StoreOp};

    fn provisioner_over(store: Arc<MemoryStore>) -> Arc<CollectionProvisioner> {
        let connector = Arc::new(MemoryConnector::new(store));
        let supervisor = Arc::new(ConnectionSupervisor::with_settings(
            connector,
            DatabaseSettings::new("memory://", "event_blog_test"),
        ));
        Arc::new(CollectionProvisioner::new(supervisor))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_users_setup_runs_once_under_concurrency() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(10)));
        let provisioner = provisioner_over(Arc::clone(&store));

        let callers: Vec<_> = (0..24)
            .map(|_| {
                let provisioner = Arc::clone(&provisioner);
                tokio::spawn(async move { provisioner.collection(Collection::Users).await })
            })
            .collect();
        for caller in callers {
            caller.await.unwrap().unwrap();
        }

        assert_eq!(store.indexes_created(), 1);
        assert_eq!(store.collections_created(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_users_setup_failure_is_cached() {
        let store = Arc::new(MemoryStore::new().with_latency(Duration::from_millis(5)));
        store.fail(StoreOp::CreateIndex, Collection::Users);
        let provisioner = provisioner_over(Arc::clone(&store));

        let callers: Vec<_> = (0..8)
            .map(|_| {
                let provisioner = Arc::clone(&provisioner);
                tokio::spawn(async move { provisioner.collection(Collection::Users).await })
            })
            .collect();
        for caller in callers {
            let err = caller.await.unwrap().unwrap_err();
            assert!(matches!(
                err,
                RepositoryError::Provisioning {
                    collection: Collection::Users,
                    ..
                }
            ));
        }

        // Healing the store does not help: the outcome is memoized.
        store.heal();
        assert!(provisioner.collection(Collection::Users).await.is_err());
        assert_eq!(store.indexes_created(), 1);
    }

    #[tokio::test]
    async fn test_unconstrained_collection_created_on_demand() {
        let store = Arc::new(MemoryStore::new());
        let provisioner = provisioner_over(Arc::clone(&store));

        let handle = provisioner.collection(Collection::Events).await.unwrap();
        assert_eq!(handle.collection(), Collection::Events);
        provisioner.collection(Collection::Events).await.unwrap();

        assert_eq!(store.collections_created(), 1);
        assert_eq!(store.indexes_created(), 0);
    }

    #[tokio::test]
    async fn test_unconstrained_collection_is_not_memoized() {
        let store = Arc::new(MemoryStore::new());
        store.fail(StoreOp::Exists, Collection::Stocks);
        let provisioner = provisioner_over(Arc::clone(&store));

        let err = provisioner.collection(Collection::Stocks).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Provisioning {
                collection: Collection::Stocks,
                ..
            }
        ));

        store.heal();
        provisioner.collection(Collection::Stocks).await.unwrap();
    }

    #[tokio::test]
    async fn test_connection_failure_passes_through() {
        let connector =
            Arc::new(MemoryConnector::new(Arc::new(MemoryStore::new())).refusing("no route"));
        let supervisor = Arc::new(ConnectionSupervisor::with_settings(
            connector,
            DatabaseSettings::new("memory://", "event_blog_test"),
        ));
        let provisioner = CollectionProvisioner::new(supervisor);

        let err = provisioner.collection(Collection::Products).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_provision_all() {
        let store = Arc::new(MemoryStore::new());
        let provisioner = provisioner_over(Arc::clone(&store));

        provisioner.provision_all().await.unwrap();
        provisioner.provision_all().await.unwrap();

        assert_eq!(store.collections_created(), Collection::ALL.len());
        assert_eq!(store.indexes_created(), 1);
    }
}
