//! Collection lifecycle and cross-collection consistency.
//!
//! # Layers
//!
//! - [`supervisor`] - owns the one process-wide connection to the document
//!   store, established at most once and memoized (success or failure)
//! - [`provisioner`] - hands out [`CollectionHandle`]s, creating collections
//!   and installing unique indexes before first use
//! - [`coordinator`] - cascading deletes that span collections, run as
//!   ordered, individually idempotent steps (no multi-document transaction)
//! - repositories (`users`, `events`, `stocks`, `products`, `categories`) -
//!   typed CRUD on top of handles
//!
//! # Backends
//!
//! [`postgres`] stores each collection as a table of JSONB documents.
//! [`memory`] keeps everything in-process and is used by tests.
//!
//! # Timeouts
//!
//! Every store call, including connect and ping, is bounded by
//! [`OPERATION_TIMEOUT`].

pub mod categories;
pub mod collection;
pub mod coordinator;
pub mod events;
pub mod fields;
pub mod handle;
pub mod memory;
pub mod postgres;
pub mod products;
pub mod provisioner;
pub mod stocks;
pub mod store;
pub mod supervisor;
pub mod users;

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

pub use categories::CategoryRepository;
pub use collection::{Collection, IndexSpec};
pub use coordinator::{CategoryDeletion, ConsistencyCoordinator, StockDeletion};
pub use events::EventRepository;
pub use handle::{CollectionHandle, Document};
pub use products::ProductRepository;
pub use provisioner::CollectionProvisioner;
pub use stocks::StockRepository;
pub use store::{Connector, DocumentStore, Filter, StoreError, Update};
pub use supervisor::ConnectionSupervisor;
pub use users::UserRepository;

/// Upper bound for any single round trip to the document store.
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur during repository operations.
///
/// `Clone` so that a memoized connection or provisioning failure can be
/// handed to every caller that asks after it.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// A required setting is missing from the environment.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The connection could not be established or verified.
    #[error("cannot reach document store: {0}")]
    Connectivity(String),

    /// Creating a collection or installing its indexes failed.
    #[error("failed to provision collection {collection}: {reason}")]
    Provisioning {
        collection: Collection,
        reason: String,
    },

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A single store operation failed or timed out. Safe to retry.
    #[error("storage error during {step}: {reason}")]
    Storage { step: String, reason: String },

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Relabel a storage failure with the step of a larger operation it
    /// happened in. Other kinds pass through untouched.
    #[must_use]
    pub fn at_step(self, step: &str) -> Self {
        match self {
            Self::Storage { reason, .. } => Self::Storage {
                step: step.to_owned(),
                reason,
            },
            other => other,
        }
    }

    /// Whether the failure is caused by the deployment (configuration,
    /// connectivity, provisioning) rather than by the request.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Connectivity(_) | Self::Provisioning { .. }
        )
    }
}

/// Run a store operation under [`OPERATION_TIMEOUT`].
///
/// # Errors
///
/// Returns [`StoreError::Timeout`] if the operation does not finish in time,
/// otherwise whatever the operation returned.
pub async fn bounded<T, F>(operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(OPERATION_TIMEOUT, operation)
        .await
        .map_err(|_| StoreError::Timeout(OPERATION_TIMEOUT))?
}
