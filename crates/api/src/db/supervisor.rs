//! The process-wide connection to the document store.
//!
//! The first caller triggers a single connection attempt: settings are read,
//! the backend is opened and pinged. Concurrent callers wait on that same
//! attempt, and its outcome is kept for the life of the supervisor. A
//! failure is not retried; every later caller receives the same error.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::store::{Connector, DocumentStore};
use super::{RepositoryError, bounded};
use crate::config::{ConfigError, DatabaseSettings};

type SettingsLoader = Box<dyn Fn() -> Result<DatabaseSettings, ConfigError> + Send + Sync>;
type ConnectionOutcome = Result<Arc<dyn DocumentStore>, RepositoryError>;

/// Single-flight, memoized owner of the store connection.
pub struct ConnectionSupervisor {
    connector: Arc<dyn Connector>,
    settings: SettingsLoader,
    connection: OnceCell<ConnectionOutcome>,
}

impl ConnectionSupervisor {
    /// Supervisor that reads [`DatabaseSettings`] from the environment on
    /// first use.
    #[must_use]
    pub fn from_env(connector: Arc<dyn Connector>) -> Self {
        Self::with_loader(connector, DatabaseSettings::from_env)
    }

    /// Supervisor with fixed settings.
    #[must_use]
    pub fn with_settings(connector: Arc<dyn Connector>, settings: DatabaseSettings) -> Self {
        Self::with_loader(connector, move || Ok(settings.clone()))
    }

    /// Supervisor that obtains its settings from `loader` on first use.
    #[must_use]
    pub fn with_loader<F>(connector: Arc<dyn Connector>, loader: F) -> Self
    where
        F: Fn() -> Result<DatabaseSettings, ConfigError> + Send + Sync + 'static,
    {
        Self {
            connector,
            settings: Box::new(loader),
            connection: OnceCell::new(),
        }
    }

    /// The shared store, connecting on first call.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Configuration` if settings are missing and
    /// `RepositoryError::Connectivity` if the store could not be opened or
    /// did not answer a ping. Either is returned to every subsequent caller.
    pub async fn connection(&self) -> Result<Arc<dyn DocumentStore>, RepositoryError> {
        self.connection
            .get_or_init(|| self.establish())
            .await
            .clone()
    }

    /// Whether the one connection attempt has completed.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.connection.initialized()
    }

    async fn establish(&self) -> ConnectionOutcome {
        let settings = (self.settings)().map_err(|e| {
            tracing::error!(error = %e, "document store is not configured");
            RepositoryError::Configuration(e.to_string())
        })?;

        tracing::info!(database = %settings.name, "connecting to document store");

        let store = bounded(self.connector.connect(&settings))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to connect to document store");
                RepositoryError::Connectivity(e.to_string())
            })?;

        bounded(store.ping()).await.map_err(|e| {
            tracing::error!(error = %e, "document store did not answer ping");
            RepositoryError::Connectivity(e.to_string())
        })?;

        tracing::info!(database = %settings.name, "document store connected");
        Ok(store)
    }
}
