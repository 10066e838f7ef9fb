//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::{CollectionProvisioner, ConnectionSupervisor, Connector, ConsistencyCoordinator};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the one supervisor, provisioner and
/// coordinator for the process; handlers build repositories from the
/// provisioner per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    provisioner: Arc<CollectionProvisioner>,
    coordinator: ConsistencyCoordinator,
}

impl AppState {
    /// Wire the consistency layer around an existing supervisor.
    #[must_use]
    pub fn new(config: ApiConfig, supervisor: Arc<ConnectionSupervisor>) -> Self {
        let provisioner = Arc::new(CollectionProvisioner::new(supervisor));
        let coordinator = ConsistencyCoordinator::new(Arc::clone(&provisioner));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                provisioner,
                coordinator,
            }),
        }
    }

    /// State whose supervisor reads database settings from the environment
    /// on first use.
    #[must_use]
    pub fn from_env(config: ApiConfig, connector: Arc<dyn Connector>) -> Self {
        Self::new(config, Arc::new(ConnectionSupervisor::from_env(connector)))
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn provisioner(&self) -> &CollectionProvisioner {
        &self.inner.provisioner
    }

    #[must_use]
    pub fn coordinator(&self) -> &ConsistencyCoordinator {
        &self.inner.coordinator
    }
}
