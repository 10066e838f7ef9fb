//! CLI command implementations.

pub mod check;
pub mod provision;

use std::sync::Arc;

use clap::ValueEnum;
use event_blog_api::db::postgres::PgConnector;
use event_blog_api::db::{Collection, Connector, RepositoryError, StoreError};

/// Collection selector on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    All,
    Users,
    Events,
    Stocks,
    Products,
    Categories,
}

impl Target {
    /// The collections this target covers.
    #[must_use]
    pub fn collections(self) -> Vec<Collection> {
        match self {
            Self::All => Collection::ALL.to_vec(),
            Self::Users => vec![Collection::Users],
            Self::Events => vec![Collection::Events],
            Self::Stocks => vec![Collection::Stocks],
            Self::Products => vec![Collection::Products],
            Self::Categories => vec![Collection::Categories],
        }
    }
}

/// Errors raised by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("missing collections: {}", list(.0))]
    MissingCollections(Vec<Collection>),
}

fn list(collections: &[Collection]) -> String {
    collections
        .iter()
        .map(|collection| collection.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single-connection `PostgreSQL` connector; the CLI runs one command at a time.
pub fn postgres_connector() -> Arc<dyn Connector> {
    Arc::new(PgConnector::new(1))
}
