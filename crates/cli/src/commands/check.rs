//! Connectivity check.
//!
//! Connects and pings through the supervisor, then reports which
//! collections exist. Nothing is created. Any missing collection makes the
//! command fail, so scripts can gate on its exit status.

use event_blog_api::db::{Collection, ConnectionSupervisor, bounded};

use super::CommandError;

/// Check connectivity and that every collection exists.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the connection cannot be
/// established, `CommandError::Store` if an existence check fails, and
/// `CommandError::MissingCollections` if any collection is absent.
pub async fn run(supervisor: &ConnectionSupervisor) -> Result<(), CommandError> {
    let store = supervisor.connection().await?;
    tracing::info!("database reachable");

    let mut missing = Vec::new();
    for collection in Collection::ALL {
        if bounded(store.collection_exists(collection)).await? {
            tracing::info!(%collection, "present");
        } else {
            tracing::warn!(%collection, "missing (run `event-blog-cli provision`)");
            missing.push(collection);
        }
    }

    if !missing.is_empty() {
        return Err(CommandError::MissingCollections(missing));
    }

    tracing::info!("Check complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use event_blog_api::config::DatabaseSettings;
    use event_blog_api::db::memory::{MemoryConnector, MemoryStore};
    use event_blog_api::db::{CollectionProvisioner, RepositoryError};

    use super::*;

    #[tokio::test]
    async fn test_reports_missing_collections() {
        let store = Arc::new(MemoryStore::new());
        let supervisor = Arc::new(ConnectionSupervisor::with_settings(
            Arc::new(MemoryConnector::new(Arc::clone(&store))),
            DatabaseSettings::new("memory://", "event_blog_cli"),
        ));

        let err = run(&supervisor).await.unwrap_err();
        assert!(matches!(err, CommandError::MissingCollections(ref m) if m == &Collection::ALL));

        let provisioner = CollectionProvisioner::new(Arc::clone(&supervisor));
        provisioner.collection(Collection::Events).await.unwrap();
        let Err(CommandError::MissingCollections(missing)) = run(&supervisor).await else {
            panic!("expected missing collections");
        };
        assert!(!missing.contains(&Collection::Events));
        assert_eq!(missing.len(), Collection::ALL.len() - 1);

        provisioner.provision_all().await.unwrap();
        run(&supervisor).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_database() {
        let supervisor = ConnectionSupervisor::with_settings(
            Arc::new(MemoryConnector::new(Arc::new(MemoryStore::new())).refusing("refused")),
            DatabaseSettings::new("memory://", "event_blog_cli"),
        );

        let err = run(&supervisor).await.unwrap_err();
        assert!(matches!(
            err,
            CommandError::Repository(RepositoryError::Connectivity(_))
        ));
    }
}
