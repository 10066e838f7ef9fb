//! Collection provisioning.
//!
//! Runs the same setup the server performs at startup, so collections and
//! unique indexes can be created before the first deploy.

use std::sync::Arc;

use event_blog_api::db::{CollectionProvisioner, ConnectionSupervisor};

use super::{CommandError, Target};

/// Provision the collections covered by `target`.
///
/// # Errors
///
/// Returns the first connection or provisioning error.
pub async fn run(supervisor: Arc<ConnectionSupervisor>, target: Target) -> Result<(), CommandError> {
    let provisioner = CollectionProvisioner::new(supervisor);

    for collection in target.collections() {
        let handle = provisioner.collection(collection).await?;
        tracing::info!(collection = %handle.collection(), "collection ready");
    }

    tracing::info!("Provisioning complete!");
    Ok(())
}
