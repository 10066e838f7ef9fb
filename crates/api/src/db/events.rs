//! Event repository.

use chrono::Utc;
use uuid::Uuid;

use event_blog_core::EventId;

use super::RepositoryError;
use super::collection::Collection;
use super::handle::Document;
use super::provisioner::CollectionProvisioner;
use super::store::Filter;
use crate::models::event::{Event, NewEvent};

impl Document for Event {
    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// Repository for event documents.
pub struct EventRepository<'a> {
    provisioner: &'a CollectionProvisioner,
}

impl<'a> EventRepository<'a> {
    #[must_use]
    pub const fn new(provisioner: &'a CollectionProvisioner) -> Self {
        Self { provisioner }
    }

    /// Store a new event under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the insert fails.
    pub async fn create(&self, new: NewEvent) -> Result<Event, RepositoryError> {
        let events = self.provisioner.collection(Collection::Events).await?;

        let event = Event {
            id: EventId::generate(),
            owner_id: new.owner_id,
            title: new.title,
            window: new.window,
            location: new.location,
            status: new.status,
            created_at: Utc::now(),
        };
        events.insert(&event).await?;

        tracing::info!(event_id = %event.id, owner_id = %event.owner_id, "event created");
        Ok(event)
    }

    /// All events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the query fails.
    pub async fn list(&self) -> Result<Vec<Event>, RepositoryError> {
        let events = self.provisioner.collection(Collection::Events).await?;
        events.find(&Filter::new()).await
    }
}
