//! Event domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use event_blog_core::{EventId, EventStatus, EventWindow, UserId};

/// A scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: UserId,
    pub title: String,
    /// Serialized inline as `start_at` / `end_at`.
    #[serde(flatten)]
    pub window: EventWindow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated request to create an event.
///
/// Holding an [`EventWindow`] means the range is already known to be in
/// order.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub owner_id: UserId,
    pub title: String,
    pub window: EventWindow,
    pub location: Option<String>,
    pub status: EventStatus,
}
