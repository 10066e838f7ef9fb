//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use event_blog_core::{Email, UserId, UserStatus};

/// A registered user (domain type).
///
/// The password hash is deliberately absent; see
/// [`UserRepository::find_by_email`](crate::db::UserRepository::find_by_email).
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    /// Unique across all users, stored normalized.
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields for a registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}
