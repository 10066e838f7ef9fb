//! User repository.
//!
//! Email uniqueness is enforced by the `email_unique` index that the
//! provisioner installs on the users collection, so two concurrent
//! registrations with the same address cannot both succeed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use event_blog_core::{Email, UserId, UserStatus};

use super::collection::Collection;
use super::handle::Document;
use super::provisioner::CollectionProvisioner;
use super::store::Filter;
use super::{RepositoryError, fields};
use crate::models::user::{NewUser, User};

/// Stored shape of a user, including the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    id: UserId,
    email: Email,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    password_hash: String,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Document for UserDocument {
    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            display_name: doc.display_name,
            avatar_url: doc.avatar_url,
            status: doc.status,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

/// Repository for user documents.
pub struct UserRepository<'a> {
    provisioner: &'a CollectionProvisioner,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(provisioner: &'a CollectionProvisioner) -> Self {
        Self { provisioner }
    }

    /// Register a user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, new: NewUser, password_hash: &str) -> Result<User, RepositoryError> {
        let users = self.provisioner.collection(Collection::Users).await?;

        let now = Utc::now();
        let doc = UserDocument {
            id: UserId::generate(),
            email: new.email,
            display_name: new.display_name,
            avatar_url: new.avatar_url,
            password_hash: password_hash.to_owned(),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };

        users.insert(&doc).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                RepositoryError::Conflict("email already registered".to_owned())
            }
            other => other,
        })?;

        tracing::info!(user_id = %doc.id, "user registered");
        Ok(doc.into())
    }

    /// Get a user and their password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the lookup fails.
    /// Returns `RepositoryError::DataCorruption` if the stored user is invalid.
    pub async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let users = self.provisioner.collection(Collection::Users).await?;
        let document: Option<UserDocument> = users
            .find_one(&Filter::new().eq(fields::EMAIL, email.as_str()))
            .await?;

        Ok(document.map(|mut doc| {
            let hash = std::mem::take(&mut doc.password_hash);
            (User::from(doc), hash)
        }))
    }
}
