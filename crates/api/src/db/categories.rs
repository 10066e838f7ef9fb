//! Category repository.
//!
//! Deleting a category rewrites products, so it lives on
//! [`ConsistencyCoordinator`](super::ConsistencyCoordinator) rather than here.

use uuid::Uuid;

use event_blog_core::{CategoryId, StockId};

use super::collection::Collection;
use super::handle::Document;
use super::provisioner::CollectionProvisioner;
use super::store::Filter;
use super::{RepositoryError, fields};
use crate::models::category::{Category, NewCategory};

impl Document for Category {
    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// Repository for category documents.
pub struct CategoryRepository<'a> {
    provisioner: &'a CollectionProvisioner,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(provisioner: &'a CollectionProvisioner) -> Self {
        Self { provisioner }
    }

    /// Create several categories in one write.
    ///
    /// Either every category is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the insert fails.
    pub async fn create_many(
        &self,
        new: Vec<NewCategory>,
    ) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.provisioner.collection(Collection::Categories).await?;
        let created: Vec<Category> = new
            .into_iter()
            .map(|category| Category {
                id: CategoryId::generate(),
                stock_id: category.stock_id,
                name: category.name,
                description: category.description,
            })
            .collect();

        let inserted = categories.insert_many(&created).await?;
        tracing::info!(count = inserted, "categories created");
        Ok(created)
    }

    /// Categories of one stock, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the query fails.
    pub async fn list_for_stock(&self, stock_id: StockId) -> Result<Vec<Category>, RepositoryError> {
        let categories = self.provisioner.collection(Collection::Categories).await?;
        categories
            .find(&Filter::new().eq(fields::STOCK_ID, stock_id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the lookup fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let categories = self.provisioner.collection(Collection::Categories).await?;
        categories
            .find_one(&Filter::new().eq(fields::ID, id.to_string()))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::DatabaseSettings;
    use crate::db::ConnectionSupervisor;
    use crate::db::memory::{MemoryConnector, MemoryStore};

    #[tokio::test]
    async fn test_create_many_and_list_for_stock() {
        let connector = Arc::new(MemoryConnector::new(Arc::new(MemoryStore::new())));
        let provisioner = CollectionProvisioner::new(Arc::new(ConnectionSupervisor::with_settings(
            connector,
            DatabaseSettings::new("memory://", "event_blog_test"),
        )));
        let repo = CategoryRepository::new(&provisioner);
        let (stock, other) = (StockId::generate(), StockId::generate());

        let created = repo
            .create_many(
                ["Snacks", "Drinks"]
                    .into_iter()
                    .map(|name| NewCategory {
                        stock_id: stock,
                        name: name.to_owned(),
                        description: String::new(),
                    })
                    .chain(std::iter::once(NewCategory {
                        stock_id: other,
                        name: "Tools".to_owned(),
                        description: "Hand tools".to_owned(),
                    }))
                    .collect(),
            )
            .await
            .unwrap();
        assert_eq!(created.len(), 3);

        let listed = repo.list_for_stock(stock).await.unwrap();
        let names: Vec<_> = listed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Snacks", "Drinks"]);

        let first = created.first().unwrap();
        assert_eq!(repo.get(first.id).await.unwrap().as_ref(), Some(first));
        assert!(repo.get(CategoryId::generate()).await.unwrap().is_none());
    }
}
