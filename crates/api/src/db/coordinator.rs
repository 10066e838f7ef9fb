//! Deletes that span collections.
//!
//! The store offers no multi-collection transaction, so each cascade is a
//! fixed sequence of single-collection writes. Every step is idempotent, so
//! after a failure part way through the whole operation can be run again.
//!
//! - Stock: delete the stock, then its products. An interruption leaves
//!   orphaned products that a rerun removes.
//! - Category: clear the label on matching products, then delete the
//!   category. An interruption leaves the category in place, so the delete
//!   can simply be retried.
//!
//! A failing step is reported as `RepositoryError::Storage` naming the step.

use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use event_blog_core::{CategoryId, StockId};

use super::collection::Collection;
use super::provisioner::CollectionProvisioner;
use super::store::{Filter, Update};
use super::{RepositoryError, fields};
use crate::models::category::Category;

/// Outcome of a cascading stock delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StockDeletion {
    pub deleted_stock: u64,
    pub deleted_products: u64,
}

/// Outcome of a category delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDeletion {
    /// Products whose category label was cleared.
    pub updated_products: u64,
    pub deleted_category: u64,
}

/// Runs the cascading deletes.
#[derive(Clone)]
pub struct ConsistencyCoordinator {
    provisioner: Arc<CollectionProvisioner>,
}

impl ConsistencyCoordinator {
    #[must_use]
    pub const fn new(provisioner: Arc<CollectionProvisioner>) -> Self {
        Self { provisioner }
    }

    /// Delete a stock and every product that belongs to it.
    ///
    /// Both steps run even when no stock matched, so a repeated call
    /// reports zero for each count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` naming the step that failed.
    #[instrument(skip(self), fields(stock_id = %stock_id))]
    pub async fn delete_stock(&self, stock_id: StockId) -> Result<StockDeletion, RepositoryError> {
        let stocks = self.provisioner.collection(Collection::Stocks).await?;
        let products = self.provisioner.collection(Collection::Products).await?;

        let deleted_stock = stocks
            .delete_one(&Filter::new().eq(fields::ID, stock_id.to_string()))
            .await
            .map_err(|e| e.at_step("delete stock"))?;

        let deleted_products = products
            .delete_many(&Filter::new().eq(fields::STOCK_ID, stock_id.to_string()))
            .await
            .map_err(|e| e.at_step("delete products of stock"))?;

        tracing::info!(deleted_stock, deleted_products, "stock deleted");
        Ok(StockDeletion {
            deleted_stock,
            deleted_products,
        })
    }

    /// Delete a category and clear its label from the stock's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` without touching anything if the
    /// category does not exist, and `RepositoryError::Storage` naming the
    /// step that failed otherwise.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(
        &self,
        category_id: CategoryId,
    ) -> Result<CategoryDeletion, RepositoryError> {
        let categories = self.provisioner.collection(Collection::Categories).await?;
        let products = self.provisioner.collection(Collection::Products).await?;
        let by_id = Filter::new().eq(fields::ID, category_id.to_string());

        let category: Category = categories
            .find_one(&by_id)
            .await
            .map_err(|e| e.at_step("fetch category"))?
            .ok_or_else(|| RepositoryError::NotFound(format!("category {category_id}")))?;

        let labelled = Filter::new()
            .eq(fields::STOCK_ID, category.stock_id.to_string())
            .eq(fields::CATEGORY, category.name.as_str());
        let updated_products = products
            .update_many(&labelled, &Update::new().clear(fields::CATEGORY))
            .await
            .map_err(|e| e.at_step("clear category on products"))?;

        let deleted_category = categories
            .delete_one(&by_id)
            .await
            .map_err(|e| e.at_step("delete category"))?;

        tracing::info!(
            updated_products,
            deleted_category,
            category = %category.name,
            "category deleted"
        );
        Ok(CategoryDeletion {
            updated_products,
            deleted_category,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use event_blog_core::UserId;

    use super::*;
    use crate::config::DatabaseSettings;
    use crate::db::memory::{MemoryConnector, MemoryStore, StoreOp};
    use crate::db::{CategoryRepository, ConnectionSupervisor, ProductRepository, StockRepository};
    use crate::models::{NewCategory, NewProduct, NewStock};

    struct Fixture {
        store: Arc<MemoryStore>,
        provisioner: Arc<CollectionProvisioner>,
        coordinator: ConsistencyCoordinator,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let connector = Arc::new(MemoryConnector::new(Arc::clone(&store)));
        let supervisor = Arc::new(ConnectionSupervisor::with_settings(
            connector,
            DatabaseSettings::new("memory://", "event_blog_test"),
        ));
        let provisioner = Arc::new(CollectionProvisioner::new(supervisor));
        let coordinator = ConsistencyCoordinator::new(Arc::clone(&provisioner));
        Fixture {
            store,
            provisioner,
            coordinator,
        }
    }

    async fn stock(f: &Fixture) -> StockId {
        StockRepository::new(&f.provisioner)
            .create(NewStock {
                owner_id: UserId::generate(),
                name: "Pantry".to_owned(),
            })
            .await
            .unwrap()
            .id
    }

    async fn product(f: &Fixture, stock_id: StockId, category: Option<&str>) {
        ProductRepository::new(&f.provisioner)
            .create(NewProduct {
                stock_id,
                name: "item".to_owned(),
                category: category.map(str::to_owned),
                unit: None,
                quantity: 1,
            })
            .await
            .unwrap();
    }

    async fn category(f: &Fixture, stock_id: StockId, name: &str) -> CategoryId {
        CategoryRepository::new(&f.provisioner)
            .create_many(vec![NewCategory {
                stock_id,
                name: name.to_owned(),
                description: String::new(),
            }])
            .await
            .unwrap()
            .first()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_delete_stock_removes_its_products() {
        let f = fixture();
        let doomed = stock(&f).await;
        let kept = stock(&f).await;
        product(&f, doomed, None).await;
        product(&f, doomed, Some("Snacks")).await;
        product(&f, kept, None).await;

        let result = f.coordinator.delete_stock(doomed).await.unwrap();
        assert_eq!(
            result,
            StockDeletion {
                deleted_stock: 1,
                deleted_products: 2,
            }
        );

        let products = ProductRepository::new(&f.provisioner);
        assert!(products.list(Some(doomed)).await.unwrap().is_empty());
        assert_eq!(products.list(Some(kept)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_stock_is_idempotent() {
        let f = fixture();
        let doomed = stock(&f).await;
        product(&f, doomed, None).await;

        f.coordinator.delete_stock(doomed).await.unwrap();
        let again = f.coordinator.delete_stock(doomed).await.unwrap();
        assert_eq!(
            again,
            StockDeletion {
                deleted_stock: 0,
                deleted_products: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_delete_stock_clears_orphans_without_stock() {
        let f = fixture();
        let missing = StockId::generate();
        product(&f, missing, None).await;

        let result = f.coordinator.delete_stock(missing).await.unwrap();
        assert_eq!(result.deleted_stock, 0);
        assert_eq!(result.deleted_products, 1);
    }

    #[tokio::test]
    async fn test_delete_stock_reports_failed_step_and_retries_cleanly() {
        let f = fixture();
        let doomed = stock(&f).await;
        product(&f, doomed, None).await;
        f.store.fail(StoreOp::Delete, Collection::Products);

        let err = f.coordinator.delete_stock(doomed).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Storage { ref step, .. } if step == "delete products of stock"
        ));
        // The stock went first; its product is now an orphan.
        assert_eq!(f.store.len(Collection::Stocks), 0);
        assert_eq!(f.store.len(Collection::Products), 1);

        f.store.heal();
        let retry = f.coordinator.delete_stock(doomed).await.unwrap();
        assert_eq!(retry.deleted_stock, 0);
        assert_eq!(retry.deleted_products, 1);
    }

    #[tokio::test]
    async fn test_delete_category_clears_matching_labels() {
        let f = fixture();
        let pantry = stock(&f).await;
        let other = stock(&f).await;
        product(&f, pantry, Some("Snacks")).await;
        product(&f, pantry, Some("Other")).await;
        product(&f, other, Some("Snacks")).await;
        let snacks = category(&f, pantry, "Snacks").await;

        let result = f.coordinator.delete_category(snacks).await.unwrap();
        assert_eq!(
            result,
            CategoryDeletion {
                updated_products: 1,
                deleted_category: 1,
            }
        );

        let products = ProductRepository::new(&f.provisioner);
        let labels: Vec<_> = products
            .list(Some(pantry))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.category)
            .collect();
        assert_eq!(labels, [None, Some("Other".to_owned())]);

        // Same name under another stock is untouched.
        let elsewhere = products.list(Some(other)).await.unwrap();
        assert_eq!(elsewhere.first().unwrap().category.as_deref(), Some("Snacks"));

        let categories = CategoryRepository::new(&f.provisioner);
        assert!(categories.get(snacks).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_category_has_no_side_effects() {
        let f = fixture();
        let pantry = stock(&f).await;
        product(&f, pantry, Some("Snacks")).await;
        category(&f, pantry, "Snacks").await;

        let err = f
            .coordinator
            .delete_category(CategoryId::generate())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        assert_eq!(f.store.len(Collection::Categories), 1);
        let products = ProductRepository::new(&f.provisioner).list(None).await.unwrap();
        assert_eq!(products.first().unwrap().category.as_deref(), Some("Snacks"));
    }

    #[tokio::test]
    async fn test_delete_category_retry_after_failed_delete() {
        let f = fixture();
        let pantry = stock(&f).await;
        product(&f, pantry, Some("Snacks")).await;
        let snacks = category(&f, pantry, "Snacks").await;
        f.store.fail(StoreOp::Delete, Collection::Categories);

        let err = f.coordinator.delete_category(snacks).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Storage { ref step, .. } if step == "delete category"
        ));
        // Labels are already cleared but the category is still there.
        assert_eq!(f.store.len(Collection::Categories), 1);

        f.store.heal();
        let retry = f.coordinator.delete_category(snacks).await.unwrap();
        assert_eq!(
            retry,
            CategoryDeletion {
                updated_products: 0,
                deleted_category: 1,
            }
        );
    }
}
