//! Stock repository.
//!
//! Deleting a stock also deletes its products, so it lives on
//! [`ConsistencyCoordinator`](super::ConsistencyCoordinator) rather than here.

use uuid::Uuid;

use event_blog_core::StockId;

use super::RepositoryError;
use super::collection::Collection;
use super::handle::Document;
use super::provisioner::CollectionProvisioner;
use super::store::Filter;
use crate::models::stock::{NewStock, Stock};

impl Document for Stock {
    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// Repository for stock documents.
pub struct StockRepository<'a> {
    provisioner: &'a CollectionProvisioner,
}

impl<'a> StockRepository<'a> {
    #[must_use]
    pub const fn new(provisioner: &'a CollectionProvisioner) -> Self {
        Self { provisioner }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the insert fails.
    pub async fn create(&self, new: NewStock) -> Result<Stock, RepositoryError> {
        let stocks = self.provisioner.collection(Collection::Stocks).await?;
        let stock = Stock {
            id: StockId::generate(),
            owner_id: new.owner_id,
            name: new.name,
        };
        stocks.insert(&stock).await?;
        tracing::info!(stock_id = %stock.id, "stock created");
        Ok(stock)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the query fails.
    pub async fn list(&self) -> Result<Vec<Stock>, RepositoryError> {
        let stocks = self.provisioner.collection(Collection::Stocks).await?;
        stocks.find(&Filter::new()).await
    }
}
