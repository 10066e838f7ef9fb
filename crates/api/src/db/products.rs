//! Product repository.

use uuid::Uuid;

use event_blog_core::{ProductId, StockId};

use super::collection::Collection;
use super::handle::Document;
use super::provisioner::CollectionProvisioner;
use super::store::Filter;
use super::{RepositoryError, fields};
use crate::models::product::{NewProduct, Product};

impl Document for Product {
    fn key(&self) -> Uuid {
        self.id.as_uuid()
    }
}

/// Repository for product documents.
pub struct ProductRepository<'a> {
    provisioner: &'a CollectionProvisioner,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(provisioner: &'a CollectionProvisioner) -> Self {
        Self { provisioner }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the insert fails.
    pub async fn create(&self, new: NewProduct) -> Result<Product, RepositoryError> {
        let products = self.provisioner.collection(Collection::Products).await?;
        let product = Product {
            id: ProductId::generate(),
            stock_id: new.stock_id,
            name: new.name,
            category: new.category,
            unit: new.unit,
            quantity: new.quantity,
        };
        products.insert(&product).await?;
        tracing::info!(product_id = %product.id, stock_id = %product.stock_id, "product created");
        Ok(product)
    }

    /// Products, optionally limited to one stock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Storage` if the query fails.
    pub async fn list(&self, stock_id: Option<StockId>) -> Result<Vec<Product>, RepositoryError> {
        let products = self.provisioner.collection(Collection::Products).await?;
        let filter = match stock_id {
            Some(stock_id) => Filter::new().eq(fields::STOCK_ID, stock_id.to_string()),
            None => Filter::new(),
        };
        products.find(&filter).await
    }

    /// Delete one product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this id.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let products = self.provisioner.collection(Collection::Products).await?;
        let deleted = products
            .delete_one(&Filter::new().eq(fields::ID, id.to_string()))
            .await?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}
