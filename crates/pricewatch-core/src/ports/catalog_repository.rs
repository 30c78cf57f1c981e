//! Catalog repository trait definition.
//!
//! Products and retailers are owned by the catalog. The scraping core only
//! reads them; the write methods exist for the catalog service and tooling.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::{NewProduct, NewRetailer, Product, ProductId, Retailer, RetailerId};

/// Repository for product and retailer persistence.
///
/// # Design Rules
///
/// - No `sqlx` types in signatures
/// - Price data is not reachable from here; see `PriceStore`
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Get a product by its database ID.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the product doesn't exist.
    async fn get_product(&self, id: ProductId) -> Result<Product, RepositoryError>;

    /// List all products ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Find products whose name or code contains `query`.
    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a new product and return it with its assigned ID.
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError>;

    /// Overwrite the editable fields of an existing product.
    ///
    /// Returns `Err(RepositoryError::NotFound)` if the product doesn't exist.
    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError>;

    /// Delete a product and, by cascade, its prices and history.
    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError>;

    /// List every known retailer.
    async fn list_retailers(&self) -> Result<Vec<Retailer>, RepositoryError>;

    /// Get a retailer by its database ID.
    async fn get_retailer(&self, id: RetailerId) -> Result<Retailer, RepositoryError>;

    /// Insert a new retailer.
    ///
    /// Returns `Err(RepositoryError::AlreadyExists)` when the name is taken.
    async fn insert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, RepositoryError>;
}
