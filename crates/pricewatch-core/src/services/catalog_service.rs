//! Catalog service - product and retailer management plus price read-outs.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use super::price_recorder::{PriceRecorder, RecordReceipt};
use crate::domain::{
    HistoryEntry, NewProduct, NewRetailer, PriceObservation, Product, ProductId, Retailer,
    RetailerId, RetailerListing,
};
use crate::ports::{CatalogRepository, CoreError, PriceStore, RepositoryError, Repos};

/// Service for catalog operations.
///
/// A thin facade over the repositories that enforces the product name
/// invariant and routes manual price entry through the [`PriceRecorder`].
pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    prices: Arc<dyn PriceStore>,
    recorder: PriceRecorder,
}

impl CatalogService {
    pub fn new(repos: &Repos) -> Self {
        Self {
            catalog: Arc::clone(&repos.catalog),
            prices: Arc::clone(&repos.prices),
            recorder: PriceRecorder::new(Arc::clone(&repos.prices)),
        }
    }

    /// List all products ordered by name.
    pub async fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        self.catalog.list_products().await.map_err(CoreError::from)
    }

    /// Get a product by ID, `None` if it doesn't exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, CoreError> {
        match self.catalog.get_product(id).await {
            Ok(product) => Ok(Some(product)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(e) => Err(CoreError::from(e)),
        }
    }

    /// Get a product by ID. Returns error if not found.
    pub async fn find_product(&self, id: ProductId) -> Result<Product, CoreError> {
        self.get_product(id)
            .await?
            .ok_or_else(|| CoreError::Validation(format!("Product not found: {id}")))
    }

    /// Find products whose name or code contains `query`.
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, CoreError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list_products().await;
        }
        self.catalog
            .search_products(query)
            .await
            .map_err(CoreError::from)
    }

    /// Add a product. The display name must be non-blank.
    pub async fn add_product(&self, product: NewProduct) -> Result<Product, CoreError> {
        let product = product.validated().map_err(CoreError::Validation)?;
        self.catalog
            .insert_product(&product)
            .await
            .map_err(CoreError::from)
    }

    /// Replace the editable fields of a product.
    pub async fn update_product(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> Result<Product, CoreError> {
        let product = product.validated().map_err(CoreError::Validation)?;
        self.catalog
            .update_product(id, &product)
            .await
            .map_err(CoreError::from)
    }

    /// Delete a product with its prices and history.
    pub async fn remove_product(&self, id: ProductId) -> Result<(), CoreError> {
        self.catalog.delete_product(id).await.map_err(CoreError::from)
    }

    pub async fn list_retailers(&self) -> Result<Vec<Retailer>, CoreError> {
        self.catalog.list_retailers().await.map_err(CoreError::from)
    }

    /// Add a retailer. Names are unique.
    pub async fn add_retailer(&self, retailer: NewRetailer) -> Result<Retailer, CoreError> {
        let name = retailer.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "retailer name must not be empty".to_string(),
            ));
        }
        let retailer = NewRetailer {
            name: name.to_string(),
            ..retailer
        };
        self.catalog
            .insert_retailer(&retailer)
            .await
            .map_err(CoreError::from)
    }

    /// Current price of a product at every retailer that has one.
    pub async fn current_prices(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<RetailerListing>, CoreError> {
        self.prices
            .list_associations(product_id)
            .await
            .map_err(CoreError::from)
    }

    /// Price history of a product across retailers, newest date first.
    pub async fn price_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<HistoryEntry>, CoreError> {
        self.prices
            .list_history(product_id)
            .await
            .map_err(CoreError::from)
    }

    /// Record a price entered by hand for an existing product and retailer.
    pub async fn set_price(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        price: Decimal,
        url: &str,
    ) -> Result<RecordReceipt, CoreError> {
        if price.is_sign_negative() {
            return Err(CoreError::Validation(format!(
                "price must not be negative: {price}"
            )));
        }
        self.catalog.get_product(product_id).await?;
        self.catalog.get_retailer(retailer_id).await?;

        let observation = PriceObservation {
            product_id,
            retailer_id,
            url: url.trim().to_string(),
            price,
            observed_at: Utc::now(),
        };
        Ok(self.recorder.record(&observation).await?)
    }
}
