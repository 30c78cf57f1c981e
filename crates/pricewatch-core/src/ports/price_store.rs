//! Price store trait definition.
//!
//! Both write methods are upserts keyed on a natural key and must be backed
//! by a uniqueness constraint. Stores without native upsert emulate it in a
//! transaction (read, then insert or update), last writer wins.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::RepositoryError;
use crate::domain::{
    HistoryEntry, PriceHistoryPoint, ProductId, ProductRetailerAssociation, RetailerId,
    RetailerListing,
};

/// Storage for current prices and the daily price history.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert or overwrite the association keyed on `(product_id, retailer_id)`.
    async fn upsert_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        price: Decimal,
        url: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Insert or overwrite the history point keyed on `(product_id, retailer_id, observed_on)`.
    async fn upsert_history_point(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        observed_on: NaiveDate,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Get the current association, if any.
    async fn get_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Option<ProductRetailerAssociation>, RepositoryError>;

    /// Current prices of a product at every retailer that has one.
    async fn list_associations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<RetailerListing>, RepositoryError>;

    /// History points of one (product, retailer) pair, oldest first.
    async fn list_history_points(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Vec<PriceHistoryPoint>, RepositoryError>;

    /// Full history of a product across retailers, newest date first.
    async fn list_history(&self, product_id: ProductId)
    -> Result<Vec<HistoryEntry>, RepositoryError>;
}
