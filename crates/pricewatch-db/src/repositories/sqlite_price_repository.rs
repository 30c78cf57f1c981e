//! `SQLite` implementation of the `PriceStore` trait.
//!
//! Both writes use `INSERT ... ON CONFLICT DO UPDATE` against the natural
//! key, so each is a single atomic statement and the last writer wins.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use pricewatch_core::domain::{
    HistoryEntry, PriceHistoryPoint, ProductId, ProductRetailerAssociation, RetailerId,
    RetailerListing,
};
use pricewatch_core::ports::{PriceStore, RepositoryError};

use super::row_mappers::{AssociationRow, HistoryEntryRow, HistoryRow, ListingRow, map_sqlx_error};

/// `SQLite` implementation of the price store.
pub struct SqlitePriceRepository {
    pool: SqlitePool,
}

impl SqlitePriceRepository {
    /// Create a new `SQLite` price repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceStore for SqlitePriceRepository {
    async fn upsert_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        price: Decimal,
        url: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO product_retailers (product_id, retailer_id, price, url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (product_id, retailer_id) DO UPDATE SET
                price = excluded.price,
                url = excluded.url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product_id)
        .bind(retailer_id)
        .bind(price.to_string())
        .bind(url)
        .bind(observed_at)
        .bind(observed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn upsert_history_point(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        observed_on: NaiveDate,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO price_history (product_id, retailer_id, observed_on, price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (product_id, retailer_id, observed_on) DO UPDATE SET
                price = excluded.price,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(product_id)
        .bind(retailer_id)
        .bind(observed_on)
        .bind(price.to_string())
        .bind(observed_at)
        .bind(observed_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn get_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Option<ProductRetailerAssociation>, RepositoryError> {
        sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT product_id, retailer_id, price, url, created_at, updated_at
            FROM product_retailers
            WHERE product_id = ? AND retailer_id = ?
            "#,
        )
        .bind(product_id)
        .bind(retailer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(ProductRetailerAssociation::try_from)
        .transpose()
    }

    async fn list_associations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<RetailerListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            r#"
            SELECT pr.product_id, pr.retailer_id, pr.price, pr.url, pr.created_at, pr.updated_at,
                   r.name AS retailer_name, r.logo AS retailer_logo, r.url AS retailer_url,
                   r.created_at AS retailer_created_at, r.updated_at AS retailer_updated_at
            FROM product_retailers pr
            JOIN retailers r ON r.id = pr.retailer_id
            WHERE pr.product_id = ?
            ORDER BY r.name COLLATE NOCASE
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(RetailerListing::try_from).collect()
    }

    async fn list_history_points(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Vec<PriceHistoryPoint>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT product_id, retailer_id, observed_on, price, created_at, updated_at
            FROM price_history
            WHERE product_id = ? AND retailer_id = ?
            ORDER BY observed_on
            "#,
        )
        .bind(product_id)
        .bind(retailer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PriceHistoryPoint::try_from).collect()
    }

    async fn list_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, HistoryEntryRow>(
            r#"
            SELECT h.product_id, h.retailer_id, h.observed_on, h.price, h.created_at, h.updated_at,
                   r.name AS retailer_name
            FROM price_history h
            JOIN retailers r ON r.id = h.retailer_id
            WHERE h.product_id = ?
            ORDER BY h.observed_on DESC, r.name COLLATE NOCASE
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| -> Result<HistoryEntry, RepositoryError> {
                Ok(HistoryEntry {
                    retailer_name: row.retailer_name,
                    point: row.point.try_into()?,
                })
            })
            .collect()
    }
}
