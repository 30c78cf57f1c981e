//! Row types and mapping helpers shared by the `SQLite` repositories.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use pricewatch_core::domain::{
    PriceHistoryPoint, Product, ProductRetailerAssociation, Retailer, RetailerListing,
};
use pricewatch_core::ports::RepositoryError;

/// Shared SELECT column list for product queries.
pub const PRODUCT_SELECT_COLUMNS: &str =
    "id, name, search_name, code, image, url, created_at, updated_at";

/// Shared SELECT column list for retailer queries.
pub const RETAILER_SELECT_COLUMNS: &str = "id, name, logo, url, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub search_name: Option<String>,
    pub code: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            search_name: row.search_name,
            code: row.code,
            image: row.image,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct RetailerRow {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RetailerRow> for Retailer {
    fn from(row: RetailerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            logo: row.logo,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub struct AssociationRow {
    pub product_id: i64,
    pub retailer_id: i64,
    pub price: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<AssociationRow> for ProductRetailerAssociation {
    type Error = RepositoryError;

    fn try_from(row: AssociationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            retailer_id: row.retailer_id,
            price: parse_decimal(&row.price)?,
            url: row.url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Association joined with its retailer.
#[derive(sqlx::FromRow)]
pub struct ListingRow {
    #[sqlx(flatten)]
    pub association: AssociationRow,
    pub retailer_name: String,
    pub retailer_logo: Option<String>,
    pub retailer_url: Option<String>,
    pub retailer_created_at: DateTime<Utc>,
    pub retailer_updated_at: DateTime<Utc>,
}

impl TryFrom<ListingRow> for RetailerListing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        let retailer = Retailer {
            id: row.association.retailer_id,
            name: row.retailer_name,
            logo: row.retailer_logo,
            url: row.retailer_url,
            created_at: row.retailer_created_at,
            updated_at: row.retailer_updated_at,
        };
        Ok(Self {
            retailer,
            association: row.association.try_into()?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub struct HistoryRow {
    pub product_id: i64,
    pub retailer_id: i64,
    pub observed_on: NaiveDate,
    pub price: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for PriceHistoryPoint {
    type Error = RepositoryError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: row.product_id,
            retailer_id: row.retailer_id,
            observed_on: row.observed_on,
            price: parse_decimal(&row.price)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// History point joined with its retailer name.
#[derive(sqlx::FromRow)]
pub struct HistoryEntryRow {
    #[sqlx(flatten)]
    pub point: HistoryRow,
    pub retailer_name: String,
}

/// Prices are stored as canonical decimal text.
pub fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(s)
        .map_err(|e| RepositoryError::Serialization(format!("invalid stored price {s:?}: {e}")))
}

/// Map `SQLx` errors to `RepositoryError`.
pub fn map_sqlx_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::RowNotFound => RepositoryError::NotFound(e.to_string()),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::AlreadyExists(db.message().to_string())
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() || db.is_check_violation() => {
            RepositoryError::Constraint(db.message().to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Serialization(e.to_string())
        }
        _ => RepositoryError::Storage(e.to_string()),
    }
}

/// Build a `LIKE` pattern matching `query` anywhere, with `\` as escape.
pub fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
