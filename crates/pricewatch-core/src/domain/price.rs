//! Price records: the current (product, retailer) association and the daily history trail.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::retailer::{Retailer, RetailerId};

/// Current observed state of a product at a retailer.
///
/// At most one row exists per `(product_id, retailer_id)`; writes upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRetailerAssociation {
    pub product_id: ProductId,
    pub retailer_id: RetailerId,
    pub price: Decimal,
    /// Product page URL at the retailer.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One price observation per `(product_id, retailer_id, observed_on)`.
///
/// A same-day observation overwrites the price of that day's point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub product_id: ProductId,
    pub retailer_id: RetailerId,
    /// Calendar date of the observation.
    pub observed_on: NaiveDate,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What an extractor found for one retailer. Never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub retailer_id: RetailerId,
    pub url: String,
    pub price: Decimal,
}

/// A price to be reconciled into durable state by the recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceObservation {
    pub product_id: ProductId,
    pub retailer_id: RetailerId,
    pub url: String,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl PriceObservation {
    /// Build an observation from an extraction result.
    pub fn from_extraction(
        product_id: ProductId,
        result: ExtractionResult,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            product_id,
            retailer_id: result.retailer_id,
            url: result.url,
            price: result.price,
            observed_at,
        }
    }

    /// The history key date (UTC calendar day of the observation).
    pub fn observed_on(&self) -> NaiveDate {
        self.observed_at.date_naive()
    }
}

/// Current association joined with its retailer, for read-side listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerListing {
    pub retailer: Retailer,
    pub association: ProductRetailerAssociation,
}

/// History point joined with the retailer name, for read-side listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub retailer_name: String,
    pub point: PriceHistoryPoint,
}
