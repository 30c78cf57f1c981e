//! Retailer domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque retailer identity.
pub type RetailerId = i64;

/// A store whose listings are scraped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Retailer {
    pub id: RetailerId,
    /// Display name. Also the source of the extractor lookup key.
    pub name: String,
    pub logo: Option<String>,
    /// Storefront URL.
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A retailer that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRetailer {
    pub name: String,
    pub logo: Option<String>,
    pub url: Option<String>,
}

impl NewRetailer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }
}
