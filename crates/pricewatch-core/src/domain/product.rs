//! Product domain types.
//!
//! Products are owned by the catalog; the scraping core only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque product identity.
pub type ProductId = i64;

/// A product tracked across retailers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Database ID of the product.
    pub id: ProductId,
    /// Canonical display name. Never empty.
    pub name: String,
    /// Alternate name used when searching retailer sites.
    pub search_name: Option<String>,
    /// External product code (SKU, barcode, ...).
    pub code: Option<String>,
    /// Image reference (path or URL).
    pub image: Option<String>,
    /// Canonical product URL.
    pub url: Option<String>,
    /// When the product was added to the catalog.
    pub created_at: DateTime<Utc>,
    /// When the product was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The term extractors should search for.
    ///
    /// The alternate search name wins when it is present and non-blank,
    /// otherwise the display name is used.
    pub fn search_term(&self) -> &str {
        resolve_search_term(&self.name, self.search_name.as_deref())
    }
}

/// Pick the search term from a display name and an optional alternate name.
pub fn resolve_search_term<'a>(display_name: &'a str, search_name: Option<&'a str>) -> &'a str {
    match search_name.map(str::trim) {
        Some(alt) if !alt.is_empty() => alt,
        _ => display_name,
    }
}

/// A product that has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub search_name: Option<String>,
    pub code: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl NewProduct {
    /// Create a new product with only a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the alternate search name.
    #[must_use]
    pub fn with_search_name(mut self, search_name: impl Into<String>) -> Self {
        self.search_name = Some(search_name.into());
        self
    }

    /// Set the external product code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the canonical URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Check the display-name invariant and normalize blank optionals to `None`.
    pub fn validated(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err("product name must not be empty".to_string());
        }
        self.search_name = non_blank(self.search_name);
        self.code = non_blank(self.code);
        self.image = non_blank(self.image);
        self.url = non_blank(self.url);
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
