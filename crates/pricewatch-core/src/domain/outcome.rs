//! Per-retailer scrape outcomes returned by one orchestration run.
//!
//! Outcomes are transient: they are aggregated into a [`ScrapeReport`] and
//! handed back to the caller, never persisted.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::retailer::RetailerId;

/// Why extraction failed for a retailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// Search or page navigation failed.
    Navigation(String),
    /// The page loaded but reading it failed.
    Extraction(String),
    /// The product page was found but no parseable price was on it.
    NoPriceFound,
    /// Navigation and extraction together exceeded the per-retailer budget.
    Timeout,
    /// The extractor panicked.
    Panicked(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Navigation(msg) => write!(f, "navigation failed: {msg}"),
            Self::Extraction(msg) => write!(f, "extraction failed: {msg}"),
            Self::NoPriceFound => f.write_str("no price found"),
            Self::Timeout => f.write_str("timed out"),
            Self::Panicked(msg) => write!(f, "extractor panicked: {msg}"),
        }
    }
}

/// Whether a successfully retrieved price also made it into storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Persistence {
    /// Association and history point were both written.
    Recorded,
    /// Association written; history point write failed.
    HistoryNotRecorded(String),
    /// Association write failed.
    NotRecorded(String),
}

impl Persistence {
    /// Returns the persistence warning, if any.
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Recorded => None,
            Self::HistoryNotRecorded(reason) | Self::NotRecorded(reason) => Some(reason),
        }
    }
}

/// Result of scraping one retailer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScrapeOutcome {
    /// Price and URL were retrieved. Persistence is tracked separately.
    Success {
        url: String,
        price: Decimal,
        persistence: Persistence,
    },
    /// The retailer has no listing for the search term.
    NotFound,
    /// No browser session could be acquired.
    InitializationFailed { reason: String },
    /// The tooling failed while locating or reading the listing.
    ExtractionFailed { cause: FailureCause },
}

impl ScrapeOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short tag for tables and logs.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NotFound => "not_found",
            Self::InitializationFailed { .. } => "initialization_failed",
            Self::ExtractionFailed { .. } => "extraction_failed",
        }
    }
}

/// Outcome for one retailer, with the retailer name for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetailerOutcome {
    pub retailer_name: String,
    pub outcome: ScrapeOutcome,
}

/// Outcomes of one run, keyed by retailer identity.
///
/// Retailers without a bound extractor have no entry. An empty map is a valid result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub product_id: ProductId,
    pub outcomes: BTreeMap<RetailerId, RetailerOutcome>,
}

impl ScrapeReport {
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            outcomes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, retailer_id: RetailerId, outcome: RetailerOutcome) {
        self.outcomes.insert(retailer_id, outcome);
    }

    pub fn get(&self, retailer_id: RetailerId) -> Option<&ScrapeOutcome> {
        self.outcomes.get(&retailer_id).map(|o| &o.outcome)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of retailers that yielded a price.
    pub fn success_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|o| o.outcome.is_success())
            .count()
    }
}
