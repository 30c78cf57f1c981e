//! Core domain types, port definitions and services for pricewatch.
//!
//! Pricewatch tracks product prices across retailers. This crate holds the
//! scraping orchestration engine: the retailer-to-extractor registry, browser
//! session lifecycle, the price recorder and the orchestrator that ties them
//! together. Storage and browser automation are reached only through the
//! traits in [`ports`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod scraping;
pub mod services;
pub mod settings;
pub mod utils;

// Re-export commonly used types for convenience
pub use domain::{
    ExtractionResult, FailureCause, HistoryEntry, NewProduct, NewRetailer, Persistence,
    PriceHistoryPoint, PriceObservation, Product, ProductId, ProductRetailerAssociation,
    Retailer, RetailerId, RetailerListing, RetailerOutcome, ScrapeOutcome, ScrapeReport,
    resolve_search_term,
};
pub use paths::{PathError, data_root, database_path, extractors_path};
pub use ports::{
    BrowserDriver, BrowserError, BrowserHandle, CatalogRepository, CoreError, PageSnapshot,
    PriceStore, Repos, RepositoryError,
};
pub use scraping::{
    BoundExtractor, BrowserSession, Extractor, ExtractorError, ExtractorFactory,
    ExtractorRegistry, ExtractorRegistryBuilder, SessionError, SessionState, retailer_key,
};
pub use services::{
    CatalogService, PersistenceError, PriceRecorder, ProductRun, RecordReceipt, ScrapeError,
    ScrapeOrchestrator,
};
pub use settings::{
    BrowserConfig, DEFAULT_MAX_CONCURRENT_SESSIONS, ScrapeSettings, SettingsError, Viewport,
    validate_settings,
};
pub use utils::parse_price_text;
