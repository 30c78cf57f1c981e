//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx` types in any signature
//! - No process/filesystem implementation details
//! - Repository traits are minimal; reconciliation logic lives in services

pub mod browser;
pub mod catalog_repository;
pub mod price_store;

use std::sync::Arc;
use thiserror::Error;

pub use browser::{BrowserDriver, BrowserError, BrowserHandle, PageSnapshot};
pub use catalog_repository::CatalogRepository;
pub use price_store::PriceStore;

/// Container for all repository trait objects.
///
/// Lets adapters wire repositories without coupling to concrete implementations.
#[derive(Clone)]
pub struct Repos {
    /// Products and retailers.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Current prices and price history.
    pub prices: Arc<dyn PriceStore>,
}

impl Repos {
    /// Create a new Repos container.
    pub fn new(catalog: Arc<dyn CatalogRepository>, prices: Arc<dyn PriceStore>) -> Self {
        Self { catalog, prices }
    }
}

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (e.g., sqlx errors)
/// and provides a clean interface for services to handle storage failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// The requested entity was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same identifier already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Storage backend error (database, filesystem, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A constraint was violated (e.g., foreign key, unique constraint).
    #[error("Constraint violation: {0}")]
    Constraint(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters map this to their own error types (CLI exit codes, HTTP statuses).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A scrape run failed as a whole.
    #[error(transparent)]
    Scrape(#[from] crate::services::ScrapeError),

    /// Recording a price failed.
    #[error(transparent)]
    Persistence(#[from] crate::services::PersistenceError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),
}
