//! `SQLite` adapters for the pricewatch catalog and price-store ports.
//!
//! [`setup_database`] opens the database and applies the schema;
//! [`CoreFactory`] turns a pool into the `Repos` container the core services
//! consume.

#![deny(unsafe_code)]

pub mod factory;
pub mod repositories;
pub mod setup;

// Re-export factory for convenient access
pub use factory::CoreFactory;

// Re-export TestDb for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub use factory::TestDb;

// Re-export repository implementations
pub use repositories::{SqliteCatalogRepository, SqlitePriceRepository};

// Re-export setup functions for convenient access
pub use setup::setup_database;
#[cfg(any(test, feature = "test-utils"))]
pub use setup::setup_test_database;
