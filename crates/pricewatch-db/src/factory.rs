//! Composition utilities for wiring the core services to `SQLite` backends.
//!
//! Construction only; no domain logic lives here.

use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

use pricewatch_core::Repos;

use crate::repositories::{SqliteCatalogRepository, SqlitePriceRepository};
use crate::setup::setup_database;

/// Factory for creating repository instances with `SQLite` backends.
pub struct CoreFactory;

impl CoreFactory {
    /// Open the database at `db_path`, applying the schema if needed.
    pub async fn create_pool(db_path: &Path) -> anyhow::Result<SqlitePool> {
        setup_database(db_path).await
    }

    /// Build all `SQLite` repositories from a pool.
    ///
    /// Returns the trait-object container the core services are built from.
    pub fn build_repos(pool: SqlitePool) -> Repos {
        Repos::new(
            Arc::new(SqliteCatalogRepository::new(pool.clone())),
            Arc::new(SqlitePriceRepository::new(pool)),
        )
    }

    /// Create a catalog repository from a pool.
    pub fn catalog_repository(pool: SqlitePool) -> Arc<SqliteCatalogRepository> {
        Arc::new(SqliteCatalogRepository::new(pool))
    }

    /// Create a price repository from a pool.
    pub fn price_repository(pool: SqlitePool) -> Arc<SqlitePriceRepository> {
        Arc::new(SqlitePriceRepository::new(pool))
    }
}

/// Test database helper for integration tests.
///
/// An in-memory `SQLite` database with the production schema applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository container backed by this database.
    pub fn repos(&self) -> Repos {
        CoreFactory::build_repos(self.pool.clone())
    }

    pub fn catalog_repository(&self) -> Arc<SqliteCatalogRepository> {
        CoreFactory::catalog_repository(self.pool.clone())
    }

    pub fn price_repository(&self) -> Arc<SqlitePriceRepository> {
        CoreFactory::price_repository(self.pool.clone())
    }
}
