//! Repository implementations using `SQLite`.
//!
//! These implementations encapsulate all SQL queries and database access.
//! The `SqlitePool` is confined to this module and never exposed through
//! the port trait signatures.

mod row_mappers;
mod sqlite_catalog_repository;
mod sqlite_price_repository;

pub use sqlite_catalog_repository::SqliteCatalogRepository;
pub use sqlite_price_repository::SqlitePriceRepository;
