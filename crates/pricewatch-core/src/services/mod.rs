//! Core services - the application's business logic layer.
//!
//! Services orchestrate between ports (trait interfaces) and domain logic.
//! They never know about concrete implementations.

mod catalog_service;
mod price_recorder;
mod scrape_orchestrator;

pub use catalog_service::CatalogService;
pub use price_recorder::{PersistenceError, PriceRecorder, RecordReceipt};
pub use scrape_orchestrator::{ProductRun, ScrapeError, ScrapeOrchestrator};
