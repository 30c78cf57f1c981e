//! Domain types for products, retailers, prices and scrape outcomes.
//!
//! These are pure data types with no infrastructure dependencies.

mod outcome;
mod price;
mod product;
mod retailer;

pub use outcome::{FailureCause, Persistence, RetailerOutcome, ScrapeOutcome, ScrapeReport};
pub use price::{
    ExtractionResult, HistoryEntry, PriceHistoryPoint, PriceObservation,
    ProductRetailerAssociation, RetailerListing,
};
pub use product::{NewProduct, Product, ProductId, resolve_search_term};
pub use retailer::{NewRetailer, Retailer, RetailerId};
