//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn <action>(ctx: &CliContext, ...) -> Result<_>`
//! - Thin wrappers that validate CLI-specific input, call the core services
//!   through the context and format output for the terminal
//!
//! Handlers should NOT touch repositories or hold business logic.

pub mod extractors;
pub mod paths;
pub mod prices;
pub mod product;
pub mod retailer;
pub mod scrape;
