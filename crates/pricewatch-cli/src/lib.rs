//! `pricewatch` command-line adapter: argument parsing, the composition
//! root and terminal output.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by the binary only
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod catalog_commands;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap, bootstrap_with, build_registry};
pub use catalog_commands::{PriceCommand, ProductCommand, RetailerCommand};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;
