//! Main commands enum and primary subcommands.

use clap::Subcommand;

use crate::catalog_commands::{PriceCommand, ProductCommand, RetailerCommand};
use pricewatch_core::ProductId;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage products
    Product {
        #[command(subcommand)]
        command: ProductCommand,
    },

    /// Manage retailers
    Retailer {
        #[command(subcommand)]
        command: RetailerCommand,
    },

    /// Record prices by hand
    Price {
        #[command(subcommand)]
        command: PriceCommand,
    },

    /// Scrape current prices for one product or the whole catalog
    Scrape {
        /// Product ID to scrape
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<ProductId>,
        /// Scrape every product in the catalog
        #[arg(long)]
        all: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current price of a product at each retailer
    Prices {
        /// Product ID
        id: ProductId,
    },

    /// Show the price history of a product, newest first
    History {
        /// Product ID
        id: ProductId,
        /// Show at most this many entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List retailers that have a configured extractor
    Extractors,

    /// Show resolved data paths
    Paths,
}
