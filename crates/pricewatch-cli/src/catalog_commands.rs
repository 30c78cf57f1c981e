//! Catalog management subcommands.

use std::str::FromStr;

use clap::Subcommand;
use rust_decimal::Decimal;

use pricewatch_core::{ProductId, RetailerId, parse_price_text};

/// Product subcommands.
#[derive(Subcommand)]
pub enum ProductCommand {
    /// Add a product
    Add {
        /// Display name
        name: String,
        /// Alternate name used when searching retailers
        #[arg(long)]
        search_name: Option<String>,
        /// Product code (EAN, SKU, ...)
        #[arg(long)]
        code: Option<String>,
        /// Image URL
        #[arg(long)]
        image: Option<String>,
        /// Reference URL
        #[arg(long)]
        url: Option<String>,
    },

    /// List all products
    List,

    /// Show one product with its current prices
    Show {
        /// Product ID
        id: ProductId,
    },

    /// Search products by name or code
    Search {
        /// Text contained in the name or code
        query: String,
    },

    /// Update a product; omitted fields keep their value
    Update {
        /// Product ID
        id: ProductId,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// New search name (empty string clears it)
        #[arg(long)]
        search_name: Option<String>,
        /// New product code
        #[arg(long)]
        code: Option<String>,
        /// New image URL
        #[arg(long)]
        image: Option<String>,
        /// New reference URL
        #[arg(long)]
        url: Option<String>,
    },

    /// Remove a product with its prices and history
    Remove {
        /// Product ID
        id: ProductId,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Retailer subcommands.
#[derive(Subcommand)]
pub enum RetailerCommand {
    /// Add a retailer
    Add {
        /// Retailer name; extractors bind to it by name
        name: String,
        /// Storefront URL
        #[arg(long)]
        url: Option<String>,
        /// Logo URL
        #[arg(long)]
        logo: Option<String>,
    },

    /// List retailers
    List,
}

/// Manual price subcommands.
#[derive(Subcommand)]
pub enum PriceCommand {
    /// Record the current price of a product at a retailer
    Set {
        /// Product ID
        product_id: ProductId,
        /// Retailer ID
        retailer_id: RetailerId,
        /// Price, e.g. 12.50 or "12,50 €"
        #[arg(value_parser = parse_price_arg)]
        price: Decimal,
        /// Product page URL
        #[arg(long, default_value = "")]
        url: String,
    },
}

/// Accept plain decimals and formatted price text.
pub fn parse_price_arg(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s.trim())
        .ok()
        .or_else(|| parse_price_text(s))
        .ok_or_else(|| format!("not a price: {s:?}"))
}
