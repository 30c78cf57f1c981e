//! Main CLI parser and top-level argument handling.
//!
//! Global options double as environment variables so a `.env` file can
//! configure a deployment.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for tracking product prices across retailers.
#[derive(Parser)]
#[command(name = "pricewatch")]
#[command(about = "Track product prices across retailers")]
#[command(version)]
pub struct Cli {
    /// Database file (defaults to the user data directory)
    #[arg(long = "db", env = "PRICEWATCH_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Extractor definitions file (JSON)
    #[arg(long = "extractors", env = "PRICEWATCH_EXTRACTORS", global = true)]
    pub extractors: Option<PathBuf>,

    /// Chromium/Chrome executable used for scraping
    #[arg(long = "chrome", env = "PRICEWATCH_CHROME", global = true)]
    pub chrome: Option<PathBuf>,

    /// Maximum simultaneous browser sessions
    #[arg(long = "concurrency", env = "PRICEWATCH_CONCURRENCY", global = true)]
    pub concurrency: Option<usize>,

    /// Per-retailer time budget in seconds
    #[arg(long = "timeout-secs", env = "PRICEWATCH_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
