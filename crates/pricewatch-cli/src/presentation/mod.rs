//! Shared CLI presentation utilities.
//!
//! Format-only: no domain transforms.

pub mod report;
pub mod tables;

pub use report::{outcome_detail, print_report};
pub use tables::{format_optional, format_price, print_separator, truncate_string};
