//! Small pure helpers shared by extractors and adapters.

mod price_text;

pub use price_text::parse_price_text;
