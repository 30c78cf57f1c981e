//! Shared helpers for pricewatch-db integration tests.

pub mod fakes;
