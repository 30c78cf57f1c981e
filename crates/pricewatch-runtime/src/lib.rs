//! Process-level adapters for pricewatch: a headless Chromium
//! [`BrowserDriver`](pricewatch_core::BrowserDriver) and the template
//! extractors configured from a definitions file.

#![deny(unsafe_code)]

pub mod browser;
pub mod extractors;

pub use browser::{HeadlessChromeDriver, locate_browser, shutdown_child};
pub use extractors::{
    DefinitionError, ExtractorDefinition, TemplateExtractor, load_definitions, parse_definitions,
    register_definitions,
};
