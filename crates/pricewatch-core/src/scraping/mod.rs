//! Scraping building blocks: browser sessions, the extractor capability and
//! the retailer-to-extractor registry.

mod extractor;
mod registry;
mod session;

#[cfg(test)]
pub(crate) mod test_utils;

pub use extractor::{Extractor, ExtractorError};
pub use registry::{
    BoundExtractor, ExtractorFactory, ExtractorRegistry, ExtractorRegistryBuilder, retailer_key,
};
pub use session::{BrowserSession, SessionError, SessionState};
