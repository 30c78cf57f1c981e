//! Retailer extractors.
//!
//! Retailers are described declaratively in a JSON definitions file and
//! served by [`TemplateExtractor`].

mod definitions;
mod template;

pub use definitions::{
    DefinitionError, ExtractorDefinition, QUERY_PLACEHOLDER, load_definitions, parse_definitions,
    register_definitions,
};
pub use template::TemplateExtractor;
