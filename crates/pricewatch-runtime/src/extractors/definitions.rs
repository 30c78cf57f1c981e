//! Declarative retailer definitions loaded from JSON.
//!
//! ```json
//! {
//!   "extractors": [
//!     {
//!       "retailer": "Shop A",
//!       "search_url": "https://shop-a.example/search?q={query}",
//!       "product_link_selector": "ul.results a.product",
//!       "price_selector": "span.price"
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use pricewatch_core::{Extractor, ExtractorRegistryBuilder};

use super::template::TemplateExtractor;

/// Placeholder substituted with the URL-encoded search term.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// One retailer's search page and CSS selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorDefinition {
    /// Retailer display name; normalized into the registry key.
    pub retailer: String,
    /// Search page URL containing `{query}`.
    pub search_url: String,
    /// Selector over the search page; the first match with an `href` is the product link.
    pub product_link_selector: String,
    /// Selector over the product page; the first match with text is the price.
    pub price_selector: String,
    /// Read the price from this attribute instead of the element text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_attribute: Option<String>,
}

#[derive(Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    extractors: Vec<ExtractorDefinition>,
}

/// Errors from loading or compiling definitions.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definitions file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Definition for '{retailer}': invalid {field}: {reason}")]
    InvalidSelector {
        retailer: String,
        field: &'static str,
        reason: String,
    },

    #[error("Definition for '{retailer}': invalid search URL: {reason}")]
    InvalidSearchUrl { retailer: String, reason: String },

    #[error("Definition has an empty retailer name")]
    EmptyRetailer,
}

/// Parse definitions from JSON text.
pub fn parse_definitions(json: &str) -> Result<Vec<ExtractorDefinition>, DefinitionError> {
    let file: DefinitionsFile = serde_json::from_str(json)?;
    Ok(file.extractors)
}

/// Load definitions from a JSON file.
pub fn load_definitions(path: &Path) -> Result<Vec<ExtractorDefinition>, DefinitionError> {
    let json = std::fs::read_to_string(path).map_err(|source| DefinitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_definitions(&json)
}

/// Compile every definition and register it on `builder`.
///
/// Fails on the first definition that does not compile, so a broken file
/// is reported at startup rather than per scrape.
pub fn register_definitions(
    mut builder: ExtractorRegistryBuilder,
    definitions: &[ExtractorDefinition],
) -> Result<ExtractorRegistryBuilder, DefinitionError> {
    for definition in definitions {
        let extractor = TemplateExtractor::compile(definition)?;
        builder = builder.register_instance(
            &definition.retailer,
            Arc::new(extractor) as Arc<dyn Extractor>,
        );
    }
    info!(count = definitions.len(), "Registered template extractors");
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_core::ExtractorRegistry;

    const SAMPLE: &str = r#"{
        "extractors": [
            {
                "retailer": "Shop A",
                "search_url": "https://shop-a.example/search?q={query}",
                "product_link_selector": "a.hit",
                "price_selector": ".price"
            },
            {
                "retailer": "Super-Mart",
                "search_url": "https://mart.example/s/{query}",
                "product_link_selector": "div.tile > a",
                "price_selector": "meta[itemprop=price]",
                "price_attribute": "content"
            }
        ]
    }"#;

    #[test]
    fn test_parse_definitions() {
        let defs = parse_definitions(SAMPLE).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[1].retailer, "Super-Mart");
        assert_eq!(defs[0].price_attribute, None);
        assert_eq!(defs[1].price_attribute.as_deref(), Some("content"));
    }

    #[test]
    fn test_empty_file_has_no_definitions() {
        assert!(parse_definitions("{}").unwrap().is_empty());
        assert!(matches!(
            parse_definitions("not json"),
            Err(DefinitionError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractors.json");
        std::fs::write(&path, SAMPLE).unwrap();

        assert_eq!(load_definitions(&path).unwrap().len(), 2);
        assert!(matches!(
            load_definitions(&dir.path().join("missing.json")),
            Err(DefinitionError::Io { .. })
        ));
    }

    #[test]
    fn test_register_under_normalized_keys() {
        let defs = parse_definitions(SAMPLE).unwrap();
        let registry = register_definitions(ExtractorRegistry::builder(), &defs)
            .unwrap()
            .build();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("SHOP A"));
        assert!(registry.contains("supermart"));
    }

    #[test]
    fn test_bad_selector_fails_registration() {
        let defs = vec![ExtractorDefinition {
            retailer: "Shop A".to_string(),
            search_url: "https://shop-a.example/?q={query}".to_string(),
            product_link_selector: "a..hit".to_string(),
            price_selector: ".price".to_string(),
            price_attribute: None,
        }];

        let result = register_definitions(ExtractorRegistry::builder(), &defs);
        assert!(matches!(
            result,
            Err(DefinitionError::InvalidSelector {
                field: "product_link_selector",
                ..
            })
        ));
    }
}
