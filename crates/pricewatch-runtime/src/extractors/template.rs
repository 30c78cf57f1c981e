//! Extractor driven by an [`ExtractorDefinition`].

use async_trait::async_trait;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use pricewatch_core::{BrowserSession, Extractor, ExtractorError, parse_price_text};

use super::definitions::{DefinitionError, ExtractorDefinition, QUERY_PLACEHOLDER};

/// Searches a retailer through its search page and reads the price with CSS selectors.
///
/// `locate` loads the search page, follows the first product link and leaves
/// the product page loaded for `extract_price`.
#[derive(Debug)]
pub struct TemplateExtractor {
    name: String,
    search_url: String,
    product_link: Selector,
    price: Selector,
    price_attribute: Option<String>,
}

impl TemplateExtractor {
    /// Validate and compile a definition.
    pub fn compile(definition: &ExtractorDefinition) -> Result<Self, DefinitionError> {
        let retailer = definition.retailer.trim();
        if retailer.is_empty() {
            return Err(DefinitionError::EmptyRetailer);
        }

        if !definition.search_url.contains(QUERY_PLACEHOLDER) {
            return Err(DefinitionError::InvalidSearchUrl {
                retailer: retailer.to_string(),
                reason: format!("missing {QUERY_PLACEHOLDER} placeholder"),
            });
        }
        Url::parse(&definition.search_url.replace(QUERY_PLACEHOLDER, "probe")).map_err(|e| {
            DefinitionError::InvalidSearchUrl {
                retailer: retailer.to_string(),
                reason: e.to_string(),
            }
        })?;

        let compile = |field: &'static str, selector: &str| {
            Selector::parse(selector).map_err(|e| DefinitionError::InvalidSelector {
                retailer: retailer.to_string(),
                field,
                reason: e.to_string(),
            })
        };

        Ok(Self {
            name: retailer.to_string(),
            search_url: definition.search_url.clone(),
            product_link: compile("product_link_selector", &definition.product_link_selector)?,
            price: compile("price_selector", &definition.price_selector)?,
            price_attribute: definition
                .price_attribute
                .as_deref()
                .map(str::trim)
                .filter(|attr| !attr.is_empty())
                .map(str::to_string),
        })
    }

    /// Search page URL for `term`.
    pub fn search_url_for(&self, term: &str) -> String {
        self.search_url
            .replace(QUERY_PLACEHOLDER, &urlencoding::encode(term.trim()))
    }

    /// First non-empty `href` among the elements matching the link selector.
    fn product_href(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.product_link)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    }

    /// First non-empty price text, read from the element text or the configured attribute.
    fn price_text(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document.select(&self.price).find_map(|element| {
            let text = match &self.price_attribute {
                Some(attr) => element.value().attr(attr)?.to_string(),
                None => element.text().collect::<String>(),
            };
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        })
    }
}

#[async_trait]
impl Extractor for TemplateExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn locate(
        &self,
        session: &mut BrowserSession,
        search_term: &str,
    ) -> Result<Option<String>, ExtractorError> {
        let search_url = self.search_url_for(search_term);
        let page = session.goto(&search_url).await?;

        let Some(link) = self.product_href(&page.html) else {
            debug!(retailer = %self.name, search_url = %search_url, "No product link on search page");
            return Ok(None);
        };
        let base = Url::parse(&page.url)
            .map_err(|e| ExtractorError::Navigation(format!("bad page URL {}: {e}", page.url)))?;
        let product_url = base
            .join(&link)
            .map_err(|e| ExtractorError::Extraction(format!("bad product link {link:?}: {e}")))?
            .to_string();

        session.goto(&product_url).await?;
        Ok(Some(product_url))
    }

    async fn extract_price(
        &self,
        session: &mut BrowserSession,
    ) -> Result<Option<Decimal>, ExtractorError> {
        let page = session
            .page()
            .ok_or_else(|| ExtractorError::Extraction("no product page loaded".to_string()))?;

        let Some(text) = self.price_text(&page.html) else {
            debug!(retailer = %self.name, url = %page.url, "Price selector did not match");
            return Ok(None);
        };
        Ok(parse_price_text(&text))
    }
}
