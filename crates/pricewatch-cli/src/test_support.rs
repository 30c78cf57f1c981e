//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use pricewatch_core::settings::BrowserConfig;
use pricewatch_core::{
    BrowserDriver, BrowserError, BrowserHandle, BrowserSession, Extractor, ExtractorError,
    ExtractorRegistry, PageSnapshot, Product, ScrapeSettings,
};
use pricewatch_db::TestDb;

use crate::bootstrap::{CliContext, bootstrap_with};

pub fn product(name: &str, search_name: Option<&str>, code: Option<&str>) -> Product {
    let now = Utc::now();
    Product {
        id: 1,
        name: name.to_string(),
        search_name: search_name.map(str::to_string),
        code: code.map(str::to_string),
        image: None,
        url: None,
        created_at: now,
        updated_at: now,
    }
}

/// Driver that answers every navigation with an empty page.
#[derive(Default)]
pub struct StaticDriver {
    next_id: AtomicU64,
}

#[async_trait]
impl BrowserDriver for StaticDriver {
    async fn launch(
        &self,
        _config: &BrowserConfig,
        label: &str,
    ) -> Result<BrowserHandle, BrowserError> {
        Ok(BrowserHandle::new(
            self.next_id.fetch_add(1, Ordering::SeqCst),
            label,
            0,
        ))
    }

    async fn navigate(
        &self,
        _handle: &BrowserHandle,
        url: &str,
    ) -> Result<PageSnapshot, BrowserError> {
        Ok(PageSnapshot::new(url, ""))
    }

    async fn terminate(&self, _handle: &BrowserHandle) {}
}

/// Always finds the product at one URL with one price.
pub struct FixedPriceExtractor {
    url: String,
    price: Decimal,
}

impl FixedPriceExtractor {
    pub fn new(url: &str, price: Decimal) -> Self {
        Self {
            url: url.to_string(),
            price,
        }
    }
}

#[async_trait]
impl Extractor for FixedPriceExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn locate(
        &self,
        session: &mut BrowserSession,
        _search_term: &str,
    ) -> Result<Option<String>, ExtractorError> {
        session.goto(&self.url).await?;
        Ok(Some(self.url.clone()))
    }

    async fn extract_price(
        &self,
        _session: &mut BrowserSession,
    ) -> Result<Option<Decimal>, ExtractorError> {
        Ok(Some(self.price))
    }
}

pub async fn context_with(registry: ExtractorRegistry) -> CliContext {
    let db = TestDb::new().await.unwrap();
    bootstrap_with(
        &db.repos(),
        registry,
        Arc::new(StaticDriver::default()),
        ScrapeSettings::default(),
    )
    .unwrap()
}

pub async fn empty_context() -> CliContext {
    context_with(ExtractorRegistry::builder().build()).await
}
