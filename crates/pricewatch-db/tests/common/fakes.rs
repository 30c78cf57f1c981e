//! In-process stand-ins for the browser and the retailer extractors.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use pricewatch_core::{
    BrowserConfig, BrowserDriver, BrowserError, BrowserHandle, BrowserSession, Extractor,
    ExtractorError, PageSnapshot,
};

/// Driver that serves an empty page for every URL.
#[derive(Default)]
pub struct FakeDriver {
    next_id: AtomicU64,
    live: AtomicUsize,
    terminations: AtomicUsize,
}

impl FakeDriver {
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    // Allow unused: not every test binary checks terminations
    #[allow(dead_code)]
    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for FakeDriver {
    async fn launch(
        &self,
        _config: &BrowserConfig,
        label: &str,
    ) -> Result<BrowserHandle, BrowserError> {
        self.live.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(BrowserHandle::new(id, label, 0))
    }

    async fn navigate(
        &self,
        _handle: &BrowserHandle,
        url: &str,
    ) -> Result<PageSnapshot, BrowserError> {
        Ok(PageSnapshot::new(url, "<html></html>"))
    }

    async fn terminate(&self, _handle: &BrowserHandle) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.terminations.fetch_add(1, Ordering::SeqCst);
    }
}

enum Script {
    Listing { url: String, price: Mutex<Decimal> },
    Hang,
}

/// Extractor whose behaviour is fixed up front.
pub struct StubExtractor {
    name: String,
    script: Script,
}

impl StubExtractor {
    pub fn listing(name: &str, url: &str, price: Decimal) -> Self {
        Self {
            name: name.to_string(),
            script: Script::Listing {
                url: url.to_string(),
                price: Mutex::new(price),
            },
        }
    }

    /// Never finishes locating; only a timeout ends it.
    pub fn hanging(name: &str) -> Self {
        Self {
            name: name.to_string(),
            script: Script::Hang,
        }
    }

    /// Change the price reported on the next extraction.
    // Allow unused: only the rerun scenario reprices
    #[allow(dead_code)]
    pub fn reprice(&self, new_price: Decimal) {
        if let Script::Listing { price, .. } = &self.script {
            *price.lock().unwrap() = new_price;
        }
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn locate(
        &self,
        session: &mut BrowserSession,
        _search_term: &str,
    ) -> Result<Option<String>, ExtractorError> {
        match &self.script {
            Script::Listing { url, .. } => {
                session.goto(url).await?;
                Ok(Some(url.clone()))
            }
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }

    async fn extract_price(
        &self,
        _session: &mut BrowserSession,
    ) -> Result<Option<Decimal>, ExtractorError> {
        match &self.script {
            Script::Listing { price, .. } => Ok(Some(*price.lock().unwrap())),
            Script::Hang => Ok(None),
        }
    }
}
