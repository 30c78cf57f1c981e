//! Test doubles for the scraping pipeline: a counting browser driver,
//! scripted extractors and in-memory repositories.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::extractor::{Extractor, ExtractorError};
use super::session::BrowserSession;
use crate::domain::{
    HistoryEntry, NewProduct, NewRetailer, PriceHistoryPoint, Product, ProductId,
    ProductRetailerAssociation, Retailer, RetailerId, RetailerListing,
};
use crate::ports::{
    BrowserDriver, BrowserError, BrowserHandle, CatalogRepository, PageSnapshot, PriceStore,
    RepositoryError,
};
use crate::settings::BrowserConfig;

pub fn retailer(id: RetailerId, name: &str) -> Retailer {
    let now = Utc::now();
    Retailer {
        id,
        name: name.to_string(),
        logo: None,
        url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn product(id: ProductId, name: &str, search_name: Option<&str>) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: name.to_string(),
        search_name: search_name.map(str::to_string),
        code: None,
        image: None,
        url: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Browser driver
// ============================================================================

/// Browser driver that counts launches, navigations and terminations.
#[derive(Default)]
pub struct CountingDriver {
    next_id: AtomicU64,
    launches: AtomicUsize,
    navigations: AtomicUsize,
    terminations: AtomicUsize,
    live: Mutex<HashSet<u64>>,
    peak_live: AtomicUsize,
    launch_failure: Option<String>,
    launch_failure_for: Option<String>,
    launch_delay: Option<Duration>,
}

impl CountingDriver {
    pub fn failing_launch(msg: &str) -> Self {
        Self {
            launch_failure: Some(msg.to_string()),
            ..Self::default()
        }
    }

    /// Fail launches whose label equals `label` only.
    pub fn failing_launch_for(label: &str) -> Self {
        Self {
            launch_failure_for: Some(label.to_string()),
            ..Self::default()
        }
    }

    pub fn slow_launch(delay: Duration) -> Self {
        Self {
            launch_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn terminations(&self) -> usize {
        self.terminations.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn peak_live(&self) -> usize {
        self.peak_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for CountingDriver {
    async fn launch(
        &self,
        _config: &BrowserConfig,
        label: &str,
    ) -> Result<BrowserHandle, BrowserError> {
        if let Some(delay) = self.launch_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(msg) = &self.launch_failure {
            return Err(BrowserError::LaunchFailed(msg.clone()));
        }
        if self.launch_failure_for.as_deref() == Some(label) {
            return Err(BrowserError::ResourceExhausted(format!("no slot for {label}")));
        }

        self.launches.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let live = {
            let mut live = self.live.lock().unwrap();
            live.insert(id);
            live.len()
        };
        self.peak_live.fetch_max(live, Ordering::SeqCst);
        Ok(BrowserHandle::new(id, label, 0))
    }

    async fn navigate(
        &self,
        handle: &BrowserHandle,
        url: &str,
    ) -> Result<PageSnapshot, BrowserError> {
        if !self.live.lock().unwrap().contains(&handle.id) {
            return Err(BrowserError::UnknownHandle(handle.id));
        }
        self.navigations.fetch_add(1, Ordering::SeqCst);
        Ok(PageSnapshot::new(
            url,
            format!("<html><body>{url}</body></html>"),
        ))
    }

    async fn terminate(&self, handle: &BrowserHandle) {
        self.terminations.fetch_add(1, Ordering::SeqCst);
        self.live.lock().unwrap().remove(&handle.id);
    }
}

// ============================================================================
// Extractors
// ============================================================================

#[derive(Debug, Clone)]
enum Script {
    Priced { url: String, price: Decimal },
    NoPrice { url: String },
    NotFound,
    LocateFails(ExtractorError),
    PriceFails { url: String, err: ExtractorError },
    LocateHangs,
    PriceHangs { url: String },
    LocatePanics,
    PricePanics { url: String },
}

/// Extractor whose behaviour is fixed at construction.
#[derive(Debug)]
pub struct ScriptedExtractor {
    name: String,
    script: Script,
    terms: Mutex<Vec<String>>,
    extract_calls: AtomicUsize,
    finished: AtomicBool,
}

impl ScriptedExtractor {
    fn new(name: &str, script: Script) -> Self {
        Self {
            name: name.to_string(),
            script,
            terms: Mutex::new(Vec::new()),
            extract_calls: AtomicUsize::new(0),
            finished: AtomicBool::new(false),
        }
    }

    pub fn priced(name: &str, url: &str, price: Decimal) -> Self {
        Self::new(
            name,
            Script::Priced {
                url: url.to_string(),
                price,
            },
        )
    }

    pub fn no_price(name: &str, url: &str) -> Self {
        Self::new(name, Script::NoPrice { url: url.to_string() })
    }

    pub fn not_found(name: &str) -> Self {
        Self::new(name, Script::NotFound)
    }

    pub fn locate_fails(name: &str, err: ExtractorError) -> Self {
        Self::new(name, Script::LocateFails(err))
    }

    pub fn price_fails(name: &str, url: &str, err: ExtractorError) -> Self {
        Self::new(
            name,
            Script::PriceFails {
                url: url.to_string(),
                err,
            },
        )
    }

    pub fn locate_hangs(name: &str) -> Self {
        Self::new(name, Script::LocateHangs)
    }

    pub fn price_hangs(name: &str, url: &str) -> Self {
        Self::new(name, Script::PriceHangs { url: url.to_string() })
    }

    pub fn locate_panics(name: &str) -> Self {
        Self::new(name, Script::LocatePanics)
    }

    pub fn price_panics(name: &str, url: &str) -> Self {
        Self::new(name, Script::PricePanics { url: url.to_string() })
    }

    /// Search terms passed to `locate`, in call order.
    pub fn terms(&self) -> Vec<String> {
        self.terms.lock().unwrap().clone()
    }

    pub fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    /// Whether a call ran to completion rather than being dropped mid-flight.
    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

async fn hang() {
    tokio::time::sleep(Duration::from_secs(3600)).await;
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn locate(
        &self,
        session: &mut BrowserSession,
        search_term: &str,
    ) -> Result<Option<String>, ExtractorError> {
        self.terms.lock().unwrap().push(search_term.to_string());
        let url = match &self.script {
            Script::NotFound => return Ok(None),
            Script::LocateFails(err) => return Err(err.clone()),
            Script::LocateHangs => {
                hang().await;
                self.finished.store(true, Ordering::SeqCst);
                return Ok(None);
            }
            Script::LocatePanics => panic!("selector exploded"),
            Script::Priced { url, .. }
            | Script::NoPrice { url }
            | Script::PriceFails { url, .. }
            | Script::PriceHangs { url }
            | Script::PricePanics { url } => url.clone(),
        };
        session.goto(&url).await?;
        Ok(Some(url))
    }

    async fn extract_price(
        &self,
        session: &mut BrowserSession,
    ) -> Result<Option<Decimal>, ExtractorError> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        assert!(session.page().is_some(), "extract_price called before locate");
        match &self.script {
            Script::Priced { price, .. } => Ok(Some(*price)),
            Script::PriceFails { err, .. } => Err(err.clone()),
            Script::PriceHangs { .. } => {
                hang().await;
                self.finished.store(true, Ordering::SeqCst);
                Ok(None)
            }
            Script::PricePanics { .. } => panic!("price parser exploded"),
            _ => Ok(None),
        }
    }
}

// ============================================================================
// Repositories
// ============================================================================

/// In-memory catalog.
#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<Vec<Product>>,
    retailers: Mutex<Vec<Retailer>>,
    next_id: AtomicU64,
    fail_retailers: AtomicBool,
}

impl MemoryCatalog {
    pub fn with_retailers(retailers: Vec<Retailer>) -> Self {
        let catalog = Self::default();
        *catalog.retailers.lock().unwrap() = retailers;
        catalog.next_id.store(1000, Ordering::SeqCst);
        catalog
    }

    pub fn add_product(&self, product: Product) {
        self.products.lock().unwrap().push(product);
    }

    pub fn fail_list_retailers(&self) {
        self.fail_retailers.store(true, Ordering::SeqCst);
    }

    fn next_id(&self) -> i64 {
        i64::try_from(self.next_id.fetch_add(1, Ordering::SeqCst)).unwrap() + 1
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn search_products(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let query = query.to_lowercase();
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.code.as_deref().is_some_and(|c| c.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let stored = Product {
            id: self.next_id(),
            name: product.name.clone(),
            search_name: product.search_name.clone(),
            code: product.code.clone(),
            image: product.image.clone(),
            url: product.url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_product(
        &self,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let mut products = self.products.lock().unwrap();
        let existing = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;
        existing.name.clone_from(&product.name);
        existing.search_name.clone_from(&product.search_name);
        existing.code.clone_from(&product.code);
        existing.image.clone_from(&product.image);
        existing.url.clone_from(&product.url);
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        Ok(())
    }

    async fn list_retailers(&self) -> Result<Vec<Retailer>, RepositoryError> {
        if self.fail_retailers.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("database is locked".to_string()));
        }
        Ok(self.retailers.lock().unwrap().clone())
    }

    async fn get_retailer(&self, id: RetailerId) -> Result<Retailer, RepositoryError> {
        self.retailers
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("retailer {id}")))
    }

    async fn insert_retailer(&self, retailer: &NewRetailer) -> Result<Retailer, RepositoryError> {
        let mut retailers = self.retailers.lock().unwrap();
        if retailers.iter().any(|r| r.name == retailer.name) {
            return Err(RepositoryError::AlreadyExists(retailer.name.clone()));
        }
        let mut stored = self::retailer(self.next_id(), &retailer.name);
        stored.logo.clone_from(&retailer.logo);
        stored.url.clone_from(&retailer.url);
        retailers.push(stored.clone());
        Ok(stored)
    }
}

/// In-memory price store with switchable write failures.
#[derive(Default)]
pub struct MemoryPriceStore {
    associations: Mutex<BTreeMap<(ProductId, RetailerId), ProductRetailerAssociation>>,
    history: Mutex<BTreeMap<(ProductId, RetailerId, NaiveDate), PriceHistoryPoint>>,
    fail_association: AtomicBool,
    fail_history: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryPriceStore {
    pub fn fail_associations(&self) {
        self.fail_association.store(true, Ordering::SeqCst);
    }

    pub fn fail_history(&self) {
        self.fail_history.store(true, Ordering::SeqCst);
    }

    /// Write attempts of either kind.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn association_count(&self) -> usize {
        self.associations.lock().unwrap().len()
    }

    pub fn history_count(&self) -> usize {
        self.history.lock().unwrap().len()
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn upsert_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        price: Decimal,
        url: &str,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_association.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("disk I/O error".to_string()));
        }
        self.associations
            .lock()
            .unwrap()
            .entry((product_id, retailer_id))
            .and_modify(|a| {
                a.price = price;
                a.url = url.to_string();
                a.updated_at = observed_at;
            })
            .or_insert_with(|| ProductRetailerAssociation {
                product_id,
                retailer_id,
                price,
                url: url.to_string(),
                created_at: observed_at,
                updated_at: observed_at,
            });
        Ok(())
    }

    async fn upsert_history_point(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
        observed_on: NaiveDate,
        price: Decimal,
        observed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("history table locked".to_string()));
        }
        self.history
            .lock()
            .unwrap()
            .entry((product_id, retailer_id, observed_on))
            .and_modify(|p| {
                p.price = price;
                p.updated_at = observed_at;
            })
            .or_insert_with(|| PriceHistoryPoint {
                product_id,
                retailer_id,
                observed_on,
                price,
                created_at: observed_at,
                updated_at: observed_at,
            });
        Ok(())
    }

    async fn get_association(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Option<ProductRetailerAssociation>, RepositoryError> {
        Ok(self
            .associations
            .lock()
            .unwrap()
            .get(&(product_id, retailer_id))
            .cloned())
    }

    async fn list_associations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<RetailerListing>, RepositoryError> {
        Ok(self
            .associations
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.product_id == product_id)
            .map(|a| RetailerListing {
                retailer: retailer(a.retailer_id, &format!("retailer-{}", a.retailer_id)),
                association: a.clone(),
            })
            .collect())
    }

    async fn list_history_points(
        &self,
        product_id: ProductId,
        retailer_id: RetailerId,
    ) -> Result<Vec<PriceHistoryPoint>, RepositoryError> {
        Ok(self
            .history
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.product_id == product_id && p.retailer_id == retailer_id)
            .cloned()
            .collect())
    }

    async fn list_history(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let mut entries: Vec<HistoryEntry> = self
            .history
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.product_id == product_id)
            .map(|p| HistoryEntry {
                retailer_name: format!("retailer-{}", p.retailer_id),
                point: p.clone(),
            })
            .collect();
        entries.sort_by(|a, b| b.point.observed_on.cmp(&a.point.observed_on));
        Ok(entries)
    }
}
