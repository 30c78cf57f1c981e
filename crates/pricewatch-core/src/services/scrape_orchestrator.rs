//! Runs every bound extractor for one product and aggregates the outcomes.
//!
//! Each retailer is an independent job: acquire a browser session, locate the
//! product, read the price, release the session, then record. Jobs run with
//! bounded concurrency (one session per job) and share a cancellation token.
//! No retailer failure aborts the batch.
//!
//! # Design Principles
//!
//! - A job receives a [`RetailerJob`] value and cloned [`JobDeps`]; it never
//!   touches orchestrator state
//! - Navigation and extraction together run under one timeout and inside
//!   `catch_unwind`, so timeouts and panics still reach session release
//! - Cancellation drops in-flight launches and navigation, releases the session and skips
//!   recording; outcomes already recorded stay recorded

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::FutureExt;
use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::price_recorder::PriceRecorder;
use crate::domain::{
    ExtractionResult, FailureCause, Persistence, PriceObservation, Product, ProductId,
    RetailerId, RetailerOutcome, ScrapeOutcome, ScrapeReport, resolve_search_term,
};
use crate::ports::{BrowserDriver, CatalogRepository, RepositoryError};
use crate::scraping::{BoundExtractor, BrowserSession, Extractor, ExtractorError, ExtractorRegistry};
use crate::settings::{ScrapeSettings, SettingsError, validate_settings};

/// Call-level failures of a scrape run.
///
/// Per-retailer failures are never reported here; they are outcomes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    /// The caller cancelled the run.
    #[error("Scrape cancelled")]
    Cancelled,

    /// The catalog could not be read (retailers or the product itself).
    #[error("Catalog unavailable: {0}")]
    Catalog(RepositoryError),

    /// The request itself is unusable.
    #[error("Invalid scrape request: {0}")]
    Validation(String),
}

/// Result of one product inside a run over the whole catalog.
#[derive(Debug, Clone)]
pub struct ProductRun {
    pub product: Product,
    pub result: Result<ScrapeReport, ScrapeError>,
}

/// Cloned dependencies handed to every retailer job.
#[derive(Clone)]
struct JobDeps {
    driver: Arc<dyn BrowserDriver>,
    recorder: PriceRecorder,
    settings: Arc<ScrapeSettings>,
    slots: Arc<Semaphore>,
    cancel: CancellationToken,
}

/// One retailer's share of a run.
struct RetailerJob {
    product_id: ProductId,
    search_term: String,
    binding: BoundExtractor,
}

/// What the locate/extract pipeline produced.
enum Extraction {
    Found { url: String, price: Decimal },
    NotFound,
    NoPrice { url: String },
    Failed(ExtractorError),
}

/// How a job ended.
enum JobEnd {
    Done(ScrapeOutcome),
    Cancelled,
}

/// Coordinates registry, sessions, extractors and the recorder.
pub struct ScrapeOrchestrator {
    catalog: Arc<dyn CatalogRepository>,
    registry: Arc<ExtractorRegistry>,
    driver: Arc<dyn BrowserDriver>,
    recorder: PriceRecorder,
    settings: Arc<ScrapeSettings>,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator. Fails when `settings` are out of range.
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        registry: Arc<ExtractorRegistry>,
        driver: Arc<dyn BrowserDriver>,
        recorder: PriceRecorder,
        settings: ScrapeSettings,
    ) -> Result<Self, SettingsError> {
        validate_settings(&settings)?;
        Ok(Self {
            catalog,
            registry,
            driver,
            recorder,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &ScrapeSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Scrape one product at every retailer that has a bound extractor.
    ///
    /// The alternate `search_name` is used when non-blank, otherwise
    /// `display_name`. Retailers without an extractor get no entry; an empty
    /// report is a valid result.
    pub async fn run_for_product(
        &self,
        product_id: ProductId,
        display_name: &str,
        search_name: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ScrapeReport, ScrapeError> {
        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let search_term = resolve_search_term(display_name.trim(), search_name).to_string();
        if search_term.is_empty() {
            return Err(ScrapeError::Validation(format!(
                "product {product_id} has no name to search for"
            )));
        }

        let retailers = self
            .catalog
            .list_retailers()
            .await
            .map_err(ScrapeError::Catalog)?;
        let bindings = self.registry.resolve(&retailers);

        let mut report = ScrapeReport::new(product_id);
        if bindings.is_empty() {
            info!(product_id, "No retailer has a bound extractor; nothing to scrape");
            return Ok(report);
        }

        info!(
            product_id,
            search_term = %search_term,
            retailers = bindings.len(),
            max_sessions = self.settings.max_concurrent_sessions,
            "Starting scrape"
        );

        let deps = JobDeps {
            driver: Arc::clone(&self.driver),
            recorder: self.recorder.clone(),
            settings: Arc::clone(&self.settings),
            slots: Arc::new(Semaphore::new(self.settings.max_concurrent_sessions)),
            cancel: cancel.child_token(),
        };

        let mut tasks = JoinSet::new();
        let mut owners: HashMap<tokio::task::Id, (RetailerId, String)> = HashMap::new();
        for binding in bindings {
            let owner = (binding.retailer.id, binding.retailer.name.clone());
            let job = RetailerJob {
                product_id,
                search_term: search_term.clone(),
                binding,
            };
            let handle = tasks.spawn(run_job(job, deps.clone()));
            owners.insert(handle.id(), owner);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, JobEnd::Done(outcome))) => {
                    if let Some((retailer_id, retailer_name)) = owners.remove(&id) {
                        report.insert(
                            retailer_id,
                            RetailerOutcome {
                                retailer_name,
                                outcome,
                            },
                        );
                    }
                }
                Ok((_, JobEnd::Cancelled)) => {}
                Err(e) => {
                    // The session's drop guard has already scheduled termination
                    let Some((retailer_id, retailer_name)) = owners.remove(&e.id()) else {
                        continue;
                    };
                    if e.is_cancelled() {
                        continue;
                    }
                    error!(retailer = %retailer_name, error = %e, "Retailer job aborted");
                    report.insert(
                        retailer_id,
                        RetailerOutcome {
                            retailer_name,
                            outcome: ScrapeOutcome::ExtractionFailed {
                                cause: FailureCause::Panicked(e.to_string()),
                            },
                        },
                    );
                }
            }
        }

        if cancel.is_cancelled() {
            info!(product_id, completed = report.len(), "Scrape cancelled");
            return Err(ScrapeError::Cancelled);
        }

        info!(
            product_id,
            retailers = report.len(),
            succeeded = report.success_count(),
            "Scrape finished"
        );
        Ok(report)
    }

    /// Load a product from the catalog and scrape it.
    pub async fn run_for_product_id(
        &self,
        product_id: ProductId,
        cancel: &CancellationToken,
    ) -> Result<ScrapeReport, ScrapeError> {
        let product = self
            .catalog
            .get_product(product_id)
            .await
            .map_err(ScrapeError::Catalog)?;
        self.run_for_product(
            product.id,
            &product.name,
            product.search_name.as_deref(),
            cancel,
        )
        .await
    }

    /// Scrape every catalog product, one product at a time.
    ///
    /// A product whose run fails is logged and kept in the results; only
    /// cancellation stops the loop.
    pub async fn run_for_all(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProductRun>, ScrapeError> {
        let products = self
            .catalog
            .list_products()
            .await
            .map_err(ScrapeError::Catalog)?;

        let mut runs = Vec::with_capacity(products.len());
        for product in products {
            let result = self
                .run_for_product(
                    product.id,
                    &product.name,
                    product.search_name.as_deref(),
                    cancel,
                )
                .await;
            match &result {
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) => warn!(product_id = product.id, error = %e, "Product scrape failed"),
                Ok(_) => {}
            }
            runs.push(ProductRun { product, result });
        }
        Ok(runs)
    }
}

/// Run one retailer job to completion.
///
/// Every path that acquired a session releases it before returning.
async fn run_job(job: RetailerJob, deps: JobDeps) -> JobEnd {
    let RetailerJob {
        product_id,
        search_term,
        binding: BoundExtractor {
            retailer,
            extractor,
        },
    } = job;

    let _slot = tokio::select! {
        () = deps.cancel.cancelled() => return JobEnd::Cancelled,
        permit = Arc::clone(&deps.slots).acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return JobEnd::Cancelled,
        },
    };

    let acquire = BrowserSession::acquire(
        Arc::clone(&deps.driver),
        &deps.settings.browser,
        &retailer.name,
        deps.settings.launch_timeout,
    );
    let acquired = tokio::select! {
        biased;
        () = deps.cancel.cancelled() => {
            debug!(retailer = %retailer.name, "Cancelled while starting browser session");
            return JobEnd::Cancelled;
        }
        acquired = acquire => acquired,
    };
    let mut session = match acquired {
        Ok(session) => session,
        Err(e) => {
            warn!(retailer = %retailer.name, error = %e, "Could not start browser session");
            return JobEnd::Done(ScrapeOutcome::InitializationFailed {
                reason: e.to_string(),
            });
        }
    };

    let pipeline = AssertUnwindSafe(locate_and_extract(
        extractor.as_ref(),
        &mut session,
        &search_term,
    ))
    .catch_unwind();
    let finished = tokio::select! {
        biased;
        () = deps.cancel.cancelled() => None,
        result = tokio::time::timeout(deps.settings.retailer_timeout, pipeline) => Some(result),
    };

    session.release().await;

    let extraction = match finished {
        None => {
            debug!(retailer = %retailer.name, "Retailer job cancelled");
            return JobEnd::Cancelled;
        }
        Some(Err(_elapsed)) => {
            warn!(
                retailer = %retailer.name,
                timeout = ?deps.settings.retailer_timeout,
                "Retailer timed out"
            );
            return JobEnd::Done(ScrapeOutcome::ExtractionFailed {
                cause: FailureCause::Timeout,
            });
        }
        Some(Ok(Err(payload))) => {
            let message = panic_message(payload.as_ref());
            error!(retailer = %retailer.name, panic = %message, "Extractor panicked");
            return JobEnd::Done(ScrapeOutcome::ExtractionFailed {
                cause: FailureCause::Panicked(message),
            });
        }
        Some(Ok(Ok(extraction))) => extraction,
    };

    let (url, price) = match extraction {
        Extraction::Found { url, price } => (url, price),
        Extraction::NotFound => {
            info!(retailer = %retailer.name, term = %search_term, "No listing found");
            return JobEnd::Done(ScrapeOutcome::NotFound);
        }
        Extraction::NoPrice { url } => {
            info!(retailer = %retailer.name, url = %url, "Listing has no parseable price");
            return JobEnd::Done(ScrapeOutcome::ExtractionFailed {
                cause: FailureCause::NoPriceFound,
            });
        }
        Extraction::Failed(e) => {
            warn!(retailer = %retailer.name, error = %e, "Extractor failed");
            return JobEnd::Done(ScrapeOutcome::ExtractionFailed { cause: e.into() });
        }
    };

    if deps.cancel.is_cancelled() {
        return JobEnd::Cancelled;
    }

    let observation = PriceObservation::from_extraction(
        product_id,
        ExtractionResult {
            retailer_id: retailer.id,
            url: url.clone(),
            price,
        },
        Utc::now(),
    );
    let persistence = match deps.recorder.record(&observation).await {
        Ok(receipt) => receipt.persistence(),
        Err(e) => Persistence::NotRecorded(e.to_string()),
    };

    info!(
        retailer = %retailer.name,
        retailer_id = retailer.id,
        price = %price,
        url = %url,
        "Price retrieved"
    );
    JobEnd::Done(ScrapeOutcome::Success {
        url,
        price,
        persistence,
    })
}

/// Locate, then extract. `extract_price` only runs after a successful locate.
async fn locate_and_extract(
    extractor: &dyn Extractor,
    session: &mut BrowserSession,
    search_term: &str,
) -> Extraction {
    let url = match extractor.locate(session, search_term).await {
        Ok(Some(url)) => url,
        Ok(None) => return Extraction::NotFound,
        Err(e) => return Extraction::Failed(e),
    };
    match extractor.extract_price(session).await {
        Ok(Some(price)) => Extraction::Found { url, price },
        Ok(None) => Extraction::NoPrice { url },
        Err(e) => Extraction::Failed(e),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
