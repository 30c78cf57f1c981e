//! End-to-end scrape runs against an in-memory `SQLite` database.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use common::fakes::{FakeDriver, StubExtractor};
use pricewatch_core::{
    Extractor, ExtractorRegistry, FailureCause, NewProduct, NewRetailer, Persistence,
    PriceRecorder, ScrapeOrchestrator, ScrapeOutcome, ScrapeSettings,
};
use pricewatch_db::TestDb;

struct Scenario {
    db: TestDb,
    driver: Arc<FakeDriver>,
    shop_a: Arc<StubExtractor>,
    orchestrator: ScrapeOrchestrator,
}

/// Three retailers: A lists the product, B never answers, C has no extractor.
async fn scenario() -> Scenario {
    let db = TestDb::new().await.unwrap();
    let repos = db.repos();
    for name in ["Shop A", "Shop B", "Shop C"] {
        repos
            .catalog
            .insert_retailer(&NewRetailer::new(name))
            .await
            .unwrap();
    }

    let shop_a = Arc::new(StubExtractor::listing(
        "shop-a",
        "https://shop-a.example/widget",
        Decimal::new(999, 2),
    ));
    let registry = ExtractorRegistry::builder()
        .register_instance("Shop A", Arc::clone(&shop_a) as Arc<dyn Extractor>)
        .register_instance("Shop B", Arc::new(StubExtractor::hanging("shop-b")))
        .build();

    let driver = Arc::new(FakeDriver::default());
    let settings = ScrapeSettings::default()
        .with_max_concurrent_sessions(2)
        .with_retailer_timeout(Duration::from_millis(200));
    let orchestrator = ScrapeOrchestrator::new(
        Arc::clone(&repos.catalog),
        Arc::new(registry),
        driver.clone(),
        PriceRecorder::new(Arc::clone(&repos.prices)),
        settings,
    )
    .unwrap();

    Scenario {
        db,
        driver,
        shop_a,
        orchestrator,
    }
}

#[tokio::test]
async fn widget_scrape_records_success_and_isolates_timeout() {
    let s = scenario().await;
    let repos = s.db.repos();
    let widget = repos
        .catalog
        .insert_product(&NewProduct::new("Widget"))
        .await
        .unwrap();
    let retailers = repos.catalog.list_retailers().await.unwrap();
    let (a, b, c) = (retailers[0].id, retailers[1].id, retailers[2].id);

    let report = s
        .orchestrator
        .run_for_product(widget.id, "Widget", None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(
        report.get(a),
        Some(&ScrapeOutcome::Success {
            url: "https://shop-a.example/widget".to_string(),
            price: Decimal::new(999, 2),
            persistence: Persistence::Recorded,
        })
    );
    assert_eq!(
        report.get(b),
        Some(&ScrapeOutcome::ExtractionFailed {
            cause: FailureCause::Timeout
        })
    );
    assert!(report.get(c).is_none());

    let listings = repos.prices.list_associations(widget.id).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].retailer.name, "Shop A");
    assert_eq!(listings[0].association.price, Decimal::new(999, 2));
    assert_eq!(repos.prices.list_history_points(widget.id, a).await.unwrap().len(), 1);
    assert!(repos.prices.get_association(widget.id, b).await.unwrap().is_none());

    assert_eq!(s.driver.live(), 0);
}

#[tokio::test]
async fn same_day_rerun_overwrites_current_price_and_history() {
    let s = scenario().await;
    let repos = s.db.repos();
    let widget = repos
        .catalog
        .insert_product(&NewProduct::new("Widget"))
        .await
        .unwrap();
    let a = repos.catalog.list_retailers().await.unwrap()[0].id;
    let cancel = CancellationToken::new();

    let first_day = Utc::now().date_naive();
    s.orchestrator
        .run_for_product_id(widget.id, &cancel)
        .await
        .unwrap();
    s.shop_a.reprice(Decimal::new(899, 2));
    let report = s
        .orchestrator
        .run_for_product_id(widget.id, &cancel)
        .await
        .unwrap();
    let second_day = Utc::now().date_naive();

    assert!(report.get(a).is_some_and(ScrapeOutcome::is_success));
    let assoc = repos
        .prices
        .get_association(widget.id, a)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(assoc.price, Decimal::new(899, 2));
    assert!(assoc.updated_at >= assoc.created_at);

    let points = repos.prices.list_history_points(widget.id, a).await.unwrap();
    assert_eq!(points.last().map(|p| p.price), Some(Decimal::new(899, 2)));
    if first_day == second_day {
        assert_eq!(points.len(), 1);
    }
}

#[tokio::test]
async fn run_for_all_covers_every_product() {
    let s = scenario().await;
    let repos = s.db.repos();
    repos
        .catalog
        .insert_product(&NewProduct::new("Widget"))
        .await
        .unwrap();
    repos
        .catalog
        .insert_product(&NewProduct::new("Gadget").with_search_name("gadget pro"))
        .await
        .unwrap();

    let runs = s
        .orchestrator
        .run_for_all(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(runs.len(), 2);
    for run in &runs {
        let report = run.result.as_ref().unwrap();
        assert_eq!(report.success_count(), 1);
        let listings = repos.prices.list_associations(run.product.id).await.unwrap();
        assert_eq!(listings.len(), 1);
    }
}

#[tokio::test]
async fn cancelled_run_writes_nothing() {
    let s = scenario().await;
    let repos = s.db.repos();
    let widget = repos
        .catalog
        .insert_product(&NewProduct::new("Widget"))
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = s
        .orchestrator
        .run_for_product(widget.id, "Widget", None, &cancel)
        .await;

    assert!(result.is_err());
    assert!(repos.prices.list_associations(widget.id).await.unwrap().is_empty());
    assert_eq!(s.driver.live(), 0);
}
