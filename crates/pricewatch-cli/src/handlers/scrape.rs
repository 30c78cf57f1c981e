//! Scrape command handlers.
//!
//! Both entry points take the process-wide cancellation token so Ctrl-C
//! stops in-flight browser sessions instead of waiting out their timeouts.

use anyhow::Result;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use pricewatch_core::{ProductId, ProductRun, ScrapeReport};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::print_report;

/// Scrape one product at every configured retailer.
pub async fn one(
    ctx: &CliContext,
    product_id: ProductId,
    json: bool,
    cancel: &CancellationToken,
) -> Result<ScrapeReport> {
    let product = ctx
        .catalog()
        .get_product(product_id)
        .await
        .map_err(CliError::from)?
        .ok_or_else(|| CliError::NotFound(format!("Product with id {product_id}")))?;

    if !json {
        println!(
            "Scraping '{}' (searching for '{}')...\n",
            product.name,
            product.search_term()
        );
    }
    let report = ctx
        .orchestrator()
        .run_for_product(
            product.id,
            &product.name,
            product.search_name.as_deref(),
            cancel,
        )
        .await
        .map_err(CliError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(report)
}

/// Scrape every product in the catalog, one after another.
pub async fn all(ctx: &CliContext, json: bool, cancel: &CancellationToken) -> Result<Vec<ProductRun>> {
    let runs = ctx
        .orchestrator()
        .run_for_all(cancel)
        .await
        .map_err(CliError::from)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs_json(&runs))?);
        return Ok(runs);
    }

    if runs.is_empty() {
        println!("No products to scrape.");
    }
    for run in &runs {
        println!("== {} (ID {}) ==", run.product.name, run.product.id);
        match &run.result {
            Ok(report) => print_report(report),
            Err(e) => println!("Scrape failed: {e}"),
        }
        println!();
    }
    Ok(runs)
}

/// One JSON entry per product; a failed product carries `error` instead of `report`.
fn runs_json(runs: &[ProductRun]) -> Value {
    runs.iter()
        .map(|run| match &run.result {
            Ok(report) => json!({
                "product_id": run.product.id,
                "product_name": run.product.name,
                "report": report,
            }),
            Err(e) => json!({
                "product_id": run.product.id,
                "product_name": run.product.name,
                "error": e.to_string(),
            }),
        })
        .collect()
}
