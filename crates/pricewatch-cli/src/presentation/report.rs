//! Rendering of scrape reports.

use pricewatch_core::{ScrapeOutcome, ScrapeReport};

use super::tables::{format_price, print_separator, truncate_string};

/// One-line detail for an outcome: the URL on success, the reason otherwise.
pub fn outcome_detail(outcome: &ScrapeOutcome) -> String {
    match outcome {
        ScrapeOutcome::Success {
            url, persistence, ..
        } => match persistence.warning() {
            Some(warning) => format!("{url} (not saved: {warning})"),
            None => url.clone(),
        },
        ScrapeOutcome::NotFound => "no listing for the search term".to_string(),
        ScrapeOutcome::InitializationFailed { reason } => reason.clone(),
        ScrapeOutcome::ExtractionFailed { cause } => cause.to_string(),
    }
}

/// Print a report as a table, one row per retailer.
pub fn print_report(report: &ScrapeReport) {
    if report.is_empty() {
        println!("No retailer has a configured extractor; nothing was scraped.");
        return;
    }

    println!(
        "{:<24} {:<22} {:>10}  Detail",
        "Retailer", "Outcome", "Price"
    );
    print_separator(100);
    for entry in report.outcomes.values() {
        let price = match &entry.outcome {
            ScrapeOutcome::Success { price, .. } => format_price(*price),
            _ => "--".to_string(),
        };
        println!(
            "{:<24} {:<22} {:>10}  {}",
            truncate_string(&entry.retailer_name, 23),
            entry.outcome.label(),
            price,
            outcome_detail(&entry.outcome)
        );
    }
    println!(
        "\n{} of {} retailer(s) returned a price.",
        report.success_count(),
        report.len()
    );
}
