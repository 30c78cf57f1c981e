//! Retailer command handlers.

use anyhow::Result;

use pricewatch_core::{NewRetailer, Retailer};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_optional, print_separator, truncate_string};

pub async fn add(ctx: &CliContext, retailer: NewRetailer) -> Result<Retailer> {
    let retailer = ctx
        .catalog()
        .add_retailer(retailer)
        .await
        .map_err(CliError::from)?;
    println!("Added retailer '{}' (ID {}).", retailer.name, retailer.id);
    if !ctx.registry().contains(&retailer.name) {
        println!("Note: no extractor is configured for this retailer; scrapes will skip it.");
    }
    Ok(retailer)
}

/// List retailers and whether each one can be scraped.
pub async fn list(ctx: &CliContext) -> Result<()> {
    let retailers = ctx.catalog().list_retailers().await.map_err(CliError::from)?;
    if retailers.is_empty() {
        println!("No retailers yet.");
        println!("Use 'pricewatch retailer add <name>' to add one.");
        return Ok(());
    }

    println!("{:<5} {:<28} {:<10} URL", "ID", "Name", "Extractor");
    print_separator(80);
    for retailer in retailers {
        let bound = if ctx.registry().contains(&retailer.name) {
            "yes"
        } else {
            "no"
        };
        println!(
            "{:<5} {:<28} {:<10} {}",
            retailer.id,
            truncate_string(&retailer.name, 27),
            bound,
            format_optional(retailer.url.as_ref(), "--")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::empty_context;

    #[tokio::test]
    async fn test_add_and_reject_duplicate() {
        let ctx = empty_context().await;
        let shop = add(&ctx, NewRetailer::new("Shop A").with_url("https://a.example"))
            .await
            .unwrap();
        assert_eq!(shop.url.as_deref(), Some("https://a.example"));

        let err = add(&ctx, NewRetailer::new("Shop A")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::Arguments(_))
        ));
        list(&ctx).await.unwrap();
    }
}
