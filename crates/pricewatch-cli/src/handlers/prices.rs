//! Current prices, price history and manual price entry.

use anyhow::Result;
use rust_decimal::Decimal;

use pricewatch_core::{ProductId, RecordReceipt, RetailerId};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_price, print_separator, truncate_string};

/// Show the current price at every retailer, cheapest first.
pub async fn current(ctx: &CliContext, product_id: ProductId) -> Result<()> {
    let product = ctx
        .catalog()
        .get_product(product_id)
        .await
        .map_err(CliError::from)?
        .ok_or_else(|| CliError::NotFound(format!("Product with id {product_id}")))?;
    let mut listings = ctx
        .catalog()
        .current_prices(product_id)
        .await
        .map_err(CliError::from)?;

    if listings.is_empty() {
        println!("No prices recorded for '{}'.", product.name);
        return Ok(());
    }
    listings.sort_by(|a, b| a.association.price.cmp(&b.association.price));

    println!("Current prices for '{}':\n", product.name);
    println!("{:<24} {:>10}  {:<17} URL", "Retailer", "Price", "Updated");
    print_separator(100);
    for listing in listings {
        println!(
            "{:<24} {:>10}  {:<17} {}",
            truncate_string(&listing.retailer.name, 23),
            format_price(listing.association.price),
            listing.association.updated_at.format("%Y-%m-%d %H:%M"),
            listing.association.url
        );
    }
    Ok(())
}

/// Show the daily price history, newest first.
pub async fn history(ctx: &CliContext, product_id: ProductId, limit: Option<usize>) -> Result<()> {
    let entries = ctx
        .catalog()
        .price_history(product_id)
        .await
        .map_err(CliError::from)?;
    if entries.is_empty() {
        println!("No price history for product {product_id}.");
        return Ok(());
    }

    println!("{:<12} {:<24} {:>10}", "Date", "Retailer", "Price");
    print_separator(48);
    for entry in entries.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "{:<12} {:<24} {:>10}",
            entry.point.observed_on,
            truncate_string(&entry.retailer_name, 23),
            format_price(entry.point.price)
        );
    }
    Ok(())
}

/// Record a price by hand.
pub async fn set(
    ctx: &CliContext,
    product_id: ProductId,
    retailer_id: RetailerId,
    price: Decimal,
    url: &str,
) -> Result<RecordReceipt> {
    let receipt = ctx
        .catalog()
        .set_price(product_id, retailer_id, price, url)
        .await
        .map_err(CliError::from)?;
    match &receipt.history_warning {
        Some(warning) => println!(
            "Recorded {} (price history not updated: {warning}).",
            format_price(price)
        ),
        None => println!("Recorded {}.", format_price(price)),
    }
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use pricewatch_core::{NewProduct, NewRetailer, Persistence};

    use super::*;
    use crate::test_support::empty_context;

    #[tokio::test]
    async fn test_set_then_read_back() {
        let ctx = empty_context().await;
        let product = ctx
            .catalog()
            .add_product(NewProduct::new("Widget"))
            .await
            .unwrap();
        let shop = ctx
            .catalog()
            .add_retailer(NewRetailer::new("Shop A"))
            .await
            .unwrap();

        let receipt = set(&ctx, product.id, shop.id, Decimal::new(1250, 2), "https://a.example/w")
            .await
            .unwrap();
        assert_eq!(receipt.persistence(), Persistence::Recorded);

        current(&ctx, product.id).await.unwrap();
        history(&ctx, product.id, Some(5)).await.unwrap();
        let entries = ctx.catalog().price_history(product.id).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_set_for_unknown_retailer() {
        let ctx = empty_context().await;
        let product = ctx
            .catalog()
            .add_product(NewProduct::new("Widget"))
            .await
            .unwrap();

        let err = set(&ctx, product.id, 77, Decimal::ONE, "").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_current_for_unknown_product() {
        let ctx = empty_context().await;
        assert!(current(&ctx, 9).await.is_err());
    }
}
