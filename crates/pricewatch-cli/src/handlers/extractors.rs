//! Extractors command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// List registered extractor keys and which retailers they bind to.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    match ctx.extractors_path() {
        Some(path) => println!("Definitions: {}", path.display()),
        None => println!("Definitions: none configured (set PRICEWATCH_EXTRACTORS)"),
    }

    let registry = ctx.registry();
    if registry.is_empty() {
        println!("No extractors registered.");
        return Ok(());
    }

    let retailers = ctx.catalog().list_retailers().await.map_err(CliError::from)?;
    println!();
    for key in registry.keys() {
        let bound: Vec<&str> = retailers
            .iter()
            .filter(|r| pricewatch_core::retailer_key(&r.name) == key)
            .map(|r| r.name.as_str())
            .collect();
        if bound.is_empty() {
            println!("  {key:<24} (no matching retailer)");
        } else {
            println!("  {key:<24} -> {}", bound.join(", "));
        }
    }
    Ok(())
}
