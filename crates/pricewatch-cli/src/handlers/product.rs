//! Product command handlers.

use anyhow::Result;

use pricewatch_core::{NewProduct, Product, ProductId};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{format_optional, format_price, print_separator, truncate_string};
use crate::utils::input;

/// Field changes requested by `product update`.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    /// `Some("")` clears the search name.
    pub search_name: Option<String>,
    pub code: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
}

impl ProductChanges {
    /// Apply the changes on top of an existing product.
    pub fn apply(self, current: &Product) -> NewProduct {
        let pick = |new: Option<String>, old: &Option<String>| match new {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => old.clone(),
        };
        NewProduct {
            name: self.name.unwrap_or_else(|| current.name.clone()),
            search_name: pick(self.search_name, &current.search_name),
            code: pick(self.code, &current.code),
            image: pick(self.image, &current.image),
            url: pick(self.url, &current.url),
        }
    }
}

pub async fn add(ctx: &CliContext, product: NewProduct) -> Result<Product> {
    let product = ctx
        .catalog()
        .add_product(product)
        .await
        .map_err(CliError::from)?;
    println!("Added product '{}' (ID {}).", product.name, product.id);
    Ok(product)
}

pub async fn list(ctx: &CliContext) -> Result<()> {
    let products = ctx.catalog().list_products().await.map_err(CliError::from)?;
    if products.is_empty() {
        println!("No products yet.");
        println!("Use 'pricewatch product add <name>' to add one.");
        return Ok(());
    }
    print_products(&products);
    Ok(())
}

pub async fn search(ctx: &CliContext, query: &str) -> Result<()> {
    let products = ctx
        .catalog()
        .search_products(query)
        .await
        .map_err(CliError::from)?;
    if products.is_empty() {
        println!("No products match '{query}'.");
        return Ok(());
    }
    print_products(&products);
    Ok(())
}

/// Show a product and where it currently sells.
pub async fn show(ctx: &CliContext, id: ProductId) -> Result<()> {
    let product = ctx.catalog().find_product(id).await.map_err(not_found(id))?;
    let listings = ctx
        .catalog()
        .current_prices(id)
        .await
        .map_err(CliError::from)?;

    println!("ID:          {}", product.id);
    println!("Name:        {}", product.name);
    println!("Searched as: {}", product.search_term());
    println!("Code:        {}", format_optional(product.code.as_ref(), "--"));
    println!("URL:         {}", format_optional(product.url.as_ref(), "--"));
    println!("Updated:     {}", product.updated_at.format("%Y-%m-%d %H:%M"));

    if listings.is_empty() {
        println!("\nNo prices recorded yet.");
        return Ok(());
    }
    println!();
    for listing in listings {
        println!(
            "  {:<24} {:>10}  {}",
            truncate_string(&listing.retailer.name, 23),
            format_price(listing.association.price),
            listing.association.url
        );
    }
    Ok(())
}

pub async fn update(ctx: &CliContext, id: ProductId, changes: ProductChanges) -> Result<Product> {
    let current = ctx.catalog().find_product(id).await.map_err(not_found(id))?;
    let updated = ctx
        .catalog()
        .update_product(id, changes.apply(&current))
        .await
        .map_err(CliError::from)?;
    println!("Updated product '{}' (ID {}).", updated.name, updated.id);
    Ok(updated)
}

/// Remove a product, asking first unless `force` is set.
pub async fn remove(ctx: &CliContext, id: ProductId, force: bool) -> Result<bool> {
    let product = ctx.catalog().find_product(id).await.map_err(not_found(id))?;

    if !force {
        let confirm = input::prompt_confirmation(&format!(
            "Remove '{}' (ID {}) with all its prices and history?",
            product.name, product.id
        ))?;
        if !confirm {
            println!("Remove operation cancelled.");
            return Ok(false);
        }
    }

    ctx.catalog()
        .remove_product(id)
        .await
        .map_err(CliError::from)?;
    println!("Removed product '{}' (ID {}).", product.name, product.id);
    Ok(true)
}

fn print_products(products: &[Product]) {
    println!("{:<5} {:<32} {:<24} Code", "ID", "Name", "Search name");
    print_separator(80);
    for product in products {
        println!(
            "{:<5} {:<32} {:<24} {}",
            product.id,
            truncate_string(&product.name, 31),
            truncate_string(product.search_name.as_deref().unwrap_or("--"), 23),
            format_optional(product.code.as_ref(), "--")
        );
    }
}

fn not_found(id: ProductId) -> impl FnOnce(pricewatch_core::CoreError) -> CliError {
    move |err| match err {
        pricewatch_core::CoreError::Validation(_) => {
            CliError::NotFound(format!("Product with id {id}"))
        }
        other => other.into(),
    }
}
