//! CLI entry point - the composition root.
//!
//! Infrastructure is wired together only through `bootstrap`; command
//! dispatch routes to handlers which go through the `CliContext`.

use clap::{CommandFactory, Parser};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use pricewatch_cli::handlers::product::ProductChanges;
use pricewatch_cli::{
    Cli, CliConfig, CliError, Commands, PriceCommand, ProductCommand, RetailerCommand, bootstrap,
    handlers,
};
use pricewatch_core::{NewProduct, NewRetailer};

#[tokio::main]
async fn main() {
    // Load .env before parsing so clap's env fallbacks see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        eprintln!("Error: {err:#}");
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(&cli)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Paths) {
        handlers::paths::execute(&config);
        return Ok(());
    }

    let ctx = bootstrap(config).await?;

    match command {
        Commands::Product { command } => match command {
            ProductCommand::Add {
                name,
                search_name,
                code,
                image,
                url,
            } => {
                let product = NewProduct {
                    name,
                    search_name,
                    code,
                    image,
                    url,
                };
                handlers::product::add(&ctx, product).await?;
            }
            ProductCommand::List => handlers::product::list(&ctx).await?,
            ProductCommand::Show { id } => handlers::product::show(&ctx, id).await?,
            ProductCommand::Search { query } => handlers::product::search(&ctx, &query).await?,
            ProductCommand::Update {
                id,
                name,
                search_name,
                code,
                image,
                url,
            } => {
                let changes = ProductChanges {
                    name,
                    search_name,
                    code,
                    image,
                    url,
                };
                handlers::product::update(&ctx, id, changes).await?;
            }
            ProductCommand::Remove { id, force } => {
                handlers::product::remove(&ctx, id, force).await?;
            }
        },
        Commands::Retailer { command } => match command {
            RetailerCommand::Add { name, url, logo } => {
                let retailer = NewRetailer {
                    name,
                    logo,
                    url,
                };
                handlers::retailer::add(&ctx, retailer).await?;
            }
            RetailerCommand::List => handlers::retailer::list(&ctx).await?,
        },
        Commands::Price { command } => match command {
            PriceCommand::Set {
                product_id,
                retailer_id,
                price,
                url,
            } => {
                handlers::prices::set(&ctx, product_id, retailer_id, price, &url).await?;
            }
        },
        Commands::Scrape { id, all, json } => {
            let cancel = cancel_on_ctrl_c();
            match (id, all) {
                (Some(id), false) => {
                    handlers::scrape::one(&ctx, id, json, &cancel).await?;
                }
                _ => {
                    handlers::scrape::all(&ctx, json, &cancel).await?;
                }
            }
        }
        Commands::Prices { id } => handlers::prices::current(&ctx, id).await?,
        Commands::History { id, limit } => handlers::prices::history(&ctx, id, limit).await?,
        Commands::Extractors => handlers::extractors::execute(&ctx).await?,
        // Handled before bootstrap
        Commands::Paths => {}
    }

    Ok(())
}

/// Token cancelled by the first Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling scrape");
            trigger.cancel();
        }
    });
    cancel
}
