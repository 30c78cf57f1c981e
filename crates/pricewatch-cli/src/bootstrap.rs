//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Database pool and repositories (via pricewatch-db)
//! - Browser driver and template extractors (via pricewatch-runtime)
//! - Catalog service and scrape orchestrator (via pricewatch-core)

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use pricewatch_core::paths::{database_path, extractors_path};
use pricewatch_core::{
    BrowserDriver, CatalogService, ExtractorRegistry, PriceRecorder, Repos, ScrapeOrchestrator,
    ScrapeSettings,
};
use pricewatch_db::{CoreFactory, setup_database};
use pricewatch_runtime::{HeadlessChromeDriver, load_definitions, register_definitions};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Database file.
    pub db_path: PathBuf,
    /// Extractor definitions file, if any.
    pub extractors_path: Option<PathBuf>,
    /// Orchestrator settings.
    pub settings: ScrapeSettings,
}

impl CliConfig {
    /// Resolve configuration from parsed arguments, falling back to the data directory.
    ///
    /// The default definitions file is only used when it exists.
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let db_path = match &cli.db {
            Some(path) => path.clone(),
            None => database_path()?,
        };

        let extractors_path = match &cli.extractors {
            Some(path) => Some(path.clone()),
            None => Some(extractors_path()?).filter(|p| p.is_file()),
        };

        let mut settings = ScrapeSettings::default();
        if let Some(max) = cli.concurrency {
            settings = settings.with_max_concurrent_sessions(max);
        }
        if let Some(secs) = cli.timeout_secs {
            settings = settings.with_retailer_timeout(Duration::from_secs(secs));
        }
        if let Some(chrome) = &cli.chrome {
            settings.browser = settings.browser.with_executable(chrome);
        }

        Ok(Self {
            db_path,
            extractors_path,
            settings,
        })
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    catalog: CatalogService,
    orchestrator: ScrapeOrchestrator,
    registry: Arc<ExtractorRegistry>,
    extractors_path: Option<PathBuf>,
}

impl CliContext {
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn orchestrator(&self) -> &ScrapeOrchestrator {
        &self.orchestrator
    }

    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Where extractor definitions were loaded from.
    pub fn extractors_path(&self) -> Option<&Path> {
        self.extractors_path.as_deref()
    }
}

/// Build the extractor registry from a definitions file.
///
/// No file means an empty registry: catalog commands still work and
/// scrapes report no retailers.
pub fn build_registry(path: Option<&Path>) -> Result<ExtractorRegistry> {
    let builder = ExtractorRegistry::builder();
    let Some(path) = path else {
        debug!("No extractor definitions configured");
        return Ok(builder.build());
    };

    let definitions = load_definitions(path)?;
    let registry = register_definitions(builder, &definitions)?.build();
    info!(path = %path.display(), extractors = registry.len(), "Loaded extractor definitions");
    Ok(registry)
}

/// Bootstrap the CLI application.
///
/// Opens the database, loads extractor definitions and wires the services.
/// The browser is only started when a scrape runs.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let pool = setup_database(&config.db_path).await?;
    let repos = CoreFactory::build_repos(pool);
    let registry = build_registry(config.extractors_path.as_deref())?;
    let driver: Arc<dyn BrowserDriver> = Arc::new(HeadlessChromeDriver::new());

    let mut ctx = bootstrap_with(&repos, registry, driver, config.settings)?;
    ctx.extractors_path = config.extractors_path;
    Ok(ctx)
}

/// Bootstrap with explicit repositories, registry and driver (for testing).
pub fn bootstrap_with(
    repos: &Repos,
    registry: ExtractorRegistry,
    driver: Arc<dyn BrowserDriver>,
    settings: ScrapeSettings,
) -> Result<CliContext> {
    let registry = Arc::new(registry);
    let orchestrator = ScrapeOrchestrator::new(
        Arc::clone(&repos.catalog),
        Arc::clone(&registry),
        driver,
        PriceRecorder::new(Arc::clone(&repos.prices)),
        settings,
    )
    .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(CliContext {
        catalog: CatalogService::new(repos),
        orchestrator,
        registry,
        extractors_path: None,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_config_from_cli_overrides() {
        let cli = Cli::parse_from([
            "pricewatch",
            "--db",
            "/tmp/pw.db",
            "--extractors",
            "/tmp/ex.json",
            "--chrome",
            "/opt/chrome",
            "--concurrency",
            "4",
            "--timeout-secs",
            "30",
            "paths",
        ]);
        let config = CliConfig::from_cli(&cli).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/pw.db"));
        assert_eq!(config.extractors_path, Some(PathBuf::from("/tmp/ex.json")));
        assert_eq!(config.settings.max_concurrent_sessions, 4);
        assert_eq!(config.settings.retailer_timeout, Duration::from_secs(30));
        assert_eq!(
            config.settings.browser.executable,
            Some(PathBuf::from("/opt/chrome"))
        );
    }

    #[test]
    fn test_build_registry_without_file_is_empty() {
        assert!(build_registry(None).unwrap().is_empty());
    }

    #[test]
    fn test_build_registry_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractors.json");
        std::fs::write(
            &path,
            r#"{"extractors": [{
                "retailer": "Shop A",
                "search_url": "https://shop-a.example/?q={query}",
                "product_link_selector": "a.product",
                "price_selector": ".price"
            }]}"#,
        )
        .unwrap();

        let registry = build_registry(Some(&path)).unwrap();
        assert!(registry.contains("shop a"));
    }

    #[tokio::test]
    async fn test_invalid_settings_fail_bootstrap() {
        let db = pricewatch_db::TestDb::new().await.unwrap();
        let settings = ScrapeSettings::default().with_max_concurrent_sessions(0);

        let result = bootstrap_with(
            &db.repos(),
            ExtractorRegistry::builder().build(),
            Arc::new(HeadlessChromeDriver::new()),
            settings,
        );
        assert!(result.is_err());
    }
}
