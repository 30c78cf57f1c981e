//! Paths command handler.

use crate::bootstrap::CliConfig;

/// Print the resolved database and definitions paths.
pub fn execute(config: &CliConfig) {
    println!("Database:    {}", config.db_path.display());
    match &config.extractors_path {
        Some(path) => println!("Extractors:  {}", path.display()),
        None => println!("Extractors:  (none)"),
    }
    match &config.settings.browser.executable {
        Some(path) => println!("Browser:     {}", path.display()),
        None => println!("Browser:     (searched on PATH at scrape time)"),
    }
}
