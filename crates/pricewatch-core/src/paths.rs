//! Canonical data locations for pricewatch.
//!
//! Resolution order for the data root:
//! 1. `PRICEWATCH_DATA_DIR` environment variable
//! 2. `<system data dir>/pricewatch`

use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// File name of the `SQLite` database inside the data root.
pub const DATABASE_FILE_NAME: &str = "pricewatch.db";

/// File name of the extractor definitions inside the data root.
pub const EXTRACTORS_FILE_NAME: &str = "extractors.json";

/// Errors raised while resolving data paths.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Get the pricewatch data root, creating it if needed.
pub fn data_root() -> Result<PathBuf, PathError> {
    let root = match env::var("PRICEWATCH_DATA_DIR") {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => dirs::data_local_dir()
            .ok_or(PathError::NoDataDir)?
            .join("pricewatch"),
    };

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Get the path to the pricewatch database file.
pub fn database_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(DATABASE_FILE_NAME))
}

/// Get the default path of the extractor definitions file.
///
/// The file is optional; callers treat a missing file as "no definitions".
pub fn extractors_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(EXTRACTORS_FILE_NAME))
}
