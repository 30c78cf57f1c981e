//! CLI-specific error types and mappings.
//!
//! Maps core errors to exit codes and user-facing messages.

use pricewatch_core::{CoreError, PathError, RepositoryError, ScrapeError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Invalid input.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// The referenced product or retailer does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Interrupted by the user.
    #[error("Cancelled")]
    Cancelled,
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 64,  // EX_USAGE
            Self::NotFound(_) => 66,   // EX_NOINPUT
            Self::Database(_) => 73,   // EX_CANTCREAT (closest fit)
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
            Self::Cancelled => 130,    // 128 + SIGINT
        }
    }
}

impl From<RepositoryError> for CliError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Self::NotFound(what),
            RepositoryError::AlreadyExists(_) | RepositoryError::Constraint(_) => {
                Self::Arguments(err.to_string())
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<ScrapeError> for CliError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Cancelled => Self::Cancelled,
            ScrapeError::Catalog(repo_err) => repo_err.into(),
            ScrapeError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => repo_err.into(),
            CoreError::Scrape(scrape_err) => scrape_err.into(),
            CoreError::Persistence(e) => Self::Database(e.to_string()),
            CoreError::Settings(e) => Self::Config(e.to_string()),
            CoreError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
