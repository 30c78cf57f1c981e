//! The per-retailer extraction capability.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use super::session::BrowserSession;
use crate::domain::FailureCause;
use crate::ports::BrowserError;

/// Hard failures of an extractor.
///
/// "No listing" and "no price on the page" are not errors; they are
/// `Ok(None)` from [`Extractor::locate`] and [`Extractor::extract_price`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractorError {
    /// Search or page navigation failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// The page could not be read.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The browser session was unusable.
    #[error("Session error: {0}")]
    Session(String),
}

impl From<BrowserError> for ExtractorError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::Navigation(msg) => Self::Navigation(msg),
            other => Self::Session(other.to_string()),
        }
    }
}

impl From<ExtractorError> for FailureCause {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::Navigation(msg) => Self::Navigation(msg),
            ExtractorError::Extraction(msg) => Self::Extraction(msg),
            ExtractorError::Session(msg) => Self::Navigation(format!("browser session: {msg}")),
        }
    }
}

/// Retailer-specific logic that finds a product listing and reads its price.
///
/// The orchestrator always calls [`locate`](Self::locate) first and only
/// calls [`extract_price`](Self::extract_price) after it returned a URL.
/// Both run on the same session, strictly in sequence.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Search the retailer for `search_term` and load the matching product page.
    ///
    /// Returns `Ok(None)` when the retailer has no listing for the term.
    async fn locate(
        &self,
        session: &mut BrowserSession,
        search_term: &str,
    ) -> Result<Option<String>, ExtractorError>;

    /// Read the price from the page loaded by `locate`.
    ///
    /// Returns `Ok(None)` when no parseable price is present.
    async fn extract_price(
        &self,
        session: &mut BrowserSession,
    ) -> Result<Option<Decimal>, ExtractorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_error_mapping() {
        assert_eq!(
            ExtractorError::from(BrowserError::Navigation("dns".into())),
            ExtractorError::Navigation("dns".into())
        );
        assert!(matches!(
            ExtractorError::from(BrowserError::Aborted),
            ExtractorError::Session(_)
        ));
    }

    #[test]
    fn test_failure_cause_mapping() {
        let cause: FailureCause = ExtractorError::Extraction("bad html".into()).into();
        assert_eq!(cause, FailureCause::Extraction("bad html".into()));
    }
}
