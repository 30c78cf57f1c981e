//! Browser automation trait definition.
//!
//! This port defines the interface for driving an automated browser.
//! Implementations own every process and filesystem detail; the core only
//! sees opaque handles and page snapshots.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::BrowserConfig;

/// Errors raised by a browser driver.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrowserError {
    /// The browser process or context could not be started.
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    /// Resource exhaustion (no executable slot, temp space, ...).
    #[error("Resource exhaustion: {0}")]
    ResourceExhausted(String),

    /// The browser configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Loading a page failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The session was terminated while a navigation was in flight.
    #[error("Navigation aborted: session terminated")]
    Aborted,

    /// The handle does not refer to a live browser.
    #[error("Unknown browser handle: {0}")]
    UnknownHandle(u64),
}

/// Opaque handle to one launched browser context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrowserHandle {
    /// Driver-assigned identifier, unique per driver.
    pub id: u64,
    /// Human-readable owner of the context (the retailer name).
    pub label: String,
    /// Unix timestamp (seconds) when the context was launched.
    pub launched_at: u64,
}

impl BrowserHandle {
    /// Create a new handle.
    pub fn new(id: u64, label: impl Into<String>, launched_at: u64) -> Self {
        Self {
            id,
            label: label.into(),
            launched_at,
        }
    }
}

/// A loaded page: the final URL and the rendered HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }
}

/// Driver for isolated automated-browser contexts.
///
/// # Design Rules
///
/// - `launch` returns a handle to a fresh, isolated context
/// - `terminate` is infallible from the caller's view and reclaims everything
///   the handle owns, aborting any in-flight navigation
/// - `terminate` on an unknown or already-terminated handle is a no-op
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Launch an isolated browser context with the given client identity and viewport.
    async fn launch(&self, config: &BrowserConfig, label: &str)
    -> Result<BrowserHandle, BrowserError>;

    /// Load `url` in the context and return the rendered page.
    async fn navigate(&self, handle: &BrowserHandle, url: &str)
    -> Result<PageSnapshot, BrowserError>;

    /// Terminate the context and release its resources.
    async fn terminate(&self, handle: &BrowserHandle);
}
