//! Scrape settings and browser configuration.
//!
//! These are pure domain types with no infrastructure dependencies.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of simultaneous browser sessions per run.
pub const DEFAULT_MAX_CONCURRENT_SESSIONS: usize = 2;

/// Upper bound on simultaneous browser sessions.
pub const MAX_CONCURRENT_SESSIONS_LIMIT: usize = 16;

/// Default budget for navigation plus extraction at one retailer.
pub const DEFAULT_RETAILER_TIMEOUT_SECS: u64 = 45;

/// Default budget for launching a browser context.
pub const DEFAULT_LAUNCH_TIMEOUT_SECS: u64 = 20;

/// Desktop Chrome client identity presented to retailer sites.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Settings validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("max_concurrent_sessions must be between 1 and {MAX_CONCURRENT_SESSIONS_LIMIT}, got {0}")]
    InvalidConcurrency(usize),

    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("viewport must be non-zero, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("user agent must not be empty")]
    EmptyUserAgent,
}

/// Browser window size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1366,
            height: 768,
        }
    }
}

/// How each browser context is launched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// User-agent string sent with every request.
    pub user_agent: String,
    /// Fixed viewport.
    pub viewport: Viewport,
    /// Run without a visible window.
    pub headless: bool,
    /// Browser executable. Resolved from `PATH` when `None`.
    pub executable: Option<PathBuf>,
    /// Additional command-line switches.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: Viewport::default(),
            headless: true,
            executable: None,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Settings for one orchestrator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeSettings {
    /// Maximum browser sessions alive at once; extra retailers queue.
    pub max_concurrent_sessions: usize,
    /// Budget for navigation plus price extraction at one retailer.
    pub retailer_timeout: Duration,
    /// Budget for acquiring a browser session.
    pub launch_timeout: Duration,
    pub browser: BrowserConfig,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            max_concurrent_sessions: DEFAULT_MAX_CONCURRENT_SESSIONS,
            retailer_timeout: Duration::from_secs(DEFAULT_RETAILER_TIMEOUT_SECS),
            launch_timeout: Duration::from_secs(DEFAULT_LAUNCH_TIMEOUT_SECS),
            browser: BrowserConfig::default(),
        }
    }
}

impl ScrapeSettings {
    #[must_use]
    pub const fn with_max_concurrent_sessions(mut self, max: usize) -> Self {
        self.max_concurrent_sessions = max;
        self
    }

    #[must_use]
    pub const fn with_retailer_timeout(mut self, timeout: Duration) -> Self {
        self.retailer_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }
}

/// Validate scrape settings.
pub fn validate_settings(settings: &ScrapeSettings) -> Result<(), SettingsError> {
    if settings.max_concurrent_sessions == 0
        || settings.max_concurrent_sessions > MAX_CONCURRENT_SESSIONS_LIMIT
    {
        return Err(SettingsError::InvalidConcurrency(
            settings.max_concurrent_sessions,
        ));
    }
    if settings.retailer_timeout.is_zero() {
        return Err(SettingsError::ZeroTimeout("retailer"));
    }
    if settings.launch_timeout.is_zero() {
        return Err(SettingsError::ZeroTimeout("launch"));
    }
    let Viewport { width, height } = settings.browser.viewport;
    if width == 0 || height == 0 {
        return Err(SettingsError::InvalidViewport { width, height });
    }
    if settings.browser.user_agent.trim().is_empty() {
        return Err(SettingsError::EmptyUserAgent);
    }
    Ok(())
}
