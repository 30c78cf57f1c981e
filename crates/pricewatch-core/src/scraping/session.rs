//! Scoped ownership of one automated-browser context.
//!
//! A [`BrowserSession`] is created by [`BrowserSession::acquire`] and must be
//! released with [`BrowserSession::release`]. Release is idempotent. A session
//! dropped while still open schedules termination on the current runtime and
//! logs a warning, so no exit path leaves a browser running.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::{BrowserDriver, BrowserError, BrowserHandle, PageSnapshot};
use crate::settings::BrowserConfig;

/// Lifecycle of a browser session.
///
/// `Uninitialized -> Acquiring -> Ready -> InUse -> Closing -> Closed`, plus
/// `Acquiring -> Closed` on init failure and `Ready -> Closing` when a session
/// is released before it was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Acquiring,
    Ready,
    InUse,
    Closing,
    Closed,
}

impl SessionState {
    /// Whether the lifecycle allows moving from `self` to `next`.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Acquiring)
                | (Self::Acquiring, Self::Ready | Self::Closed)
                | (Self::Ready | Self::InUse, Self::InUse | Self::Closing)
                | (Self::Closing, Self::Closed)
        )
    }

    /// A browser context is alive in this state.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Ready | Self::InUse)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Acquiring => "acquiring",
            Self::Ready => "ready",
            Self::InUse => "in_use",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Errors acquiring a browser session.
///
/// All of these are scoped to one retailer; none abort a batch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("Resource exhaustion: {0}")]
    ResourceExhausted(String),

    #[error("Browser launch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Browser configuration error: {0}")]
    Configuration(String),
}

impl From<BrowserError> for SessionError {
    fn from(err: BrowserError) -> Self {
        match err {
            BrowserError::ResourceExhausted(msg) => Self::ResourceExhausted(msg),
            BrowserError::Configuration(msg) => Self::Configuration(msg),
            other => Self::LaunchFailed(other.to_string()),
        }
    }
}

/// One automated-browser context, used for exactly one extraction.
pub struct BrowserSession {
    driver: Arc<dyn BrowserDriver>,
    handle: Option<BrowserHandle>,
    state: SessionState,
    page: Option<PageSnapshot>,
}

impl BrowserSession {
    /// Launch an isolated browser context.
    ///
    /// Launching is bounded by `launch_timeout`. On failure no session exists
    /// and there is nothing to release.
    pub async fn acquire(
        driver: Arc<dyn BrowserDriver>,
        config: &BrowserConfig,
        label: &str,
        launch_timeout: Duration,
    ) -> Result<Self, SessionError> {
        let mut state = SessionState::Uninitialized;
        advance(&mut state, SessionState::Acquiring, label);

        let launched = tokio::time::timeout(launch_timeout, driver.launch(config, label)).await;
        let handle = match launched {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => {
                advance(&mut state, SessionState::Closed, label);
                return Err(e.into());
            }
            Err(_) => {
                advance(&mut state, SessionState::Closed, label);
                return Err(SessionError::Timeout(launch_timeout));
            }
        };

        advance(&mut state, SessionState::Ready, label);
        debug!(session = handle.id, label = %label, "Browser session acquired");

        Ok(Self {
            driver,
            handle: Some(handle),
            state,
            page: None,
        })
    }

    /// Load `url` and keep the resulting page as the current page.
    pub async fn goto(&mut self, url: &str) -> Result<&PageSnapshot, BrowserError> {
        let Some(handle) = self.handle.as_ref().filter(|_| self.state.is_open()) else {
            return Err(BrowserError::Aborted);
        };
        let label = handle.label.clone();
        let snapshot = self.driver.navigate(handle, url).await?;
        advance(&mut self.state, SessionState::InUse, &label);
        Ok(self.page.insert(snapshot))
    }

    /// Currently loaded page, if any navigation succeeded.
    pub fn page(&self) -> Option<&PageSnapshot> {
        self.page.as_ref()
    }

    /// URL of the currently loaded page.
    pub fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.url.as_str())
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn handle(&self) -> Option<&BrowserHandle> {
        self.handle.as_ref()
    }

    /// Terminate the browser context.
    ///
    /// The first call terminates; later calls are no-ops.
    pub async fn release(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        advance(&mut self.state, SessionState::Closing, &handle.label);
        self.page = None;
        self.driver.terminate(&handle).await;
        advance(&mut self.state, SessionState::Closed, &handle.label);
        debug!(session = handle.id, label = %handle.label, "Browser session released");
    }
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("handle", &self.handle)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        warn!(
            session = handle.id,
            label = %handle.label,
            "Browser session dropped without release; terminating in background"
        );
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                let driver = Arc::clone(&self.driver);
                rt.spawn(async move {
                    driver.terminate(&handle).await;
                });
            }
            Err(_) => {
                warn!(session = handle.id, "No runtime available; browser context leaked");
            }
        }
    }
}

fn advance(state: &mut SessionState, next: SessionState, label: &str) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid session transition {state} -> {next}"
    );
    debug!(label = %label, from = %state, to = %next, "Session state change");
    *state = next;
}
