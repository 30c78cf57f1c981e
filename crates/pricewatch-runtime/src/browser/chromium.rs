//! Headless Chromium implementation of [`BrowserDriver`].
//!
//! Every session owns a throwaway profile directory. A navigation runs the
//! browser once with `--dump-dom` against that profile and captures the
//! serialized DOM from stdout. Terminating a session cancels any navigation
//! still running on it and deletes the profile.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use pricewatch_core::settings::BrowserConfig;
use pricewatch_core::{BrowserDriver, BrowserError, BrowserHandle, PageSnapshot};

use super::shutdown::shutdown_child;

/// Executable names tried on `PATH` when no browser is configured.
pub const BROWSER_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

/// Default cap on live browser sessions per driver.
pub const DEFAULT_MAX_SESSIONS: usize = 16;

/// Find the browser executable.
///
/// A configured path must exist; otherwise [`BROWSER_CANDIDATES`] are
/// searched on `PATH` in order.
pub fn locate_browser(configured: Option<&Path>) -> Result<PathBuf, BrowserError> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(BrowserError::Configuration(format!(
            "browser executable not found: {}",
            path.display()
        )));
    }

    BROWSER_CANDIDATES
        .iter()
        .find_map(|candidate| which::which(candidate).ok())
        .ok_or_else(|| {
            BrowserError::Configuration(format!(
                "no browser found on PATH (tried {})",
                BROWSER_CANDIDATES.join(", ")
            ))
        })
}

/// Command-line switches for one page load.
fn browser_args(config: &BrowserConfig, profile: &Path, url: &str) -> Vec<String> {
    let mut args = Vec::with_capacity(config.extra_args.len() + 10);
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args.extend([
        "--disable-gpu".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--hide-scrollbars".to_string(),
        format!("--user-agent={}", config.user_agent),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
        format!("--user-data-dir={}", profile.display()),
    ]);
    args.extend(config.extra_args.iter().cloned());
    args.push("--dump-dom".to_string());
    args.push(url.to_string());
    args
}

/// Live state of one launched session.
struct SessionSlot {
    executable: PathBuf,
    config: BrowserConfig,
    profile: TempDir,
    cancel: CancellationToken,
}

/// What a navigation needs, cloned out of the slot so no lock is held across awaits.
struct NavigationPlan {
    executable: PathBuf,
    args: Vec<String>,
    cancel: CancellationToken,
}

/// Drives a locally installed Chromium-family browser.
pub struct HeadlessChromeDriver {
    sessions: Mutex<HashMap<u64, SessionSlot>>,
    next_id: AtomicU64,
    max_sessions: usize,
}

impl Default for HeadlessChromeDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessChromeDriver {
    pub fn new() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }

    /// Create a driver that refuses to launch beyond `max_sessions` live sessions.
    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            max_sessions,
        }
    }

    /// Number of sessions launched and not yet terminated.
    pub fn live_sessions(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Profile directory of a live session.
    pub fn profile_dir(&self, handle: &BrowserHandle) -> Option<PathBuf> {
        self.lock_sessions()
            .get(&handle.id)
            .map(|slot| slot.profile.path().to_path_buf())
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<u64, SessionSlot>> {
        // A poisoned map still holds valid slots
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn plan(&self, handle: &BrowserHandle, url: &str) -> Result<NavigationPlan, BrowserError> {
        let sessions = self.lock_sessions();
        let slot = sessions
            .get(&handle.id)
            .ok_or(BrowserError::UnknownHandle(handle.id))?;
        Ok(NavigationPlan {
            executable: slot.executable.clone(),
            args: browser_args(&slot.config, slot.profile.path(), url),
            cancel: slot.cancel.clone(),
        })
    }
}

#[async_trait]
impl BrowserDriver for HeadlessChromeDriver {
    async fn launch(
        &self,
        config: &BrowserConfig,
        label: &str,
    ) -> Result<BrowserHandle, BrowserError> {
        let executable = locate_browser(config.executable.as_deref())?;

        let profile = tempfile::Builder::new()
            .prefix("pricewatch-profile-")
            .tempdir()
            .map_err(|e| BrowserError::ResourceExhausted(format!("profile directory: {e}")))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut sessions = self.lock_sessions();
            if sessions.len() >= self.max_sessions {
                return Err(BrowserError::ResourceExhausted(format!(
                    "{} browser sessions already running",
                    sessions.len()
                )));
            }
            sessions.insert(
                id,
                SessionSlot {
                    executable: executable.clone(),
                    config: config.clone(),
                    profile,
                    cancel: CancellationToken::new(),
                },
            );
        }

        let launched_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        debug!(session = id, label = %label, browser = %executable.display(), "Browser session launched");
        Ok(BrowserHandle::new(id, label, launched_at))
    }

    async fn navigate(
        &self,
        handle: &BrowserHandle,
        url: &str,
    ) -> Result<PageSnapshot, BrowserError> {
        let plan = self.plan(handle, url)?;
        if plan.cancel.is_cancelled() {
            return Err(BrowserError::Aborted);
        }

        let mut child = Command::new(&plan.executable)
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BrowserError::LaunchFailed(format!("{}: {e}", plan.executable.display()))
            })?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| BrowserError::Navigation("browser stdout unavailable".to_string()))?;
        let mut dom = Vec::new();

        tokio::select! {
            biased;
            () = plan.cancel.cancelled() => {
                if let Err(e) = shutdown_child(child).await {
                    warn!(session = handle.id, error = %e, "Failed to stop browser after abort");
                }
                return Err(BrowserError::Aborted);
            }
            read = stdout.read_to_end(&mut dom) => {
                read.map_err(|e| BrowserError::Navigation(format!("reading page: {e}")))?;
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| BrowserError::Navigation(format!("waiting for browser: {e}")))?;
        if !status.success() {
            return Err(BrowserError::Navigation(format!(
                "browser exited with {status} loading {url}"
            )));
        }

        debug!(session = handle.id, url = %url, bytes = dom.len(), "Page loaded");
        Ok(PageSnapshot::new(url, String::from_utf8_lossy(&dom)))
    }

    async fn terminate(&self, handle: &BrowserHandle) {
        let Some(slot) = self.lock_sessions().remove(&handle.id) else {
            return;
        };
        slot.cancel.cancel();
        let profile = slot.profile.path().to_path_buf();
        if let Err(e) = slot.profile.close() {
            warn!(session = handle.id, path = %profile.display(), error = %e, "Failed to remove browser profile");
        }
        debug!(session = handle.id, label = %handle.label, "Browser session terminated");
    }
}
