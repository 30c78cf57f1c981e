//! Browser process management.

mod chromium;
mod shutdown;

pub use chromium::{
    BROWSER_CANDIDATES, DEFAULT_MAX_SESSIONS, HeadlessChromeDriver, locate_browser,
};
pub use shutdown::{TERM_GRACE_PERIOD, shutdown_child};
