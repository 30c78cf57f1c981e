//! Graceful shutdown of a browser child process: SIGTERM, then SIGKILL.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// How long a browser gets to exit after SIGTERM before it is killed.
pub const TERM_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Shut down a browser process, escalating to SIGKILL after [`TERM_GRACE_PERIOD`].
///
/// Always reaps the child so no zombie is left behind. On non-Unix
/// platforms the process is killed immediately.
pub async fn shutdown_child(mut child: Child) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(&mut child, TERM_GRACE_PERIOD).await
    }

    #[cfg(not(unix))]
    {
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    // Already reaped
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(|_| io::Error::other(format!("pid {pid} out of range")))?;

    if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(status) = timeout(grace, child.wait()).await {
        return status;
    }

    tracing::debug!(pid, "Browser ignored SIGTERM; killing");
    child.kill().await?;
    child.wait().await
}
