//! Renderer process ownership.
//!
//! [`ProcessGuard`] owns the spawned renderer. It is terminated explicitly
//! with [`ProcessGuard::terminate`] on every orchestrator exit path and
//! killed from `Drop` if the owning future is cancelled first.

// ============================================================================
// Imports
// ============================================================================

use std::ffi::OsStr;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

// ============================================================================
// ProcessGuard
// ============================================================================

/// Guards a child process and ensures it is killed when dropped.
#[derive(Debug)]
pub struct ProcessGuard {
    /// The child process handle; `None` once reaped.
    child: Option<Child>,
    /// Process ID for logging.
    pid: u32,
}

impl ProcessGuard {
    /// Spawns `binary` with `args`, stdio discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProcessLaunch`] if the process cannot be started.
    pub fn spawn<I, A>(binary: &Path, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<OsStr>,
    {
        let mut cmd = Command::new(binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(Error::process_launch)?;
        Ok(Self::new(child))
    }

    /// Wraps an already spawned child.
    #[must_use]
    pub fn new(child: Child) -> Self {
        let pid = child.id().unwrap_or(0);
        debug!(pid, "Process guard created");
        Self {
            child: Some(child),
            pid,
        }
    }

    /// Returns the process ID.
    #[inline]
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Returns the exit status if the process has already exited.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the status cannot be queried.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        match self.child.as_mut() {
            Some(child) => Ok(child.try_wait()?),
            None => Ok(None),
        }
    }

    /// Stops the process: polite signal, `grace` to exit, then a hard kill.
    ///
    /// Never fails; problems are logged. Calling it twice is a no-op.
    pub async fn terminate(&mut self, grace: Duration) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!(pid = self.pid, %status, "Process already exited");
                return;
            }
            Ok(None) => {}
            Err(e) => debug!(pid = self.pid, error = %e, "Failed to query process status"),
        }

        self.request_exit();

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                info!(pid = self.pid, %status, "Process terminated");
                return;
            }
            Ok(Err(e)) => debug!(pid = self.pid, error = %e, "Failed to wait for process"),
            Err(_) => warn!(
                pid = self.pid,
                grace_ms = u64::try_from(grace.as_millis()).unwrap_or(u64::MAX),
                "Process ignored termination request, killing"
            ),
        }

        if let Err(e) = child.kill().await {
            debug!(pid = self.pid, error = %e, "Failed to kill process");
        }
        info!(pid = self.pid, "Process killed");
    }

    /// Sends SIGTERM.
    #[cfg(unix)]
    fn request_exit(&self) {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(self.pid) else {
            return;
        };
        if raw == 0 {
            return;
        }
        if let Err(e) = kill(Pid::from_raw(raw), Signal::SIGTERM) {
            debug!(pid = self.pid, error = %e, "Failed to send SIGTERM");
        }
    }

    /// No polite signal off unix; the grace wait is followed by a kill.
    #[cfg(not(unix))]
    fn request_exit(&self) {}
}

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take()
            && let Err(e) = child.start_kill()
        {
            debug!(pid = self.pid, error = %e, "Failed to send kill signal in Drop");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
