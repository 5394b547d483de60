//! Capture lifecycle states.

use std::fmt;

// ============================================================================
// CaptureState
// ============================================================================

/// Where a capture currently is.
///
/// ```text
/// Starting → WaitingReady → Connecting → Capturing → Done
///     └────────────┴─────────────┴────────────┴──────→ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureState {
    /// Validating the job and launching the renderer.
    Starting,
    /// Polling the control endpoint until the page has loaded.
    WaitingReady,
    /// Selecting a target and opening the WebSocket.
    Connecting,
    /// Capture command in flight.
    Capturing,
    /// PDF written.
    Done,
    /// Gave up; the error was returned to the caller.
    Failed,
}

impl CaptureState {
    /// Returns `true` for `Done` and `Failed`.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns `true` if `next` may follow `self`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Done | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Starting, Self::WaitingReady)
            | (Self::WaitingReady, Self::Connecting)
            | (Self::Connecting, Self::Capturing)
            | (Self::Capturing, Self::Done) => true,
            _ => false,
        }
    }

    /// Returns the state name used in logs.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::WaitingReady => "waiting_ready",
            Self::Connecting => "connecting",
            Self::Capturing => "capturing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
