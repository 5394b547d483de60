//! Exporter-wide settings shared by every capture.

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::driver::RendererOptions;

// ============================================================================
// Defaults
// ============================================================================

/// Host the renderer's debug endpoint listens on.
pub const DEFAULT_DEBUG_HOST: &str = "127.0.0.1";

/// Pause between readiness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// How long the page may take to show up as loaded.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra wait after readiness for scripts and fonts.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// Bound for TCP connect plus WebSocket handshake.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound for a single `GET /json`.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Time the renderer gets to exit after SIGTERM.
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(5);

// ============================================================================
// CaptureSettings
// ============================================================================

/// Renderer location, launch flags and timing knobs.
///
/// Built and validated by [`crate::ExporterBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSettings {
    /// Renderer executable.
    pub binary: PathBuf,
    /// Launch flags.
    pub options: RendererOptions,
    /// Fixed profile directory; a temporary one per capture when `None`.
    pub profile_dir: Option<PathBuf>,
    /// Debug endpoint host.
    pub debug_host: String,
    /// Fixed debug port; a free port per capture when `None`.
    pub debug_port: Option<u16>,
    /// Pause between readiness polls.
    pub poll_interval: Duration,
    /// Readiness window.
    pub ready_timeout: Duration,
    /// Wait between readiness and connecting.
    pub settle_delay: Duration,
    /// Connect and handshake bound.
    pub connect_timeout: Duration,
    /// Per-request discovery bound.
    pub discovery_timeout: Duration,
    /// SIGTERM grace period.
    pub terminate_grace: Duration,
}

impl CaptureSettings {
    /// Default settings for `binary`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            options: RendererOptions::default(),
            profile_dir: None,
            debug_host: DEFAULT_DEBUG_HOST.to_string(),
            debug_port: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            ready_timeout: DEFAULT_READY_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            terminate_grace: DEFAULT_TERMINATE_GRACE,
        }
    }
}
