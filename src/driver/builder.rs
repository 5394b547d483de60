//! Builder pattern for exporter configuration.
//!
//! Provides a fluent API for configuring and creating [`Exporter`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use headless_pdf::Exporter;
//!
//! # fn example() -> headless_pdf::Result<()> {
//! let exporter = Exporter::builder()
//!     .binary("/usr/bin/chromium")
//!     .settle_delay(Duration::from_millis(500))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::capture::CaptureSettings;
use crate::capture::settings::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DEBUG_HOST, DEFAULT_DISCOVERY_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_READY_TIMEOUT, DEFAULT_SETTLE_DELAY, DEFAULT_TERMINATE_GRACE,
};
use crate::error::{Error, Result};

use super::core::Exporter;
use super::locate::find_renderer;
use super::options::RendererOptions;

// ============================================================================
// ExporterBuilder
// ============================================================================

/// Builder for configuring an [`Exporter`] instance.
///
/// Use [`Exporter::builder()`] to create a new builder.
#[derive(Debug, Clone)]
pub struct ExporterBuilder {
    /// Path to renderer binary; auto-detected when `None`.
    binary: Option<PathBuf>,
    /// Launch flags.
    options: RendererOptions,
    /// Fixed profile directory.
    profile_dir: Option<PathBuf>,
    /// Debug endpoint host.
    debug_host: String,
    /// Fixed debug port.
    debug_port: Option<u16>,
    poll_interval: Duration,
    ready_timeout: Duration,
    settle_delay: Duration,
    connect_timeout: Duration,
    discovery_timeout: Duration,
    terminate_grace: Duration,
}

impl Default for ExporterBuilder {
    fn default() -> Self {
        Self {
            binary: None,
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

// ============================================================================
// ExporterBuilder Implementation
// ============================================================================

impl ExporterBuilder {
    /// Creates a new builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the path to the renderer executable.
    ///
    /// When unset, [`find_renderer`] is consulted at build time.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets renderer launch options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: RendererOptions) -> Self {
        self.options = options;
        self
    }

    /// Uses a fixed profile directory instead of a temporary one.
    ///
    /// Captures sharing one directory must not run concurrently.
    #[inline]
    #[must_use]
    pub fn profile_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.profile_dir = Some(path.into());
        self
    }

    /// Sets the debug endpoint host.
    #[inline]
    #[must_use]
    pub fn debug_host(mut self, host: impl Into<String>) -> Self {
        self.debug_host = host.into();
        self
    }

    /// Uses a fixed debug port instead of a free one per capture.
    #[inline]
    #[must_use]
    pub fn debug_port(mut self, port: u16) -> Self {
        self.debug_port = Some(port);
        self
    }

    /// Sets the pause between readiness polls.
    #[inline]
    #[must_use]
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets how long the page may take to load.
    #[inline]
    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Sets the wait between readiness and capture.
    #[inline]
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the bound for TCP connect plus handshake.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the bound for a single discovery request.
    #[inline]
    #[must_use]
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    /// Sets how long the renderer gets to exit after SIGTERM.
    #[inline]
    #[must_use]
    pub fn terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    /// Builds the exporter with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no binary was set and none was found, or a
    ///   setting is out of range
    /// - [`Error::RendererNotFound`] if the binary path doesn't exist
    pub fn build(self) -> Result<Exporter> {
        let binary = self.validate_binary()?;
        self.validate_settings()?;

        let settings = CaptureSettings {
            binary,
            options: self.options,
            profile_dir: self.profile_dir,
            debug_host: self.debug_host,
            debug_port: self.debug_port,
            poll_interval: self.poll_interval,
            ready_timeout: self.ready_timeout,
            settle_delay: self.settle_delay,
            connect_timeout: self.connect_timeout,
            discovery_timeout: self.discovery_timeout,
            terminate_grace: self.terminate_grace,
        };

        Ok(Exporter::new(settings))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ExporterBuilder {
    /// Validates the binary path configuration.
    fn validate_binary(&self) -> Result<PathBuf> {
        let binary = match self.binary.clone() {
            Some(path) => path,
            None => find_renderer().ok_or_else(|| {
                Error::config(
                    "No Chrome-family renderer found. Use .binary() to set it.\n\
                     Example: Exporter::builder().binary(\"/usr/bin/chromium\")",
                )
            })?,
        };

        if !binary.exists() {
            return Err(Error::renderer_not_found(&binary));
        }

        Ok(binary)
    }

    /// Validates timing, network and launch settings.
    fn validate_settings(&self) -> Result<()> {
        self.options.validate()?;

        if self.debug_host.is_empty() {
            return Err(Error::config("debug host must not be empty"));
        }
        if self.debug_port == Some(0) {
            return Err(Error::config(
                "debug port 0 is not allowed; leave it unset to pick a free port",
            ));
        }

        for (name, value) in [
            ("poll_interval", self.poll_interval),
            ("ready_timeout", self.ready_timeout),
            ("connect_timeout", self.connect_timeout),
            ("discovery_timeout", self.discovery_timeout),
        ] {
            if value.is_zero() {
                return Err(Error::config(format!("{name} must be non-zero")));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_has_defaults() {
        let builder = ExporterBuilder::new();
        assert!(builder.binary.is_none());
        assert!(builder.debug_port.is_none());
        assert_eq!(builder.debug_host, "127.0.0.1");
        assert_eq!(builder.poll_interval, Duration::from_millis(300));
        assert_eq!(builder.ready_timeout, Duration::from_secs(30));
        assert_eq!(builder.settle_delay, Duration::from_secs(2));
        assert_eq!(builder.terminate_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_setters() {
        let builder = ExporterBuilder::new()
            .binary("/usr/bin/chromium")
            .debug_port(9333)
            .settle_delay(Duration::ZERO)
            .options(RendererOptions::bare());

        assert_eq!(builder.binary, Some(PathBuf::from("/usr/bin/chromium")));
        assert_eq!(builder.debug_port, Some(9333));
        assert!(builder.settle_delay.is_zero());
        assert_eq!(builder.options, RendererOptions::bare());
    }

    #[test]
    fn test_build_with_existing_binary() {
        let exporter = ExporterBuilder::new()
            .binary("/bin/sh")
            .settle_delay(Duration::ZERO)
            .build()
            .expect("build");
        assert_eq!(exporter.settings().binary, PathBuf::from("/bin/sh"));
        assert!(exporter.settings().settle_delay.is_zero());
    }

    #[test]
    fn test_build_fails_with_nonexistent_binary() {
        let err = ExporterBuilder::new()
            .binary("/nonexistent/chromium")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::RendererNotFound { .. }));
    }

    #[test]
    fn test_build_rejects_zero_durations() {
        let err = ExporterBuilder::new()
            .binary("/bin/sh")
            .ready_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ready_timeout"));

        let err = ExporterBuilder::new()
            .binary("/bin/sh")
            .poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_rejects_port_zero_and_bad_options() {
        assert!(
            ExporterBuilder::new()
                .binary("/bin/sh")
                .debug_port(0)
                .build()
                .is_err()
        );
        assert!(
            ExporterBuilder::new()
                .binary("/bin/sh")
                .options(RendererOptions::new().with_window_size(0, 0))
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = ExporterBuilder::new().binary("/usr/bin/chromium");
        let cloned = builder.clone();
        assert_eq!(builder.binary, cloned.binary);
    }
}
