//! Renderer command-line options.
//!
//! Provides a type-safe interface for the flags passed to a Chromium-family
//! renderer such as headless mode and window size.
//!
//! # Example
//!
//! ```
//! use headless_pdf::RendererOptions;
//!
//! let options = RendererOptions::new()
//!     .with_window_size(1920, 1080)
//!     .with_arg("--hide-scrollbars");
//!
//! let args = options.to_args();
//! assert!(args.contains(&"--window-size=1920,1080".to_string()));
//! ```

// ============================================================================
// Imports
// ============================================================================

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default window size; page layout depends on it even when headless.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1200, 800);

// ============================================================================
// RendererOptions
// ============================================================================

/// Renderer process configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererOptions {
    /// Run without a GUI (`--headless=new`).
    pub headless: bool,

    /// Disable GPU acceleration.
    pub disable_gpu: bool,

    /// Skip first-run and default-browser prompts.
    pub skip_first_run: bool,

    /// Disable installed browser extensions.
    pub disable_extensions: bool,

    /// Window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// Additional custom command-line arguments.
    pub extra_args: Vec<String>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl RendererOptions {
    /// Creates options with the defaults used for PDF export.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            headless: true,
            disable_gpu: true,
            skip_first_run: true,
            disable_extensions: true,
            window_size: Some(DEFAULT_WINDOW_SIZE),
            extra_args: Vec::new(),
        }
    }

    /// Creates options with no flags at all.
    #[inline]
    #[must_use]
    pub const fn bare() -> Self {
        Self {
            headless: false,
            disable_gpu: false,
            skip_first_run: false,
            disable_extensions: false,
            window_size: None,
            extra_args: Vec::new(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl RendererOptions {
    /// Enables or disables headless mode.
    #[inline]
    #[must_use]
    pub fn with_headless(mut self, enabled: bool) -> Self {
        self.headless = enabled;
        self
    }

    /// Enables or disables GPU acceleration.
    #[inline]
    #[must_use]
    pub fn with_gpu(mut self, enabled: bool) -> Self {
        self.disable_gpu = !enabled;
        self
    }

    /// Enables or disables installed extensions.
    #[inline]
    #[must_use]
    pub fn with_extensions(mut self, enabled: bool) -> Self {
        self.disable_extensions = !enabled;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl RendererOptions {
    /// Converts options to renderer command-line arguments.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(6 + self.extra_args.len());

        if self.headless {
            args.push("--headless=new".to_string());
        }

        if self.disable_gpu {
            args.push("--disable-gpu".to_string());
        }

        if self.skip_first_run {
            args.push("--no-first-run".to_string());
            args.push("--no-default-browser-check".to_string());
        }

        if self.disable_extensions {
            args.push("--disable-extensions".to_string());
        }

        if let Some((width, height)) = self.window_size {
            args.push(format!("--window-size={width},{height}"));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validates the options configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for a zero window dimension or an extra
    /// argument that would override the debug port or profile directory.
    pub fn validate(&self) -> Result<()> {
        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err(Error::config("Window dimensions must be greater than zero"));
        }

        for arg in &self.extra_args {
            if arg.starts_with("--remote-debugging-port") || arg.starts_with("--user-data-dir") {
                return Err(Error::config(format!(
                    "{arg} is managed by the exporter; use ExporterBuilder instead"
                )));
            }
        }

        Ok(())
    }

    /// Returns `true` if headless mode is enabled.
    #[inline]
    #[must_use]
    pub const fn is_headless(&self) -> bool {
        self.headless
    }
}

// ============================================================================
// Tests
// ============================================================================
