//! Capture job configuration.
//!
//! A [`CaptureJob`] describes one export: which page, where the PDF goes and
//! how it is laid out. Lengths are in inches.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use headless_pdf::{CaptureJob, Margins, PaperSize};
//!
//! let job = CaptureJob::new("http://127.0.0.1:3031/?export=1", "out.pdf")
//!     .with_margins(Margins::uniform(0.4))
//!     .with_paper(PaperSize::A4)
//!     .with_timeout(Duration::from_secs(60));
//!
//! assert!(job.validate().is_ok());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default margin on every side.
pub const DEFAULT_MARGIN: f64 = 0.6;

/// Default time allowed for the capture command.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(30);

/// Smallest scale the renderer accepts.
pub const MIN_SCALE: f64 = 0.1;

/// Largest scale the renderer accepts.
pub const MAX_SCALE: f64 = 2.0;

// ============================================================================
// Margins
// ============================================================================

/// Page margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
}

impl Margins {
    /// Creates margins from explicit values.
    #[inline]
    #[must_use]
    pub const fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Same margin on every side.
    #[inline]
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    fn validate(&self) -> Result<()> {
        for (side, value) in [
            ("top", self.top),
            ("bottom", self.bottom),
            ("left", self.left),
            ("right", self.right),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid_argument(format!(
                    "{side} margin must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(DEFAULT_MARGIN)
    }
}

// ============================================================================
// PaperSize
// ============================================================================

/// Paper dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    /// Paper width.
    pub width: f64,
    /// Paper height.
    pub height: f64,
}

impl PaperSize {
    /// US Letter, 8.5 x 11 in.
    pub const LETTER: Self = Self::new(8.5, 11.0);

    /// US Legal, 8.5 x 14 in.
    pub const LEGAL: Self = Self::new(8.5, 14.0);

    /// ISO A4, 210 x 297 mm.
    pub const A4: Self = Self::new(8.27, 11.69);

    /// Creates a custom paper size.
    #[inline]
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Swaps width and height.
    #[inline]
    #[must_use]
    pub const fn landscape(self) -> Self {
        Self::new(self.height, self.width)
    }
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::LETTER
    }
}

// ============================================================================
// CaptureJob
// ============================================================================

/// Everything needed to export one page.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureJob {
    /// Page to render.
    pub page_url: String,
    /// Where the PDF is written.
    pub output_path: PathBuf,
    /// Page margins.
    pub margins: Margins,
    /// Print background colors and images.
    pub print_background: bool,
    /// Paper dimensions.
    pub paper: PaperSize,
    /// Rendering scale factor.
    pub scale: f64,
    /// Time allowed for the capture command.
    pub timeout: Duration,
    /// Let CSS `@page` rules override the paper size.
    pub prefer_css_page_size: bool,
    /// Render the browser's header and footer.
    pub display_header_footer: bool,
}

// ============================================================================
// CaptureJob - Constructors
// ============================================================================

impl CaptureJob {
    /// Creates a job with default layout settings.
    #[must_use]
    pub fn new(page_url: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            page_url: page_url.into(),
            output_path: output_path.into(),
            margins: Margins::default(),
            print_background: true,
            paper: PaperSize::default(),
            scale: 1.0,
            timeout: DEFAULT_CAPTURE_TIMEOUT,
            prefer_css_page_size: true,
            display_header_footer: false,
        }
    }
}

// ============================================================================
// CaptureJob - Builder Methods
// ============================================================================

impl CaptureJob {
    /// Sets the page margins.
    #[inline]
    #[must_use]
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Enables or disables background printing.
    #[inline]
    #[must_use]
    pub fn with_print_background(mut self, enabled: bool) -> Self {
        self.print_background = enabled;
        self
    }

    /// Sets the paper size.
    #[inline]
    #[must_use]
    pub fn with_paper(mut self, paper: PaperSize) -> Self {
        self.paper = paper;
        self
    }

    /// Sets the rendering scale.
    #[inline]
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the capture command timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Lets CSS `@page` size rules win over the configured paper.
    #[inline]
    #[must_use]
    pub fn with_prefer_css_page_size(mut self, enabled: bool) -> Self {
        self.prefer_css_page_size = enabled;
        self
    }

    /// Enables or disables the browser header and footer.
    #[inline]
    #[must_use]
    pub fn with_header_footer(mut self, enabled: bool) -> Self {
        self.display_header_footer = enabled;
        self
    }
}

// ============================================================================
// CaptureJob - Validation
// ============================================================================

impl CaptureJob {
    /// Checks the job before any process is started.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `page_url` is not an absolute URL
    /// - [`Error::InvalidArgument`] for an empty output path, negative
    ///   margins, a non-positive paper size, a scale outside 0.1..=2.0 or a
    ///   zero timeout
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.page_url).map_err(|e| Error::invalid_url(&self.page_url, e.to_string()))?;

        if self.output_path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("output path is empty"));
        }

        self.margins.validate()?;

        let PaperSize { width, height } = self.paper;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(Error::invalid_argument(format!(
                "paper size must be positive, got {width} x {height}"
            )));
        }

        if !(MIN_SCALE..=MAX_SCALE).contains(&self.scale) {
            return Err(Error::invalid_argument(format!(
                "scale must be between {MIN_SCALE} and {MAX_SCALE}, got {}",
                self.scale
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::invalid_argument("capture timeout must be non-zero"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
