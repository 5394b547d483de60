//! Typed commands sent to a debug target.
//!
//! Only the capture command is needed; [`Command`] still goes through an
//! enum so new commands slot in without touching call sites.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use serde::Serialize;
use serde_json::Value;

use crate::capture::CaptureJob;
use crate::error::{Error, Result};

// ============================================================================
// Command
// ============================================================================

/// Protocol commands this crate knows how to issue.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `Page.printToPDF`: render the current page as a PDF.
    PrintToPdf(PrintToPdfParams),
}

impl Command {
    /// Returns the wire method name.
    #[inline]
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::PrintToPdf(_) => "Page.printToPDF",
        }
    }

    /// Serializes the parameters into a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn params(&self) -> Result<Value> {
        let value = match self {
            Self::PrintToPdf(params) => serde_json::to_value(params)?,
        };
        Ok(value)
    }
}

// ============================================================================
// PrintToPdfParams
// ============================================================================

/// Parameters of `Page.printToPDF`. Lengths are in inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintToPdfParams {
    /// Print background graphics.
    pub print_background: bool,
    /// Prefer page size defined by CSS `@page`.
    #[serde(rename = "preferCSSPageSize")]
    pub prefer_css_page_size: bool,
    /// Render the browser's header and footer.
    pub display_header_footer: bool,
    /// Top margin.
    pub margin_top: f64,
    /// Bottom margin.
    pub margin_bottom: f64,
    /// Left margin.
    pub margin_left: f64,
    /// Right margin.
    pub margin_right: f64,
    /// Paper width.
    pub paper_width: f64,
    /// Paper height.
    pub paper_height: f64,
    /// Rendering scale factor.
    pub scale: f64,
}

impl From<&CaptureJob> for PrintToPdfParams {
    fn from(job: &CaptureJob) -> Self {
        Self {
            print_background: job.print_background,
            prefer_css_page_size: job.prefer_css_page_size,
            display_header_footer: job.display_header_footer,
            margin_top: job.margins.top,
            margin_bottom: job.margins.bottom,
            margin_left: job.margins.left,
            margin_right: job.margins.right,
            paper_width: job.paper.width,
            paper_height: job.paper.height,
            scale: job.scale,
        }
    }
}

// ============================================================================
// Result Decoding
// ============================================================================

/// Extracts and decodes the base64 `data` field of a `Page.printToPDF` result.
///
/// # Errors
///
/// - [`Error::InvalidResponse`] if `data` is missing or not a string
/// - [`Error::Decode`] if `data` is not valid base64
/// - [`Error::EmptyResult`] if it decodes to zero bytes
pub fn decode_pdf_data(result: &Value) -> Result<Vec<u8>> {
    let data = result
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            let keys: Vec<&str> = result
                .as_object()
                .map(|map| map.keys().map(String::as_str).collect())
                .unwrap_or_default();
            Error::invalid_response(format!(
                "renderer did not return PDF data, result keys: {keys:?}"
            ))
        })?;

    let bytes = Base64Standard.decode(data)?;
    if bytes.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================
