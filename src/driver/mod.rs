//! Exporter entry point.
//!
//! This module provides the caller-facing API.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Exporter`] | Runs captures with shared settings |
//! | [`ExporterBuilder`] | Fluent configuration builder |
//! | [`RendererOptions`] | Renderer launch flags |
//! | [`find_renderer`] | Locates an installed Chrome-family browser |
//!
//! # Example
//!
//! ```no_run
//! use headless_pdf::{CaptureJob, Exporter, Result};
//!
//! # async fn example() -> Result<()> {
//! let exporter = Exporter::builder().build()?;
//! exporter
//!     .export(CaptureJob::new("http://127.0.0.1:3031/", "out.pdf"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for exporter configuration.
pub mod builder;

/// Core exporter implementation.
pub mod core;

/// Renderer auto-detection.
pub mod locate;

/// Renderer launch options.
pub mod options;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ExporterBuilder;
pub use core::Exporter;
pub use locate::find_renderer;
pub use options::RendererOptions;
