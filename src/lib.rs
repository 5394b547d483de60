//! headless-pdf - Print a running web page to PDF with a headless browser.
//!
//! This library launches a Chrome-family renderer with remote debugging
//! enabled, waits for the page to load, and asks it for a PDF over the
//! DevTools protocol.
//!
//! # Architecture
//!
//! The exporter talks to the renderer over two channels:
//!
//! - **HTTP control endpoint**: `GET /json` lists debuggable targets
//! - **WebSocket**: JSON-RPC commands to one target
//!
//! Key design principles:
//!
//! - The WebSocket handshake and frame codec are implemented here, not
//!   pulled from a WebSocket crate
//! - Every socket read is bounded by an absolute deadline
//! - Each export owns its renderer process, port and profile
//! - The renderer is always terminated, including on cancellation
//!
//! # Quick Start
//!
//! ```no_run
//! use headless_pdf::{CaptureJob, Exporter, Margins, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let exporter = Exporter::builder()
//!         .binary("/usr/bin/chromium")
//!         .build()?;
//!
//!     let job = CaptureJob::new("http://127.0.0.1:3031/?export=1", "doc.pdf")
//!         .with_margins(Margins::uniform(0.5));
//!
//!     let report = exporter.export(job).await?;
//!     println!("Wrote {} bytes in {:?}", report.bytes, report.elapsed);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Debug target discovery |
//! | [`capture`] | Capture job, orchestrator and process lifecycle |
//! | [`driver`] | [`Exporter`] and its configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | JSON-RPC messages and client |
//! | [`transport`] | WebSocket handshake, framing and connection |

// ============================================================================
// Modules
// ============================================================================

/// Debug target discovery over the renderer's HTTP endpoint.
pub mod browser;

/// Capture pipeline: job, orchestrator, process and profile.
pub mod capture;

/// Exporter factory and configuration.
///
/// Use [`Exporter::builder()`] to create a configured exporter.
pub mod driver;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// JSON-RPC message types and client.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{DebugTarget, TargetDiscovery};

// Capture types
pub use capture::{CaptureJob, CaptureReport, CaptureState, Margins, PaperSize};

// Driver types
pub use driver::{Exporter, ExporterBuilder, RendererOptions, find_renderer};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{RequestId, TargetId};

// Protocol types
pub use protocol::ProtocolClient;

// Transport types
pub use transport::Transport;
