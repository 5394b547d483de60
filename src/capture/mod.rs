//! Capture pipeline.
//!
//! Turns a [`CaptureJob`] into a PDF on disk by launching a renderer,
//! waiting for the page, and issuing the print command over the protocol
//! client.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CaptureJob`] | What to print and how |
//! | [`CaptureOrchestrator`] | One export, launch to cleanup |
//! | [`CaptureState`] | Orchestrator lifecycle |
//! | [`CaptureSettings`] | Renderer path, flags and timing |
//! | [`ProcessGuard`] | Owns the renderer process |
//! | [`RendererProfile`] | Temporary user-data directory |

// ============================================================================
// Submodules
// ============================================================================

/// Job description and validation.
pub mod job;

/// Export state machine.
pub mod orchestrator;

/// Renderer process guard.
pub mod process;

/// Renderer profile directory.
pub mod profile;

/// Settings shared by all captures of an exporter.
pub mod settings;

/// Lifecycle states.
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use job::{CaptureJob, Margins, PaperSize};
pub use orchestrator::{CaptureOrchestrator, CaptureReport};
pub use process::ProcessGuard;
pub use profile::RendererProfile;
pub use settings::CaptureSettings;
pub use state::CaptureState;
