//! Debug target discovery.
//!
//! A renderer started with `--remote-debugging-port` lists its targets at
//! `GET /json`. This module fetches that list and picks the page to attach
//! to.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DebugTarget`] | One listed target |
//! | [`TargetDiscovery`] | HTTP client for the control endpoint |
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use headless_pdf::browser::{TargetDiscovery, select_page_target};
//!
//! # async fn example() -> headless_pdf::Result<()> {
//! let discovery = TargetDiscovery::new("127.0.0.1", 9222, Duration::from_secs(2))?;
//! let target = select_page_target(discovery.list_targets().await?)?;
//! println!("{}", target.websocket_url()?);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// HTTP control endpoint client.
pub mod discovery;

/// Target type and selection rules.
pub mod target;

// ============================================================================
// Re-exports
// ============================================================================

pub use discovery::{TargetDiscovery, list_targets};
pub use target::{DebugTarget, ready_page_target, select_page_target};
