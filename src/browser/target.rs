//! Debug targets reported by the renderer's control endpoint.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::identifiers::TargetId;

// ============================================================================
// Constants
// ============================================================================

/// URL of a page that has not loaded anything yet.
pub const BLANK_PAGE_URL: &str = "about:blank";

/// Target kind of a top-level page.
pub const PAGE_KIND: &str = "page";

// ============================================================================
// DebugTarget
// ============================================================================

/// One debuggable entity listed by `GET /json`.
///
/// # Format
///
/// ```json
/// {
///   "id": "C0FFEE",
///   "type": "page",
///   "title": "Document",
///   "url": "http://127.0.0.1:3031/doc",
///   "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/page/C0FFEE"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DebugTarget {
    /// Target identifier.
    pub id: TargetId,

    /// Target kind (`page`, `service_worker`, `browser`, ...).
    #[serde(rename = "type")]
    pub kind: String,

    /// URL currently loaded in the target.
    #[serde(default)]
    pub url: String,

    /// Document title, if any.
    #[serde(default)]
    pub title: Option<String>,

    /// WebSocket endpoint; absent while another client is attached.
    #[serde(rename = "webSocketDebuggerUrl", default)]
    pub socket_address: Option<String>,
}

impl DebugTarget {
    /// Returns `true` if this target is a top-level page.
    #[inline]
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.kind == PAGE_KIND
    }

    /// Returns `true` if this target has navigated away from the blank page.
    #[inline]
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.url.is_empty() && self.url != BLANK_PAGE_URL
    }

    /// Returns the WebSocket URL to connect to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDebuggerUrl`] if the address is missing or is not
    /// a `ws://` URL.
    pub fn websocket_url(&self) -> Result<&str> {
        match self.socket_address.as_deref() {
            Some(address) if address.starts_with("ws://") => Ok(address),
            _ => Err(Error::NoDebuggerUrl {
                target_url: self.url.clone(),
            }),
        }
    }
}

// ============================================================================
// Selection
// ============================================================================

/// Returns the first page target that has loaded something.
///
/// This is the readiness predicate used while polling.
#[must_use]
pub fn ready_page_target(targets: &[DebugTarget]) -> Option<&DebugTarget> {
    targets
        .iter()
        .find(|target| target.is_page() && target.is_loaded())
}

/// Picks the target to attach to.
///
/// Prefers a loaded page; falls back to the first listed target.
///
/// # Errors
///
/// Returns [`Error::NoTargetsFound`] if `targets` is empty.
pub fn select_page_target(targets: Vec<DebugTarget>) -> Result<DebugTarget> {
    let index = targets
        .iter()
        .position(|target| target.is_page() && target.is_loaded())
        .unwrap_or(0);

    targets.into_iter().nth(index).ok_or(Error::NoTargetsFound)
}

// ============================================================================
// Tests
// ============================================================================
