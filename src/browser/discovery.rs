//! Target discovery over the renderer's HTTP control endpoint.
//!
//! The renderer lists its debuggable targets at `GET /json`. Until the
//! renderer has bound its debug port every request fails; callers poll.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use tracing::trace;

use crate::error::{Error, Result};

use super::target::DebugTarget;

// ============================================================================
// TargetDiscovery
// ============================================================================

/// HTTP client bound to one renderer's control endpoint.
#[derive(Debug, Clone)]
pub struct TargetDiscovery {
    client: Client,
    endpoint: String,
}

impl TargetDiscovery {
    /// Creates a discovery client for `http://{host}:{port}/json`.
    ///
    /// `timeout` bounds each request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).no_proxy().build()?;
        let host = if host.contains(':') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        Ok(Self {
            client,
            endpoint: format!("http://{host}:{port}/json"),
        })
    }

    /// Returns the URL that is queried.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetches the current target list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryUnreachable`] if the endpoint refuses the
    /// connection, times out, answers with a non-success status, or sends
    /// something that is not a target list.
    pub async fn list_targets(&self) -> Result<Vec<DebugTarget>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| Error::discovery_unreachable(&self.endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::discovery_unreachable(
                &self.endpoint,
                format!("HTTP status {status}"),
            ));
        }

        let targets: Vec<DebugTarget> = response
            .json()
            .await
            .map_err(|e| Error::discovery_unreachable(&self.endpoint, e.to_string()))?;

        trace!(endpoint = %self.endpoint, count = targets.len(), "Targets listed");
        Ok(targets)
    }
}

/// Fetches the target list of the renderer listening on `host:port`.
///
/// # Errors
///
/// See [`TargetDiscovery::list_targets`].
pub async fn list_targets(host: &str, port: u16, timeout: Duration) -> Result<Vec<DebugTarget>> {
    TargetDiscovery::new(host, port, timeout)?.list_targets().await
}

// ============================================================================
// Tests
// ============================================================================
