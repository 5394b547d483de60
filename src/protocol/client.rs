//! JSON-RPC client over a WebSocket [`Transport`].
//!
//! Assigns request ids, sends requests and matches responses back to them.
//!
//! # Correlation
//!
//! | Incoming message | Action |
//! |------------------|--------|
//! | response for the awaited id | returned to the caller |
//! | response for another pending id | stashed until that id is awaited |
//! | response for an unknown id | discarded |
//! | event (no `id`) | logged and discarded |
//! | unparseable text | logged and skipped |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::transport::{Deadline, Transport};

use super::command::Command;
use super::event::Incoming;
use super::request::{Request, Response};

// ============================================================================
// Constants
// ============================================================================

/// Maximum pending requests before rejecting new ones.
const MAX_PENDING_REQUESTS: usize = 64;

// ============================================================================
// ProtocolClient
// ============================================================================

/// Request/response client bound to one debug target connection.
///
/// Owns its [`Transport`]. [`invoke`](Self::invoke) takes `&mut self`, so a
/// client never has two caller-issued calls in flight at once.
pub struct ProtocolClient<S = TcpStream> {
    transport: Transport<S>,
    /// Id given to the next request.
    next_id: RequestId,
    /// Ids sent but not yet answered.
    pending: FxHashSet<RequestId>,
    /// Responses that arrived while a different id was awaited.
    stash: FxHashMap<RequestId, Response>,
}

impl<S> fmt::Debug for ProtocolClient<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolClient")
            .field("transport", &self.transport)
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.len())
            .field("stashed", &self.stash.len())
            .finish()
    }
}

impl ProtocolClient<TcpStream> {
    /// Connects to a debug target's WebSocket URL.
    ///
    /// # Errors
    ///
    /// See [`Transport::connect`].
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let transport = Transport::connect(url, timeout).await?;
        Ok(Self::new(transport))
    }
}

// ============================================================================
// ProtocolClient - Public API
// ============================================================================

impl<S> ProtocolClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a client over an open transport. Ids start at 1.
    #[must_use]
    pub fn new(transport: Transport<S>) -> Self {
        Self {
            transport,
            next_id: RequestId::FIRST,
            pending: FxHashSet::default(),
            stash: FxHashMap::default(),
        }
    }

    /// Returns the number of requests sent but not yet answered.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Sends `method` and waits for its result.
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if the target answered with an error object
    /// - [`Error::ProtocolTimeout`] if no answer arrived within `timeout`
    /// - [`Error::ConnectionClosed`] or a framing error from the transport
    pub async fn invoke(&mut self, method: &str, params: Value, timeout: Duration) -> Result<Value> {
        let id = self.send_request(method, &params).await?;
        self.wait_for(id, timeout).await
    }

    /// Sends a typed [`Command`] and waits for its result.
    ///
    /// # Errors
    ///
    /// Same as [`invoke`](Self::invoke).
    pub async fn execute(&mut self, command: &Command, timeout: Duration) -> Result<Value> {
        let params = command.params()?;
        self.invoke(command.method(), params, timeout).await
    }

    /// Sends a request without waiting for the answer.
    ///
    /// The returned id must later be passed to [`wait_for`](Self::wait_for).
    ///
    /// # Errors
    ///
    /// - [`Error::Protocol`] if too many requests are pending
    /// - [`Error::ConnectionClosed`] or [`Error::Io`] if the send fails
    pub async fn send_request(&mut self, method: &str, params: &Value) -> Result<RequestId> {
        if self.pending.len() >= MAX_PENDING_REQUESTS {
            warn!(
                pending = self.pending.len(),
                max = MAX_PENDING_REQUESTS,
                "Too many pending requests"
            );
            return Err(Error::protocol(
                -1,
                format!(
                    "Too many pending requests: {}/{}",
                    self.pending.len(),
                    MAX_PENDING_REQUESTS
                ),
            ));
        }

        let id = self.next_id;
        self.next_id = id.next();

        let text = serde_json::to_string(&Request::new(id, method, params))?;
        self.transport.send_message(&text).await?;
        self.pending.insert(id);

        debug!(%id, method, "Request sent");
        Ok(id)
    }

    /// Waits for the response to `id`.
    ///
    /// Responses to other pending ids read in the meantime are kept for
    /// their own waiters.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `id` is not pending
    /// - [`Error::ProtocolTimeout`] if `timeout` elapses; `id` is forgotten
    /// - [`Error::Protocol`] if the target answered with an error object
    /// - transport errors otherwise
    pub async fn wait_for(&mut self, id: RequestId, timeout: Duration) -> Result<Value> {
        if let Some(response) = self.stash.remove(&id) {
            self.pending.remove(&id);
            trace!(%id, "Response taken from stash");
            return response.into_result();
        }
        if !self.pending.contains(&id) {
            return Err(Error::invalid_argument(format!(
                "request {id} is not pending"
            )));
        }

        let deadline = Deadline::after(timeout);

        loop {
            let bytes = match self.transport.receive_message(&deadline).await {
                Ok(bytes) => bytes,
                Err(Error::Timeout { .. }) => {
                    self.pending.remove(&id);
                    debug!(%id, timeout_ms = deadline.budget_ms(), "Request timed out");
                    return Err(Error::protocol_timeout(id, deadline.budget_ms()));
                }
                Err(e) => {
                    self.pending.remove(&id);
                    return Err(e);
                }
            };

            let response = match Incoming::parse(&bytes) {
                Ok(Incoming::Response(response)) => response,
                Ok(Incoming::Event(event)) => {
                    trace!(method = %event.method, "Event discarded");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, len = bytes.len(), "Unparseable message skipped");
                    continue;
                }
            };

            if response.id == id {
                self.pending.remove(&id);
                debug!(%id, error = response.is_error(), "Response received");
                return response.into_result();
            }

            if self.pending.contains(&response.id) {
                trace!(id = %response.id, awaiting = %id, "Response stashed");
                self.stash.insert(response.id, response);
            } else {
                warn!(id = %response.id, "Response for unknown request discarded");
            }
        }
    }

    /// Closes the underlying connection. Best effort.
    pub async fn close(&mut self) {
        self.pending.clear();
        self.stash.clear();
        self.transport.close().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
