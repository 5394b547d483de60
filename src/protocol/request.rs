//! Request and Response message types.
//!
//! Defines the JSON-RPC message format for commands sent to a debug target
//! and the answers it sends back.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// Request
// ============================================================================

/// A command request from the client to the debug target.
///
/// # Format
///
/// ```json
/// {
///   "id": 1,
///   "method": "Domain.methodName",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request<'a> {
    /// Identifier for request/response correlation.
    pub id: RequestId,

    /// Method in `Domain.methodName` format.
    pub method: &'a str,

    /// Method parameters.
    pub params: &'a Value,
}

impl<'a> Request<'a> {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub const fn new(id: RequestId, method: &'a str, params: &'a Value) -> Self {
        Self { id, method, params }
    }
}

// ============================================================================
// Response
// ============================================================================

/// A response from the debug target.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 1, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error object (if error).
    #[serde(default)]
    pub error: Option<RemoteError>,
}

impl Response {
    /// Returns `true` if this is an error response.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extracts the result value, returning error if response was error.
    ///
    /// A success response without a `result` field yields `null`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the response carried an error object.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(Error::protocol(error.code, error.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

// ============================================================================
// RemoteError
// ============================================================================

/// Error object carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteError {
    /// Numeric error code.
    pub code: i64,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Tests
// ============================================================================
