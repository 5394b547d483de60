//! Error types for headless-pdf.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use headless_pdf::{CaptureJob, Exporter, Result};
//!
//! async fn example(exporter: &Exporter) -> Result<()> {
//!     let job = CaptureJob::new("http://127.0.0.1:3031/?export=1", "out.pdf");
//!     exporter.export(job).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`], [`Error::RendererNotFound`] |
//! | Process | [`Error::ProcessLaunch`], [`Error::ProcessExited`] |
//! | Discovery | [`Error::DiscoveryUnreachable`], [`Error::NoTargetsFound`], [`Error::NoDebuggerUrl`], [`Error::ReadinessTimeout`] |
//! | Connection | [`Error::InvalidUrl`], [`Error::Handshake`], [`Error::ConnectionClosed`] |
//! | Framing | [`Error::TruncatedFrame`], [`Error::InvalidFrame`], [`Error::FrameTooLarge`] |
//! | Protocol | [`Error::Protocol`], [`Error::ProtocolTimeout`], [`Error::InvalidResponse`], [`Error::EmptyResult`] |
//! | Execution | [`Error::Timeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Decode`], [`Error::Http`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use base64::DecodeError;
use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes enough context to diagnose a failed export
/// without re-running it.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when exporter configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument in a capture job.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Renderer binary not found at path.
    #[error("Renderer not found at: {path}")]
    RendererNotFound {
        /// Path where the renderer was expected.
        path: PathBuf,
    },

    // ========================================================================
    // Process Errors
    // ========================================================================
    /// Failed to launch the renderer process.
    #[error("Failed to launch renderer: {message}")]
    ProcessLaunch {
        /// Description of the launch failure.
        message: String,
    },

    /// Renderer process exited before the capture finished.
    #[error("Renderer exited early: {status}")]
    ProcessExited {
        /// Exit status as reported by the OS.
        status: String,
    },

    // ========================================================================
    // Discovery Errors
    // ========================================================================
    /// The renderer's control endpoint could not be reached.
    ///
    /// Returned on connection refusal, timeout, or an unusable answer.
    #[error("Discovery endpoint {endpoint} unreachable: {message}")]
    DiscoveryUnreachable {
        /// The URL that was queried.
        endpoint: String,
        /// Underlying failure.
        message: String,
    },

    /// The control endpoint listed no targets at all.
    #[error("No debug targets found")]
    NoTargetsFound,

    /// The selected target exposes no usable WebSocket debugger URL.
    ///
    /// Usually means another DevTools client is already attached.
    #[error("Target has no WebSocket debugger URL (another DevTools client may be connected): {target_url}")]
    NoDebuggerUrl {
        /// Page URL of the target.
        target_url: String,
    },

    /// The page never became ready within the readiness window.
    #[error("Renderer failed to load the page within {timeout_ms}ms (last seen: {})", last_url.as_deref().unwrap_or("nothing"))]
    ReadinessTimeout {
        /// Last target URL observed while polling, if any.
        last_url: Option<String>,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// URL could not be parsed or uses an unsupported scheme.
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// WebSocket opening handshake failed or was rejected.
    #[error("WebSocket handshake failed: {message}")]
    Handshake {
        /// Description of the handshake failure.
        message: String,
    },

    /// WebSocket connection closed by the remote end.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Framing Errors
    // ========================================================================
    /// Stream ended before a frame field was complete.
    #[error("Truncated frame: stream closed while reading {expected} bytes")]
    TruncatedFrame {
        /// Bytes the decoder was waiting for.
        expected: usize,
    },

    /// Frame header is malformed or uses an unsupported feature.
    #[error("Invalid frame: {message}")]
    InvalidFrame {
        /// Description of the violation.
        message: String,
    },

    /// Declared payload length exceeds the decoder limit.
    #[error("Frame payload of {length} bytes exceeds limit of {max} bytes")]
    FrameTooLarge {
        /// Declared payload length.
        length: u64,
        /// Maximum accepted payload length.
        max: u64,
    },

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The remote end answered a command with an error object.
    #[error("Protocol error {code}: {message}")]
    Protocol {
        /// Error code from the remote end.
        code: i64,
        /// Error message from the remote end.
        message: String,
    },

    /// No response to a command within its timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    ProtocolTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// A response was well-formed JSON but not the expected shape.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Description of what was missing or wrong.
        message: String,
    },

    /// The renderer reported success but produced no bytes.
    #[error("Renderer produced an empty PDF")]
    EmptyResult,

    // ========================================================================
    // Execution Errors
    // ========================================================================
    /// Operation timeout.
    #[error("Timeout after {timeout_ms}ms: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Decode(#[from] DecodeError),

    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a renderer not found error.
    #[inline]
    pub fn renderer_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RendererNotFound { path: path.into() }
    }

    /// Creates a process launch error.
    #[inline]
    pub fn process_launch(err: IoError) -> Self {
        Self::ProcessLaunch {
            message: err.to_string(),
        }
    }

    /// Creates a discovery unreachable error.
    #[inline]
    pub fn discovery_unreachable(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DiscoveryUnreachable {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a handshake error.
    #[inline]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }

    /// Creates an invalid frame error.
    #[inline]
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }

    /// Creates a protocol error from a remote error object.
    #[inline]
    pub fn protocol(code: i64, message: impl Into<String>) -> Self {
        Self::Protocol {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[inline]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a timeout error.
    #[inline]
    pub fn timeout(operation: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Creates a protocol timeout error.
    #[inline]
    pub fn protocol_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::ProtocolTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::ProtocolTimeout { .. } | Self::ReadinessTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Handshake { .. }
                | Self::ConnectionClosed
                | Self::TruncatedFrame { .. }
                | Self::DiscoveryUnreachable { .. }
        )
    }

    /// Returns `true` if the remote end answered but the answer was unusable.
    #[inline]
    #[must_use]
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::Protocol { .. } | Self::InvalidResponse { .. } | Self::EmptyResult
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        let err = Error::handshake("status 403");
        assert_eq!(err.to_string(), "WebSocket handshake failed: status 403");
    }

    #[test]
    fn test_protocol_error_display() {
        let err = Error::protocol(-32000, "Printing failed");
        assert_eq!(err.to_string(), "Protocol error -32000: Printing failed");
    }

    #[test]
    fn test_readiness_timeout_mentions_last_url() {
        let err = Error::ReadinessTimeout {
            last_url: Some("about:blank".into()),
            timeout_ms: 30_000,
        };
        let text = err.to_string();
        assert!(text.contains("about:blank"));
        assert!(text.contains("30000ms"));

        let err = Error::ReadinessTimeout {
            last_url: None,
            timeout_ms: 10,
        };
        assert!(err.to_string().contains("last seen: nothing"));
    }

    #[test]
    fn test_is_timeout() {
        let timeout_err = Error::protocol_timeout(RequestId::new(1), 2000);
        let other_err = Error::handshake("test");

        assert!(timeout_err.is_timeout());
        assert!(Error::timeout("receive message", 5).is_timeout());
        assert!(!other_err.is_timeout());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::handshake("test").is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::TruncatedFrame { expected: 2 }.is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_protocol_error() {
        assert!(Error::EmptyResult.is_protocol_error());
        assert!(Error::protocol(1, "x").is_protocol_error());
        assert!(!Error::ConnectionClosed.is_protocol_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
