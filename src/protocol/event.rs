//! Incoming message classification.
//!
//! Everything the debug target sends is either a [`Response`] to one of our
//! requests (it carries an `id`) or an unsolicited [`Event`] (it does not).

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::identifiers::RequestId;

use super::request::{RemoteError, Response};

// ============================================================================
// Event
// ============================================================================

/// An unsolicited notification from the debug target.
///
/// # Format
///
/// ```json
/// { "method": "Page.loadEventFired", "params": { ... } }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Event name in `Domain.eventName` format.
    pub method: String,

    /// Event-specific data.
    #[serde(default)]
    pub params: Value,
}

impl Event {
    /// Returns the domain part of the method.
    #[inline]
    #[must_use]
    pub fn domain(&self) -> &str {
        self.method.split('.').next().unwrap_or_default()
    }
}

// ============================================================================
// Incoming
// ============================================================================

/// A decoded message received from the debug target.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// Answer to a request.
    Response(Response),
    /// Unsolicited notification.
    Event(Event),
}

/// Raw shape shared by responses and events.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Value,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RemoteError>,
}

impl Incoming {
    /// Parses one message payload.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if the payload is not a JSON object of
    /// the expected shape.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw: RawMessage = serde_json::from_slice(bytes)?;

        Ok(match raw.id {
            Some(id) => Self::Response(Response {
                id,
                result: raw.result,
                error: raw.error,
            }),
            None => Self::Event(Event {
                method: raw.method.unwrap_or_default(),
                params: raw.params,
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_parsing() {
        let incoming =
            Incoming::parse(br#"{"method": "Page.loadEventFired", "params": {"timestamp": 1.5}}"#)
                .expect("parse");

        match incoming {
            Incoming::Event(event) => {
                assert_eq!(event.method, "Page.loadEventFired");
                assert_eq!(event.domain(), "Page");
                assert_eq!(event.params["timestamp"], 1.5);
            }
            Incoming::Response(_) => panic!("expected event"),
        }
    }

    #[test]
    fn test_response_parsing() {
        let incoming = Incoming::parse(br#"{"id": 4, "result": {}}"#).expect("parse");
        match incoming {
            Incoming::Response(response) => assert_eq!(response.id, RequestId::new(4)),
            Incoming::Event(_) => panic!("expected response"),
        }
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Incoming::parse(b"not json").is_err());
        assert!(Incoming::parse(br#"{"id": "abc"}"#).is_err());
    }
}
