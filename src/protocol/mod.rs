//! JSON-RPC protocol layer.
//!
//! Message types exchanged with a debug target and the client that
//! correlates them.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Remote | Command request |
//! | `Response` | Remote → Local | Command result or error |
//! | `Event` | Remote → Local | Unsolicited notification (ignored) |
//!
//! # Command Naming
//!
//! Commands follow `Domain.methodName` format, e.g. `Page.printToPDF`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `client` | Request/response correlation |
//! | `command` | Typed commands and result decoding |
//! | `event` | Event type and incoming message classification |
//! | `request` | Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Request/response correlation over one connection.
pub mod client;

/// Typed commands.
pub mod command;

/// Event message types.
pub mod event;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::ProtocolClient;
pub use command::{Command, PrintToPdfParams, decode_pdf_data};
pub use event::{Event, Incoming};
pub use request::{RemoteError, Request, Response};
