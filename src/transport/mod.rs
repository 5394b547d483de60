//! WebSocket transport layer.
//!
//! This module implements the client half of RFC 6455 by hand: the opening
//! handshake, the frame codec and a connection type that keeps ping/pong
//! traffic away from callers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │ ProtocolClient  │                              │  Renderer       │
//! │                 │         WebSocket            │  (debug target) │
//! │  Transport      │─────────────────────────────►│                 │
//! │  → frame codec  │   ws://127.0.0.1:PORT/...    │  DevTools       │
//! │                 │◄─────────────────────────────│  endpoint       │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Transport::connect` - TCP connect + HTTP Upgrade handshake
//! 2. `Transport::send_message` - one masked text frame per message
//! 3. `Transport::receive_message` - next data frame, pings answered inline
//! 4. `Transport::close` - best-effort close frame
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connection` | WebSocket connection and receive loop |
//! | `deadline` | Absolute deadlines shared by a sequence of reads |
//! | `frame` | Frame encoding and decoding |
//! | `handshake` | HTTP Upgrade request and response parsing |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and receive loop.
pub mod connection;

/// Absolute deadlines for socket reads.
pub mod deadline;

/// WebSocket frame codec.
pub mod frame;

/// Client opening handshake.
pub mod handshake;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::Transport;
pub use deadline::Deadline;
pub use frame::{Frame, Opcode};
pub use handshake::WsUrl;
