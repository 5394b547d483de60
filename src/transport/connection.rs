//! WebSocket connection to a debug target.
//!
//! A [`Transport`] owns one upgraded stream. It sends unfragmented masked
//! text frames and hands back data frames, answering pings and swallowing
//! pongs along the way.
//!
//! # Receive Loop
//!
//! | Frame | Action |
//! |-------|--------|
//! | Ping | reply with a pong carrying the same payload, keep reading |
//! | Pong | discard, keep reading |
//! | Close | echo a close frame, fail with [`Error::ConnectionClosed`] |
//! | Text / Binary | return the payload |
//!
//! One absolute deadline bounds the whole loop, so a stream of pings can
//! never stretch a receive beyond it.
//!
//! A deadline that passes before a frame starts leaves the connection
//! usable. Any failure once a frame has started arriving closes it, since
//! the stream no longer sits on a frame boundary.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::Deadline;
use super::frame::{self, Opcode};
use super::handshake::{self, WsUrl};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for writing a single frame.
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound for the best-effort close exchange.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

// ============================================================================
// Transport
// ============================================================================

/// One client-side WebSocket connection.
///
/// Generic over the byte stream so tests can run it over in-memory pipes;
/// [`Transport::connect`] produces a `Transport<TcpStream>`.
pub struct Transport<S = TcpStream> {
    /// Buffered stream; bytes read past the handshake stay here.
    stream: BufReader<S>,
    /// Set once a close frame was seen or sent, or a frame read or write
    /// failed partway through.
    closed: bool,
}

impl<S> fmt::Debug for Transport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Transport - Connect
// ============================================================================

impl Transport<TcpStream> {
    /// Opens a TCP connection to `url` and performs the WebSocket handshake.
    ///
    /// `timeout` bounds both the TCP connect and the handshake.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is not `ws://host[:port]/path`
    /// - [`Error::Handshake`] if the TCP connect fails or the upgrade is rejected
    /// - [`Error::Timeout`] if `timeout` elapses
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self> {
        let ws_url = WsUrl::parse(url)?;
        let deadline = Deadline::after(timeout);

        let tcp = deadline
            .run("tcp connect", async {
                TcpStream::connect((ws_url.host(), ws_url.port()))
                    .await
                    .map_err(|e| {
                        Error::handshake(format!("connect to {} failed: {e}", ws_url.authority()))
                    })
            })
            .await?;
        tcp.set_nodelay(true)?;

        debug!(url, "TCP connection established");

        let mut stream = BufReader::new(tcp);
        handshake::perform(&mut stream, &ws_url, &deadline).await?;

        Ok(Self {
            stream,
            closed: false,
        })
    }
}

// ============================================================================
// Transport - Public API
// ============================================================================

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a stream on which the WebSocket handshake already happened.
    #[must_use]
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
            closed: false,
        }
    }

    /// Performs the client handshake over an arbitrary connected stream.
    ///
    /// # Errors
    ///
    /// Same as [`Transport::connect`] minus the TCP part.
    pub async fn handshake(stream: S, url: &str, timeout: Duration) -> Result<Self> {
        let ws_url = WsUrl::parse(url)?;
        let deadline = Deadline::after(timeout);
        let mut stream = BufReader::new(stream);
        handshake::perform(&mut stream, &ws_url, &deadline).await?;
        Ok(Self {
            stream,
            closed: false,
        })
    }

    /// Returns `true` once the connection saw or sent a close frame.
    #[inline]
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sends `text` as a single unfragmented text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the connection was closed
    /// - [`Error::Io`] or [`Error::Timeout`] if the write fails
    pub async fn send_message(&mut self, text: &str) -> Result<()> {
        self.ensure_open()?;
        let deadline = Deadline::after(WRITE_TIMEOUT);
        self.write_frame(Opcode::Text, text.as_bytes(), &deadline)
            .await?;
        trace!(len = text.len(), "Message sent");
        Ok(())
    }

    /// Reads frames until a data frame arrives or `deadline` passes.
    ///
    /// Pings are answered and pongs dropped without surfacing either.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] on a close frame, or if an earlier
    ///   call left the connection closed
    /// - [`Error::Timeout`] if `deadline` passes first; the connection stays
    ///   open only if no byte of the next frame had arrived
    /// - [`Error::TruncatedFrame`] / [`Error::InvalidFrame`] on bad framing,
    ///   including fragmented data frames; the connection is closed
    pub async fn receive_message(&mut self, deadline: &Deadline) -> Result<Vec<u8>> {
        self.ensure_open()?;

        loop {
            self.await_frame_start(deadline).await?;
            let frame = match frame::decode(&mut self.stream, deadline).await {
                Ok(frame) => frame,
                Err(e) => {
                    // Part of the frame is gone; later reads would start mid-frame.
                    self.closed = true;
                    debug!(error = %e, "Frame read failed, connection unusable");
                    return Err(e);
                }
            };

            match frame.opcode {
                Opcode::Ping => {
                    trace!(len = frame.payload.len(), "Ping received, sending pong");
                    self.write_frame(Opcode::Pong, &frame.payload, deadline)
                        .await?;
                }
                Opcode::Pong => {
                    trace!(len = frame.payload.len(), "Unsolicited pong dropped");
                }
                Opcode::Close => {
                    debug!(payload = ?frame.payload, "WebSocket closed by remote");
                    let code = &frame.payload[..frame.payload.len().min(2)];
                    let reply = Deadline::after(CLOSE_TIMEOUT);
                    if let Err(e) = self.write_frame(Opcode::Close, code, &reply).await {
                        trace!(error = %e, "Failed to echo close frame");
                    }
                    self.closed = true;
                    return Err(Error::ConnectionClosed);
                }
                Opcode::Text | Opcode::Binary => {
                    if !frame.fin {
                        self.closed = true;
                        return Err(Error::invalid_frame(
                            "fragmented messages are not supported",
                        ));
                    }
                    trace!(len = frame.payload.len(), opcode = ?frame.opcode, "Message received");
                    return Ok(frame.payload);
                }
            }
        }
    }

    /// Sends a close frame and shuts the stream down.
    ///
    /// Best effort: errors are logged, never returned.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let deadline = Deadline::after(CLOSE_TIMEOUT);
        // 1000 = normal closure
        if let Err(e) = self
            .write_frame(Opcode::Close, &1000u16.to_be_bytes(), &deadline)
            .await
        {
            trace!(error = %e, "Failed to send close frame");
        }
        if let Err(e) = self.stream.get_mut().shutdown().await {
            trace!(error = %e, "Failed to shut down stream");
        }
        debug!("WebSocket connection closed");
    }
}

// ============================================================================
// Transport - Internal
// ============================================================================

impl<S> Transport<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    /// Waits until the first byte of the next frame is buffered.
    ///
    /// Consumes nothing, so a timeout here leaves the stream on a frame
    /// boundary and the connection usable.
    async fn await_frame_start(&mut self, deadline: &Deadline) -> Result<()> {
        let stream = &mut self.stream;
        let buffered = deadline
            .run("read frame", async { Ok(stream.fill_buf().await?.len()) })
            .await?;

        if buffered == 0 {
            self.closed = true;
            return Err(Error::TruncatedFrame { expected: 2 });
        }
        Ok(())
    }

    /// Encodes and writes one frame before `deadline`.
    ///
    /// A failed write may leave half a frame on the wire, so it also marks
    /// the connection closed.
    async fn write_frame(&mut self, opcode: Opcode, payload: &[u8], deadline: &Deadline) -> Result<()> {
        let bytes = frame::encode(payload, opcode);
        let stream = self.stream.get_mut();
        let written = deadline
            .run("write frame", async {
                stream.write_all(&bytes).await?;
                stream.flush().await?;
                Ok(())
            })
            .await;

        if written.is_err() {
            self.closed = true;
        }
        written
    }
}

// ============================================================================
// Tests
// ============================================================================
