//! WebSocket opening handshake (client side).
//!
//! Sends an HTTP/1.1 Upgrade request and reads the response header block
//! line by line. The status line must carry `101`; when the server sends
//! `Sec-WebSocket-Accept` it is checked against the key we sent.

// ============================================================================
// Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;
use rustc_hash::FxHashMap;
use sha1::{Digest, Sha1};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};
use url::{Host, Url};

use crate::error::{Error, Result};

use super::Deadline;

// ============================================================================
// Constants
// ============================================================================

/// GUID appended to the client key when computing the accept value.
const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Upper bound on the response header block.
const MAX_RESPONSE_HEADER_BYTES: usize = 16 * 1024;

// ============================================================================
// WsUrl
// ============================================================================

/// A parsed `ws://host:port/path` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsUrl {
    /// Host to open the TCP connection to (IPv6 without brackets).
    host: String,
    /// Value for the `Host` header (IPv6 with brackets).
    host_header: String,
    /// TCP port.
    port: u16,
    /// Request target: path plus optional query.
    resource: String,
}

impl WsUrl {
    /// Parses a WebSocket URL.
    ///
    /// Only the plain `ws` scheme is accepted; the port defaults to 80.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the URL is malformed, uses another
    /// scheme or has no host.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e.to_string()))?;

        if url.scheme() != "ws" {
            return Err(Error::invalid_url(
                raw,
                format!("unsupported scheme '{}', expected 'ws'", url.scheme()),
            ));
        }

        let (host, host_header) = match url.host() {
            Some(Host::Domain(domain)) => (domain.to_string(), domain.to_string()),
            Some(Host::Ipv4(addr)) => (addr.to_string(), addr.to_string()),
            Some(Host::Ipv6(addr)) => (addr.to_string(), format!("[{addr}]")),
            None => return Err(Error::invalid_url(raw, "missing host")),
        };

        let port = url.port_or_known_default().unwrap_or(80);

        let mut resource = url.path().to_string();
        if resource.is_empty() {
            resource.push('/');
        }
        if let Some(query) = url.query() {
            resource.push('?');
            resource.push_str(query);
        }

        Ok(Self {
            host,
            host_header,
            port,
            resource,
        })
    }

    /// Returns the host to connect to.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[inline]
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns the request target (path and query).
    #[inline]
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the `Host` header value.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host_header, self.port)
    }
}

// ============================================================================
// Key Handling
// ============================================================================

/// Generates a fresh `Sec-WebSocket-Key`: 16 random bytes, base64-encoded.
#[must_use]
pub fn generate_key() -> String {
    let nonce: [u8; 16] = rand::random();
    Base64Standard.encode(nonce)
}

/// Computes the `Sec-WebSocket-Accept` value the server must answer with.
#[must_use]
pub fn expected_accept(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    Base64Standard.encode(hasher.finalize())
}

/// Builds the HTTP/1.1 Upgrade request.
#[must_use]
pub fn build_request(url: &WsUrl, key: &str) -> String {
    format!(
        "GET {resource} HTTP/1.1\r\n\
         Host: {authority}\r\n\
         Upgrade: websocket\r\n\
         Connection: Upgrade\r\n\
         Sec-WebSocket-Key: {key}\r\n\
         Sec-WebSocket-Version: 13\r\n\
         \r\n",
        resource = url.resource(),
        authority = url.authority(),
    )
}

// ============================================================================
// Handshake
// ============================================================================

/// Performs the client handshake over an already connected stream.
///
/// The stream must be buffered: any bytes the server sends after the
/// header block stay in the buffer for frame decoding.
///
/// # Errors
///
/// - [`Error::Handshake`] if the server closes early, answers with a status
///   other than 101, sends an oversized header block or a wrong accept key
/// - [`Error::Timeout`] if `deadline` passes first
pub async fn perform<S>(stream: &mut S, url: &WsUrl, deadline: &Deadline) -> Result<()>
where
    S: AsyncBufRead + AsyncWrite + Unpin,
{
    let key = generate_key();
    let request = build_request(url, &key);

    deadline
        .run("websocket handshake", async {
            stream.write_all(request.as_bytes()).await?;
            stream.flush().await?;
            trace!(resource = %url.resource(), "Upgrade request sent");

            let (status_line, headers) = read_response_head(stream).await?;
            check_status(&status_line)?;

            if let Some(accept) = headers.get("sec-websocket-accept") {
                let expected = expected_accept(&key);
                if accept != &expected {
                    return Err(Error::handshake(format!(
                        "Sec-WebSocket-Accept mismatch: got {accept}, expected {expected}"
                    )));
                }
            }

            debug!(host = %url.host(), port = url.port(), "WebSocket handshake completed");
            Ok(())
        })
        .await
}

/// Reads the status line and headers up to the blank line terminator.
async fn read_response_head<S>(stream: &mut S) -> Result<(String, FxHashMap<String, String>)>
where
    S: AsyncBufRead + Unpin,
{
    let mut consumed = 0usize;
    let mut status_line: Option<String> = None;
    let mut headers = FxHashMap::default();

    loop {
        let remaining = MAX_RESPONSE_HEADER_BYTES.saturating_sub(consumed);
        if remaining == 0 {
            return Err(Error::handshake("response header block too large"));
        }

        let mut raw = Vec::new();
        let read = (&mut *stream)
            .take(remaining as u64)
            .read_until(b'\n', &mut raw)
            .await?;

        if read == 0 {
            return Err(Error::handshake("connection closed during handshake"));
        }
        consumed += read;

        if raw.last() != Some(&b'\n') {
            // Either the size cap cut the line or the stream ended mid-line.
            return Err(Error::handshake("incomplete response header line"));
        }

        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\r', '\n']);

        if line.is_empty() {
            break;
        }

        match status_line {
            None => status_line = Some(line.to_string()),
            Some(_) => {
                if let Some((name, value)) = line.split_once(':') {
                    headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
                }
            }
        }
    }

    let status_line = status_line.ok_or_else(|| Error::handshake("empty response"))?;
    Ok((status_line, headers))
}

/// Rejects any status line whose code is not 101.
fn check_status(status_line: &str) -> Result<()> {
    let code = status_line.split_whitespace().nth(1);
    if code == Some("101") {
        Ok(())
    } else {
        Err(Error::handshake(format!("upgrade rejected: {status_line}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
