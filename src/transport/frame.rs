//! WebSocket frame codec (RFC 6455 subset).
//!
//! Supports the five opcodes the DevTools protocol needs, client-to-server
//! masking, and all three payload length encodings:
//!
//! ```text
//!  0               1               2               3
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |F|R|R|R| opcode|M| Payload len |    Extended payload length    |
//! |I|S|S|S|  (4)  |A|     (7)     |           (16/64)             |
//! |N|V|V|V|       |S|             |                               |
//! +-+-+-+-+-------+-+-------------+-------------------------------+
//! |     Masking key (0 or 4 bytes)     |     Payload data ...     |
//! +------------------------------------+--------------------------+
//! ```
//!
//! Fragmentation, continuation frames and extensions are not supported;
//! the decoder rejects them instead of guessing.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

use super::Deadline;

// ============================================================================
// Constants
// ============================================================================

/// Largest payload the decoder will allocate for (256 MiB).
pub const MAX_PAYLOAD_LEN: u64 = 256 * 1024 * 1024;

/// Control frames carry at most 125 payload bytes.
const MAX_CONTROL_PAYLOAD: u64 = 125;

/// Base length value announcing a 16-bit extended length.
const LEN_16: u8 = 126;

/// Base length value announcing a 64-bit extended length.
const LEN_64: u8 = 127;

const FIN_BIT: u8 = 0x80;
const RSV_BITS: u8 = 0x70;
const OPCODE_BITS: u8 = 0x0F;
const MASK_BIT: u8 = 0x80;
const LEN_BITS: u8 = 0x7F;

// ============================================================================
// Opcode
// ============================================================================

/// Frame type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// UTF-8 text message.
    Text,
    /// Binary message.
    Binary,
    /// Connection close.
    Close,
    /// Keep-alive probe; must be answered with a pong.
    Ping,
    /// Keep-alive answer.
    Pong,
}

impl Opcode {
    /// Returns the wire value of this opcode.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Text => 0x1,
            Self::Binary => 0x2,
            Self::Close => 0x8,
            Self::Ping => 0x9,
            Self::Pong => 0xA,
        }
    }

    /// Parses a wire value, `None` for continuation and reserved opcodes.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x1 => Some(Self::Text),
            0x2 => Some(Self::Binary),
            0x8 => Some(Self::Close),
            0x9 => Some(Self::Ping),
            0xA => Some(Self::Pong),
            _ => None,
        }
    }

    /// Returns `true` for close, ping and pong.
    #[inline]
    #[must_use]
    pub const fn is_control(self) -> bool {
        match self {
            Self::Text | Self::Binary => false,
            Self::Close | Self::Ping | Self::Pong => true,
        }
    }
}

// ============================================================================
// Frame
// ============================================================================

/// One decoded WebSocket frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Final fragment flag.
    pub fin: bool,
    /// Frame type.
    pub opcode: Opcode,
    /// Unmasked payload.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Creates a final frame with the given opcode and payload.
    #[inline]
    #[must_use]
    pub fn new(opcode: Opcode, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            fin: true,
            opcode,
            payload: payload.into(),
        }
    }

    /// Encodes this frame for the client-to-server direction.
    #[inline]
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        encode(&self.payload, self.opcode)
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes `payload` as a single masked frame with a fresh random mask.
///
/// Encoding never fails. Control payloads over 125 bytes are still encoded
/// but [`decode`] rejects them; the transport only sends pongs echoing a
/// decoded ping and two-byte close codes.
#[must_use]
pub fn encode(payload: &[u8], opcode: Opcode) -> Vec<u8> {
    encode_with_mask(payload, opcode, random_mask())
}

/// Encodes `payload` as a single masked frame using `mask`.
#[must_use]
pub fn encode_with_mask(payload: &[u8], opcode: Opcode, mask: [u8; 4]) -> Vec<u8> {
    let len = payload.len();
    let mut out = Vec::with_capacity(len + 14);

    out.push(FIN_BIT | opcode.as_u8());

    if len < usize::from(LEN_16) {
        // Fits in the 7-bit field; the cast cannot truncate.
        out.push(MASK_BIT | len as u8);
    } else if let Ok(len16) = u16::try_from(len) {
        out.push(MASK_BIT | LEN_16);
        out.extend_from_slice(&len16.to_be_bytes());
    } else {
        out.push(MASK_BIT | LEN_64);
        out.extend_from_slice(&(len as u64).to_be_bytes());
    }

    out.extend_from_slice(&mask);

    let start = out.len();
    out.extend_from_slice(payload);
    apply_mask(&mut out[start..], mask);
    out
}

/// XORs `data` in place with the cycling 4-byte `mask`.
///
/// Masking and unmasking are the same operation.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// Generates a fresh masking key.
fn random_mask() -> [u8; 4] {
    rand::random()
}

// ============================================================================
// Decoding
// ============================================================================

/// Reads and decodes exactly one frame from `reader`.
///
/// # Errors
///
/// - [`Error::TruncatedFrame`] if the stream ends mid-frame
/// - [`Error::InvalidFrame`] for reserved bits, unsupported opcodes,
///   oversized or fragmented control frames
/// - [`Error::FrameTooLarge`] if the declared length exceeds [`MAX_PAYLOAD_LEN`]
/// - [`Error::Timeout`] if `deadline` passes first
pub async fn decode<R>(reader: &mut R, deadline: &Deadline) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 2];
    read_exact_into(reader, &mut header, deadline).await?;

    if header[0] & RSV_BITS != 0 {
        return Err(Error::invalid_frame("reserved bits set without a negotiated extension"));
    }

    let fin = header[0] & FIN_BIT != 0;
    let raw_opcode = header[0] & OPCODE_BITS;
    let opcode = Opcode::from_u8(raw_opcode)
        .ok_or_else(|| Error::invalid_frame(format!("unsupported opcode {raw_opcode:#x}")))?;

    let masked = header[1] & MASK_BIT != 0;
    let length = match header[1] & LEN_BITS {
        LEN_16 => {
            let mut ext = [0u8; 2];
            read_exact_into(reader, &mut ext, deadline).await?;
            u64::from(u16::from_be_bytes(ext))
        }
        LEN_64 => {
            let mut ext = [0u8; 8];
            read_exact_into(reader, &mut ext, deadline).await?;
            let value = u64::from_be_bytes(ext);
            if value >> 63 != 0 {
                return Err(Error::invalid_frame("64-bit length has its most significant bit set"));
            }
            value
        }
        short => u64::from(short),
    };

    if opcode.is_control() {
        if !fin {
            return Err(Error::invalid_frame("fragmented control frame"));
        }
        if length > MAX_CONTROL_PAYLOAD {
            return Err(Error::invalid_frame(format!(
                "control frame payload of {length} bytes exceeds {MAX_CONTROL_PAYLOAD}"
            )));
        }
    }

    if length > MAX_PAYLOAD_LEN {
        return Err(Error::FrameTooLarge {
            length,
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mask = if masked {
        let mut key = [0u8; 4];
        read_exact_into(reader, &mut key, deadline).await?;
        Some(key)
    } else {
        None
    };

    // Bounded by MAX_PAYLOAD_LEN above.
    let mut payload = read_exact_by(reader, length as usize, deadline).await?;
    if let Some(key) = mask {
        apply_mask(&mut payload, key);
    }

    Ok(Frame {
        fin,
        opcode,
        payload,
    })
}

// ============================================================================
// Exact Reads
// ============================================================================

/// Reads exactly `len` bytes before `deadline`.
///
/// # Errors
///
/// - [`Error::TruncatedFrame`] if the stream ends first
/// - [`Error::Timeout`] if the deadline passes first
pub async fn read_exact_by<R>(reader: &mut R, len: usize, deadline: &Deadline) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; len];
    read_exact_into(reader, &mut buf, deadline).await?;
    Ok(buf)
}

/// Fills `buf` completely before `deadline`.
pub(crate) async fn read_exact_into<R>(reader: &mut R, buf: &mut [u8], deadline: &Deadline) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let expected = buf.len();
    if expected == 0 {
        return Ok(());
    }

    deadline
        .run("read frame", async {
            match reader.read_exact(buf).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    Err(Error::TruncatedFrame { expected })
                }
                Err(e) => Err(Error::Io(e)),
            }
        })
        .await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use proptest::prelude::*;

    const ALL_OPCODES: [Opcode; 5] = [
        Opcode::Text,
        Opcode::Binary,
        Opcode::Close,
        Opcode::Ping,
        Opcode::Pong,
    ];

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    fn decode_bytes(bytes: &[u8]) -> Result<Frame> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let mut reader = bytes;
            decode(&mut reader, &deadline()).await
        })
    }

    fn payload_of(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_opcode_wire_values() {
        for opcode in ALL_OPCODES {
            assert_eq!(Opcode::from_u8(opcode.as_u8()), Some(opcode));
        }
        assert_eq!(Opcode::from_u8(0x0), None);
        assert_eq!(Opcode::from_u8(0x3), None);
        assert_eq!(Opcode::from_u8(0xB), None);
    }

    #[test]
    fn test_round_trip_at_length_boundaries() {
        for len in [0usize, 1, 125, 126, 65535, 65536] {
            for opcode in ALL_OPCODES {
                let payload = payload_of(len);
                let decoded = decode_bytes(&encode(&payload, opcode));

                if opcode.is_control() && len as u64 > MAX_CONTROL_PAYLOAD {
                    // Control frames are capped at 125 bytes on the wire.
                    let err = decoded.unwrap_err();
                    assert!(
                        matches!(err, Error::InvalidFrame { .. }),
                        "{opcode:?} len={len}: {err:?}"
                    );
                    continue;
                }

                let frame = decoded.expect("decode");
                assert_eq!(frame.opcode, opcode, "len={len}");
                assert_eq!(frame.payload, payload, "len={len}");
                assert!(frame.fin);
            }
        }
    }

    #[test]
    fn test_oversized_control_frames_are_rejected() {
        for opcode in [Opcode::Ping, Opcode::Pong, Opcode::Close] {
            let err = decode_bytes(&encode(&[7; 126], opcode)).unwrap_err();
            assert!(
                err.to_string().contains("126 bytes exceeds 125"),
                "{opcode:?}: {err}"
            );
        }
    }

    #[test]
    fn test_length_encoding_is_minimal() {
        let mask = [1, 2, 3, 4];

        let short = encode_with_mask(&payload_of(125), Opcode::Text, mask);
        assert_eq!(short[1] & LEN_BITS, 125);
        assert_eq!(short.len(), 2 + 4 + 125);

        let medium = encode_with_mask(&payload_of(126), Opcode::Text, mask);
        assert_eq!(medium[1] & LEN_BITS, LEN_16);
        assert_eq!(&medium[2..4], &126u16.to_be_bytes());

        let edge = encode_with_mask(&payload_of(65535), Opcode::Binary, mask);
        assert_eq!(edge[1] & LEN_BITS, LEN_16);

        let long = encode_with_mask(&payload_of(65536), Opcode::Binary, mask);
        assert_eq!(long[1] & LEN_BITS, LEN_64);
        assert_eq!(&long[2..10], &65536u64.to_be_bytes());
    }

    #[test]
    fn test_encode_sets_fin_opcode_and_mask() {
        let mask = [0xAA, 0xBB, 0xCC, 0xDD];
        let bytes = encode_with_mask(b"hello", Opcode::Text, mask);

        assert_eq!(bytes[0], 0x81);
        assert_eq!(bytes[1], MASK_BIT | 5);
        assert_eq!(&bytes[2..6], &mask);

        let mut body = bytes[6..].to_vec();
        assert_ne!(body, b"hello");
        apply_mask(&mut body, mask);
        assert_eq!(body, b"hello");
    }

    #[test]
    fn test_fresh_mask_per_frame() {
        let masks: Vec<[u8; 4]> = (0..8)
            .map(|_| {
                let bytes = encode(b"x", Opcode::Text);
                [bytes[2], bytes[3], bytes[4], bytes[5]]
            })
            .collect();
        assert!(masks.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn test_decode_unmasked_server_frame() {
        let bytes = [0x81, 0x02, b'o', b'k'];
        let frame = decode_bytes(&bytes).expect("decode");
        assert_eq!(frame, Frame::new(Opcode::Text, b"ok".to_vec()));
    }

    #[test]
    fn test_decode_close_frame_is_returned_whole() {
        let bytes = [0x88, 0x02, 0x03, 0xE8];
        let frame = decode_bytes(&bytes).expect("decode");
        assert_eq!(frame.opcode, Opcode::Close);
        assert_eq!(frame.payload, vec![0x03, 0xE8]);
    }

    #[test]
    fn test_decode_truncated_header() {
        let err = decode_bytes(&[0x81]).unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { expected: 2 }));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let err = decode_bytes(&[0x82, 0x05, 1, 2]).unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { expected: 5 }));
    }

    #[test]
    fn test_decode_truncated_extended_length() {
        let err = decode_bytes(&[0x82, 126, 0x01]).unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { expected: 2 }));
    }

    #[test]
    fn test_decode_truncated_mask_key() {
        let err = decode_bytes(&[0x81, 0x81, 0xAA]).unwrap_err();
        assert!(matches!(err, Error::TruncatedFrame { expected: 4 }));
    }

    #[test]
    fn test_decode_rejects_continuation() {
        let err = decode_bytes(&[0x00, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame { .. }));
    }

    #[test]
    fn test_decode_rejects_reserved_bits() {
        let err = decode_bytes(&[0xC1, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame { .. }));
    }

    #[test]
    fn test_decode_rejects_fragmented_control() {
        let err = decode_bytes(&[0x09, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame { .. }));
    }

    #[test]
    fn test_decode_rejects_long_control() {
        let mut bytes = vec![0x89, 126, 0x00, 0x7E];
        bytes.extend(payload_of(126));
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidFrame { .. }));
    }

    #[test]
    fn test_decode_rejects_oversized_payload() {
        let mut bytes = vec![0x82, 127];
        bytes.extend_from_slice(&(MAX_PAYLOAD_LEN + 1).to_be_bytes());
        let err = decode_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::FrameTooLarge { .. }));
    }

    #[test]
    fn test_decode_keeps_fin_flag() {
        let frame = decode_bytes(&[0x01, 0x01, b'a']).expect("decode");
        assert!(!frame.fin);
        assert_eq!(frame.opcode, Opcode::Text);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_times_out_on_silent_stream() {
        let (mut client, _server) = tokio::io::duplex(64);
        let deadline = Deadline::after(Duration::from_millis(100));
        let err = decode(&mut client, &deadline).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 100, .. }));
    }

    proptest! {
        #[test]
        fn prop_mask_is_involutive(data in proptest::collection::vec(any::<u8>(), 0..512), mask in any::<[u8; 4]>()) {
            let mut buf = data.clone();
            apply_mask(&mut buf, mask);
            apply_mask(&mut buf, mask);
            prop_assert_eq!(buf, data);
        }

        #[test]
        fn prop_encoded_frames_are_masked(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let bytes = encode(&data, Opcode::Binary);
            prop_assert!(bytes[1] & MASK_BIT != 0);

            let header_len = match bytes[1] & LEN_BITS {
                LEN_16 => 4,
                LEN_64 => 10,
                _ => 2,
            };
            let key = [bytes[header_len], bytes[header_len + 1], bytes[header_len + 2], bytes[header_len + 3]];
            let mut body = bytes[header_len + 4..].to_vec();
            apply_mask(&mut body, key);
            prop_assert_eq!(body, data);
        }
    }
}
