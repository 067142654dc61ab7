//! Wire envelope shared by both directions of the link.
//!
//! # Wire Format
//!
//! ```text
//! +------+------+------+-----------------+-------------------+
//! | 0xAA | 0x55 | type | length (u32 LE) | payload[length]   |
//! +------+------+------+-----------------+-------------------+
//! ```
//!
//! There is no terminator or checksum; the next frame starts immediately after
//! the payload.

use bytes::{BufMut, Bytes, BytesMut};

/// Two-byte sync marker that starts every frame.
pub const SYNC: [u8; 2] = [0xAA, 0x55];

/// Size of sync marker, type and length fields.
pub const HEADER_LEN: usize = 7;

/// Default upper bound on an accepted payload length (16 MiB).
pub const DEFAULT_MAX_PAYLOAD_LEN: usize = 16 * 1024 * 1024;

/// One complete, length-delimited unit of the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type byte.
    pub kind: u8,
    /// Payload bytes, possibly empty.
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame from a type byte and payload.
    pub fn new(kind: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Total encoded size including the header.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Append the encoded frame to `buf`.
    pub fn write_to(&self, buf: &mut BytesMut) {
        encode_into(buf, self.kind, &self.payload);
    }

    /// Encode the frame into a new buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.write_to(&mut buf);
        buf.freeze()
    }
}

/// Append one frame with the given type and payload to `buf`.
///
/// # Panics
///
/// Panics if `payload` is longer than `u32::MAX` bytes.
pub fn encode_into(buf: &mut BytesMut, kind: u8, payload: &[u8]) {
    assert!(
        payload.len() <= u32::MAX as usize,
        "payload length {} exceeds u32::MAX",
        payload.len()
    );
    buf.reserve(HEADER_LEN + payload.len());
    buf.put_slice(&SYNC);
    buf.put_u8(kind);
    buf.put_u32_le(payload.len() as u32);
    buf.put_slice(payload);
}

/// Encode one frame into a new buffer.
pub fn encode_frame(kind: u8, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_LEN + payload.len());
    encode_into(&mut buf, kind, payload);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_header_layout() {
        let bytes = encode_frame(0x02, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(
            &bytes[..],
            &[0xAA, 0x55, 0x02, 0x08, 0x00, 0x00, 0x00, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_encode_empty_payload() {
        let frame = Frame::new(0xFF, Bytes::new());
        assert_eq!(frame.encoded_len(), HEADER_LEN);
        assert_eq!(&frame.to_bytes()[..], &[0xAA, 0x55, 0xFF, 0, 0, 0, 0]);
    }

    #[test]
    fn test_length_is_little_endian() {
        let payload = vec![0u8; 0x0102];
        let bytes = encode_frame(0x03, &payload);
        assert_eq!(&bytes[3..7], &[0x02, 0x01, 0x00, 0x00]);
        assert_eq!(bytes.len(), HEADER_LEN + 0x0102);
    }
}
