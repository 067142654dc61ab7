//! Incremental frame reassembly from an arbitrary-chunked byte stream.
//!
//! The transport delivers bytes in whatever chunks it likes: a frame may
//! arrive split across many deliveries, several frames may share one, and
//! line noise may precede a sync marker. [`FrameReassembler`] buffers input
//! and emits complete [`Frame`]s as they become available.
//!
//! # States
//!
//! ```text
//!            sync found            7 bytes buffered
//! SeekSync ─────────────▶ ReadHeader ─────────────▶ ReadPayload
//!    ▲                        │                          │
//!    │   length > max (drop   │                          │ 7 + length bytes
//!    │   the sync marker)     │                          │ buffered: emit
//!    └────────────────────────┴──────────────────────────┘
//! ```
//!
//! - **SeekSync** discards everything before the first `0xAA 0x55`. A trailing
//!   lone `0xAA` is kept because the `0x55` may arrive in the next chunk.
//! - **ReadHeader** reads type and length. An over-long length is reported as
//!   [`FramingError::PayloadTooLarge`]; the two sync bytes are dropped so the
//!   search resumes just past the bogus marker.
//! - **ReadPayload** waits for the full payload, which may be empty.
//!
//! The reassembler never blocks and its output is independent of how the
//! input was chunked.
//!
//! # Example
//!
//! ```
//! use vlcd_protocol::{encode_frame, FrameReassembler};
//!
//! let wire = encode_frame(0x03, &[1, 2, 3]);
//! let mut reassembler = FrameReassembler::new();
//!
//! assert!(reassembler.feed(&wire[..4]).is_empty());
//! let frames = reassembler.feed(&wire[4..]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].kind, 0x03);
//! assert_eq!(&frames[0].payload[..], &[1, 2, 3]);
//! ```

use crate::frame::{Frame, DEFAULT_MAX_PAYLOAD_LEN, HEADER_LEN, SYNC};
use crate::trace;
use bytes::{Buf, BytesMut};

/// Errors detected while reassembling frames. All are recoverable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    /// The length field exceeds the configured maximum.
    #[error("frame payload length {len} exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },
}

/// Running counters kept by a [`FrameReassembler`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblerStats {
    /// Complete frames emitted.
    pub frames: u64,
    /// Bytes dropped while searching for a sync marker.
    pub discarded_bytes: u64,
    /// Headers rejected for an over-long length field.
    pub oversize: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekSync,
    ReadHeader,
    ReadPayload { kind: u8, len: usize },
}

/// Stateful parser turning a byte stream into frames.
#[derive(Debug)]
pub struct FrameReassembler {
    buffer: BytesMut,
    state: State,
    max_payload_len: usize,
    stats: ReassemblerStats,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReassembler {
    /// Create a reassembler with the default 16 MiB payload limit.
    pub fn new() -> Self {
        Self::with_max_payload_len(DEFAULT_MAX_PAYLOAD_LEN)
    }

    /// Create a reassembler rejecting payloads longer than `max_payload_len`.
    pub fn with_max_payload_len(max_payload_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            state: State::SeekSync,
            max_payload_len,
            stats: ReassemblerStats::default(),
        }
    }

    /// Configured payload limit.
    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> ReassemblerStats {
        self.stats
    }

    /// Number of bytes buffered but not yet emitted or discarded.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all buffered bytes and return to sync search.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = State::SeekSync;
    }

    /// Append received bytes. Call [`next_frame`](Self::next_frame) to drain.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Extract the next complete frame, if one is buffered.
    ///
    /// Returns `Ok(None)` when more input is needed. After an error the
    /// reassembler has already resynchronized; keep calling to continue.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FramingError> {
        loop {
            match self.state {
                State::SeekSync => {
                    match self.buffer.windows(2).position(|w| w == SYNC) {
                        Some(pos) => {
                            self.discard(pos);
                            self.state = State::ReadHeader;
                        }
                        None => {
                            let keep = usize::from(self.buffer.last() == Some(&SYNC[0]));
                            self.discard(self.buffer.len() - keep);
                            return Ok(None);
                        }
                    }
                }
                State::ReadHeader => {
                    if self.buffer.len() < HEADER_LEN {
                        return Ok(None);
                    }
                    let kind = self.buffer[2];
                    let len = u32::from_le_bytes([
                        self.buffer[3],
                        self.buffer[4],
                        self.buffer[5],
                        self.buffer[6],
                    ]) as usize;

                    if len > self.max_payload_len {
                        self.discard(SYNC.len());
                        self.stats.oversize += 1;
                        self.state = State::SeekSync;
                        return Err(FramingError::PayloadTooLarge {
                            len,
                            max: self.max_payload_len,
                        });
                    }
                    self.state = State::ReadPayload { kind, len };
                }
                State::ReadPayload { kind, len } => {
                    if self.buffer.len() < HEADER_LEN + len {
                        return Ok(None);
                    }
                    let mut raw = self.buffer.split_to(HEADER_LEN + len);
                    raw.advance(HEADER_LEN);
                    self.state = State::SeekSync;
                    self.stats.frames += 1;

                    let frame = Frame {
                        kind,
                        payload: raw.freeze(),
                    };
                    tracing::trace!(kind = frame.kind, len, "frame reassembled");
                    trace::inbound(&frame);
                    return Ok(Some(frame));
                }
            }
        }
    }

    /// Append `data` and return every frame it completes.
    ///
    /// Framing errors are logged and skipped.
    pub fn feed(&mut self, data: &[u8]) -> Vec<Frame> {
        self.extend(data);
        let mut frames = Vec::new();
        loop {
            match self.next_frame() {
                Ok(Some(frame)) => frames.push(frame),
                Ok(None) => break,
                Err(e) => tracing::warn!("framing error, resynchronizing: {}", e),
            }
        }
        frames
    }

    fn discard(&mut self, n: usize) {
        if n > 0 {
            self.buffer.advance(n);
            self.stats.discarded_bytes += n as u64;
        }
    }
}
