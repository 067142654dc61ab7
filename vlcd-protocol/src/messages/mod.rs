//! Typed message payloads carried inside [`Frame`](crate::Frame)s.
//!
//! Messages are split by direction:
//!
//! - **Display commands** ([`display`]) - device to host: screen init, window
//!   and pixel updates
//! - **Input events** ([`input`]) - host to device: keyboard, pointer, buttons,
//!   encoder and init requests
//!
//! Both directions can be parsed and encoded, so the same types serve the
//! host and a simulated device.
//!
//! # Wire Format Rules
//!
//! 1. **Little-endian byte order** for every multi-byte integer
//! 2. **Fixed headers** - a payload shorter than its fixed header is a
//!    [`MessageError::BufferShortfall`]; trailing bytes after a fixed-size
//!    payload are ignored
//! 3. **Unknown types** are reported as [`MessageError::UnknownType`] and are
//!    safe to skip

pub mod display;
pub mod input;

use bytes::Buf;

pub use display::{DisplayCommand, InitParams};
pub use input::InputEvent;

/// Errors raised while decoding a message payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    /// The payload is shorter than the message's fixed header.
    #[error("message type {kind:#04x} needs {needed} bytes, got {got}")]
    BufferShortfall { kind: u8, needed: usize, got: usize },

    /// The type byte is not defined for this direction.
    #[error("unknown message type {0:#04x}")]
    UnknownType(u8),
}

/// Checks that `payload` holds at least `needed` bytes.
pub(crate) fn ensure_len(kind: u8, payload: &[u8], needed: usize) -> Result<(), MessageError> {
    if payload.len() < needed {
        return Err(MessageError::BufferShortfall {
            kind,
            needed,
            got: payload.len(),
        });
    }
    Ok(())
}

/// Reads a little-endian `u16` rectangle of four fields.
pub(crate) fn get_rect(buf: &mut impl Buf) -> vlcd_common::Rect {
    let x = buf.get_u16_le();
    let y = buf.get_u16_le();
    let width = buf.get_u16_le();
    let height = buf.get_u16_le();
    vlcd_common::Rect::new(x, y, width, height)
}
