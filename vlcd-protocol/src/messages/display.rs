//! Device-to-host display commands.

use super::{ensure_len, get_rect, MessageError};
use crate::frame::encode_frame;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use vlcd_common::{InputDeviceMask, Rect, Rotation};

/// Frame type of [`DisplayCommand::Init`].
pub const INIT: u8 = 0x01;
/// Frame type of [`DisplayCommand::SetWindow`].
pub const SET_WINDOW: u8 = 0x02;
/// Frame type of [`DisplayCommand::Write`].
pub const WRITE: u8 = 0x03;
/// Frame type of [`DisplayCommand::SetWindowWrite`].
pub const SET_WINDOW_WRITE: u8 = 0x04;
/// Frame type of [`DisplayCommand::DrawPoint`].
pub const DRAW_POINT: u8 = 0x05;

const INIT_LEN: usize = 7;
const RECT_LEN: usize = 8;
const DRAW_POINT_LEN: usize = 8;

/// Screen parameters announced by the device.
///
/// Codes are kept raw; the receiver decides which values it accepts.
///
/// # Wire Format
///
/// - 2 bytes: width
/// - 2 bytes: height
/// - 1 byte: pixel format code
/// - 1 byte: rotation code (0..=3 for 0/90/180/270 degrees)
/// - 1 byte: input device mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitParams {
    pub width: u16,
    pub height: u16,
    pub format: u8,
    pub rotation: u8,
    pub devices: u8,
}

impl InitParams {
    /// Build parameters from typed rotation and device mask.
    pub fn new(
        width: u16,
        height: u16,
        format: u8,
        rotation: Rotation,
        devices: InputDeviceMask,
    ) -> Self {
        Self {
            width,
            height,
            format,
            rotation: rotation.code(),
            devices: devices.bits(),
        }
    }
}

/// A display command sent by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCommand {
    /// Replace the screen parameters and enable the screen.
    Init(InitParams),

    /// Set the write window.
    ///
    /// # Wire Format
    ///
    /// - 2 bytes each: x, y, width, height
    SetWindow(Rect),

    /// Raw pixel bytes for the current window.
    Write(Bytes),

    /// Set the window, then write the remainder of the payload.
    ///
    /// # Wire Format
    ///
    /// - 8 bytes: window as in `SetWindow`
    /// - N bytes: pixel data
    SetWindowWrite { rect: Rect, data: Bytes },

    /// Set one pixel at an absolute position.
    ///
    /// # Wire Format
    ///
    /// - 2 bytes: x
    /// - 2 bytes: y
    /// - 4 bytes: color, truncated to the pixel size
    DrawPoint { x: u16, y: u16, color: u32 },
}

impl DisplayCommand {
    /// Decode a command from a frame's type and payload.
    pub fn parse(kind: u8, payload: &Bytes) -> Result<Self, MessageError> {
        let mut buf = payload.clone();
        match kind {
            INIT => {
                ensure_len(kind, payload, INIT_LEN)?;
                Ok(Self::Init(InitParams {
                    width: buf.get_u16_le(),
                    height: buf.get_u16_le(),
                    format: buf.get_u8(),
                    rotation: buf.get_u8(),
                    devices: buf.get_u8(),
                }))
            }
            SET_WINDOW => {
                ensure_len(kind, payload, RECT_LEN)?;
                Ok(Self::SetWindow(get_rect(&mut buf)))
            }
            WRITE => Ok(Self::Write(buf)),
            SET_WINDOW_WRITE => {
                ensure_len(kind, payload, RECT_LEN)?;
                let rect = get_rect(&mut buf);
                Ok(Self::SetWindowWrite { rect, data: buf })
            }
            DRAW_POINT => {
                ensure_len(kind, payload, DRAW_POINT_LEN)?;
                Ok(Self::DrawPoint {
                    x: buf.get_u16_le(),
                    y: buf.get_u16_le(),
                    color: buf.get_u32_le(),
                })
            }
            other => Err(MessageError::UnknownType(other)),
        }
    }

    /// Frame type byte for this command.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Init(_) => INIT,
            Self::SetWindow(_) => SET_WINDOW,
            Self::Write(_) => WRITE,
            Self::SetWindowWrite { .. } => SET_WINDOW_WRITE,
            Self::DrawPoint { .. } => DRAW_POINT,
        }
    }

    /// Encode the payload only.
    pub fn payload(&self) -> Bytes {
        match self {
            Self::Init(p) => {
                let mut buf = BytesMut::with_capacity(INIT_LEN);
                buf.put_u16_le(p.width);
                buf.put_u16_le(p.height);
                buf.put_u8(p.format);
                buf.put_u8(p.rotation);
                buf.put_u8(p.devices);
                buf.freeze()
            }
            Self::SetWindow(rect) => {
                let mut buf = BytesMut::with_capacity(RECT_LEN);
                put_rect(&mut buf, rect);
                buf.freeze()
            }
            Self::Write(data) => data.clone(),
            Self::SetWindowWrite { rect, data } => {
                let mut buf = BytesMut::with_capacity(RECT_LEN + data.len());
                put_rect(&mut buf, rect);
                buf.put_slice(data);
                buf.freeze()
            }
            Self::DrawPoint { x, y, color } => {
                let mut buf = BytesMut::with_capacity(DRAW_POINT_LEN);
                buf.put_u16_le(*x);
                buf.put_u16_le(*y);
                buf.put_u32_le(*color);
                buf.freeze()
            }
        }
    }

    /// Encode the complete frame, header included.
    pub fn encode(&self) -> Bytes {
        encode_frame(self.kind(), &self.payload())
    }
}

fn put_rect(buf: &mut BytesMut, rect: &Rect) {
    buf.put_u16_le(rect.x);
    buf.put_u16_le(rect.y);
    buf.put_u16_le(rect.width);
    buf.put_u16_le(rect.height);
}
