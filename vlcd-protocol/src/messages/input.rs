//! Host-to-device input events.
//!
//! # Wire Format
//!
//! | type | event        | payload                                             |
//! |------|--------------|-----------------------------------------------------|
//! | 0x00 | keyboard     | u8 state, u16 keycode, u16 modifiers, u8 ascii      |
//! | 0x01 | touch        | u16 x, u16 y, u8 down                               |
//! | 0x02 | mouse        | u16 x, u16 y, i8 wheel, u8 button mask              |
//! | 0x03 | button       | u8 index, u8 pressed                                |
//! | 0x04 | encoder      | i8 delta, u8 pressed                                |
//! | 0xFF | init request | empty                                               |
//!
//! Keyboard `state` carries `pressed` in bit 0 and `repeat` in bit 1.

use super::{ensure_len, MessageError};
use crate::frame::encode_frame;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use vlcd_common::InputDeviceMask;

/// Frame type of [`InputEvent::Keyboard`].
pub const KEYBOARD: u8 = 0x00;
/// Frame type of [`InputEvent::Touch`].
pub const TOUCH: u8 = 0x01;
/// Frame type of [`InputEvent::Mouse`].
pub const MOUSE: u8 = 0x02;
/// Frame type of [`InputEvent::Button`].
pub const BUTTON: u8 = 0x03;
/// Frame type of [`InputEvent::Encoder`].
pub const ENCODER: u8 = 0x04;
/// Frame type of [`InputEvent::InitRequest`].
pub const INIT_REQUEST: u8 = 0xFF;

/// An input event sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Keyboard {
        pressed: bool,
        repeat: bool,
        keycode: u16,
        modifiers: u16,
        ascii: u8,
    },
    Touch {
        x: u16,
        y: u16,
        down: bool,
    },
    Mouse {
        x: u16,
        y: u16,
        wheel: i8,
        buttons: u8,
    },
    Button {
        index: u8,
        pressed: bool,
    },
    Encoder {
        delta: i8,
        pressed: bool,
    },
    /// Ask the device to resend its init command.
    InitRequest,
}

impl InputEvent {
    /// Keyboard event from host key data. Modifiers are masked to 16 bits.
    pub fn keyboard(pressed: bool, repeat: bool, keycode: u16, modifiers: u32, ascii: u8) -> Self {
        Self::Keyboard {
            pressed,
            repeat,
            keycode,
            modifiers: (modifiers & 0xFFFF) as u16,
            ascii,
        }
    }

    /// Frame type byte for this event.
    pub fn kind(&self) -> u8 {
        match self {
            Self::Keyboard { .. } => KEYBOARD,
            Self::Touch { .. } => TOUCH,
            Self::Mouse { .. } => MOUSE,
            Self::Button { .. } => BUTTON,
            Self::Encoder { .. } => ENCODER,
            Self::InitRequest => INIT_REQUEST,
        }
    }

    /// Device class gating this event, `None` for init requests.
    pub fn device(&self) -> Option<InputDeviceMask> {
        match self {
            Self::Keyboard { .. } => Some(InputDeviceMask::KEYBOARD),
            Self::Touch { .. } => Some(InputDeviceMask::TOUCH),
            Self::Mouse { .. } => Some(InputDeviceMask::MOUSE),
            Self::Button { .. } => Some(InputDeviceMask::BUTTON),
            Self::Encoder { .. } => Some(InputDeviceMask::ENCODER),
            Self::InitRequest => None,
        }
    }

    /// Encode the payload only.
    pub fn payload(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(6);
        match *self {
            Self::Keyboard {
                pressed,
                repeat,
                keycode,
                modifiers,
                ascii,
            } => {
                buf.put_u8(u8::from(pressed) | (u8::from(repeat) << 1));
                buf.put_u16_le(keycode);
                buf.put_u16_le(modifiers);
                buf.put_u8(ascii);
            }
            Self::Touch { x, y, down } => {
                buf.put_u16_le(x);
                buf.put_u16_le(y);
                buf.put_u8(u8::from(down));
            }
            Self::Mouse {
                x,
                y,
                wheel,
                buttons,
            } => {
                buf.put_u16_le(x);
                buf.put_u16_le(y);
                buf.put_i8(wheel);
                buf.put_u8(buttons);
            }
            Self::Button { index, pressed } => {
                buf.put_u8(index);
                buf.put_u8(u8::from(pressed));
            }
            Self::Encoder { delta, pressed } => {
                buf.put_i8(delta);
                buf.put_u8(u8::from(pressed));
            }
            Self::InitRequest => {}
        }
        buf.freeze()
    }

    /// Encode the complete frame, header included.
    pub fn encode(&self) -> Bytes {
        encode_frame(self.kind(), &self.payload())
    }

    /// Decode an event from a frame's type and payload.
    pub fn parse(kind: u8, payload: &[u8]) -> Result<Self, MessageError> {
        let mut buf = payload;
        match kind {
            KEYBOARD => {
                ensure_len(kind, payload, 6)?;
                let state = buf.get_u8();
                Ok(Self::Keyboard {
                    pressed: state & 0x01 != 0,
                    repeat: state & 0x02 != 0,
                    keycode: buf.get_u16_le(),
                    modifiers: buf.get_u16_le(),
                    ascii: buf.get_u8(),
                })
            }
            TOUCH => {
                ensure_len(kind, payload, 5)?;
                Ok(Self::Touch {
                    x: buf.get_u16_le(),
                    y: buf.get_u16_le(),
                    down: buf.get_u8() != 0,
                })
            }
            MOUSE => {
                ensure_len(kind, payload, 6)?;
                Ok(Self::Mouse {
                    x: buf.get_u16_le(),
                    y: buf.get_u16_le(),
                    wheel: buf.get_i8(),
                    buttons: buf.get_u8(),
                })
            }
            BUTTON => {
                ensure_len(kind, payload, 2)?;
                Ok(Self::Button {
                    index: buf.get_u8(),
                    pressed: buf.get_u8() != 0,
                })
            }
            ENCODER => {
                ensure_len(kind, payload, 2)?;
                Ok(Self::Encoder {
                    delta: buf.get_i8(),
                    pressed: buf.get_u8() != 0,
                })
            }
            INIT_REQUEST => Ok(Self::InitRequest),
            other => Err(MessageError::UnknownType(other)),
        }
    }
}
