//! Application-facing message types for communication between the bridge and the application.

use crate::engine::FrameSnapshot;
use crate::screen::ScreenState;
use vlcd_common::Point;
use vlcd_input::{KeyInput, MouseButton};

/// Events sent from the bridge to the application.
#[derive(Debug, Clone)]
pub enum DisplayEvent {
    /// Transport to the device is up.
    Connected {
        /// Peer description (address or `stream`).
        peer: String,
    },

    /// Screen parameters changed.
    ///
    /// Sent after every accepted init and whenever the screen is disabled.
    /// Renderers should resize their surface to `screen.display_size()`.
    ParametersChanged(ScreenState),

    /// Framebuffer content changed.
    FrameChanged(FrameSnapshot),

    /// Connection has been closed (gracefully or due to error).
    ConnectionClosed,

    /// An error occurred on the transport.
    Error {
        /// The error message.
        message: String,
    },
}

/// Commands sent from the application to the bridge.
///
/// Each command is translated into zero or more input events for the device,
/// depending on the device classes enabled by the last init.
#[derive(Debug, Clone)]
pub enum InputCommand {
    /// Mouse button transition at a framebuffer position.
    MouseButton {
        /// Which button.
        button: MouseButton,
        /// True on press.
        pressed: bool,
        /// Pointer position in framebuffer coordinates.
        position: Point,
    },

    /// Pointer moved. Subject to throttling.
    MouseMove {
        /// New position in framebuffer coordinates.
        position: Point,
    },

    /// Wheel rotated by `delta` steps, clamped to `i8` on the wire.
    MouseWheel {
        /// Signed step count.
        delta: i32,
    },

    /// Rotary encoder push button.
    EncoderPress {
        /// True on press.
        pressed: bool,
    },

    /// Rotary encoder turned by `delta` steps.
    EncoderRotate {
        /// Signed step count.
        delta: i32,
    },

    /// Keyboard transition.
    Key(KeyInput),

    /// Physical button transition.
    Button {
        /// Button index.
        index: u8,
        /// True on press.
        pressed: bool,
    },

    /// Close the connection.
    Close,
}
