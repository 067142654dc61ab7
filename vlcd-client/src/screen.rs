//! Screen parameters negotiated by the device.

use std::fmt;
use vlcd_common::{InputDeviceMask, Rotation};
use vlcd_pixelbuffer::PixelFormat;

/// Immutable snapshot of the device's screen parameters.
///
/// Replaced wholesale by each successful init command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenState {
    /// Width in pixels, before rotation.
    pub width: u16,
    /// Height in pixels, before rotation.
    pub height: u16,
    /// Display rotation applied when rendering.
    pub rotation: Rotation,
    /// Framebuffer pixel format.
    pub format: PixelFormat,
    /// False until the first accepted init, and again after a rejected
    /// init or transport loss.
    pub enabled: bool,
    /// Input device classes the device accepts.
    pub devices: InputDeviceMask,
}

impl Default for ScreenState {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            rotation: Rotation::Deg0,
            format: PixelFormat::Rgb565,
            enabled: false,
            devices: InputDeviceMask::all(),
        }
    }
}

impl ScreenState {
    /// Raw framebuffer size for these parameters.
    pub fn buffer_len(&self) -> usize {
        self.format
            .buffer_len(usize::from(self.width), usize::from(self.height))
    }

    /// Size of the rendered image after rotation.
    pub fn display_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Status line such as `800x480@0° RGB16 DEV[KTMBE]`, or
    /// `uninitialized` while disabled.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ScreenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return f.write_str("uninitialized");
        }
        write!(
            f,
            "{}x{}@{} {} {}",
            self.width, self.height, self.rotation, self.format, self.devices
        )
    }
}
