//! Read-only pixel buffer access.
//!
//! [`PixelBuffer`] is implemented by the live [`WindowedFramebuffer`] and by
//! the immutable snapshots handed to renderers, so rendering code can accept
//! either.
//!
//! # Memory layout
//!
//! Data is row-major with a stride measured in **bytes**, rounded up to a
//! whole byte per row for packed formats:
//!
//! ```text
//! row_stride  = ceil(width * bits_per_pixel / 8)
//! byte_length = row_stride * height
//! ```
//!
//! [`WindowedFramebuffer`]: crate::WindowedFramebuffer

use crate::{render_rgba, PixelFormat};
use vlcd_common::Rotation;

/// Read-only access to a framebuffer in the device's native format.
///
/// # Example
///
/// ```
/// use vlcd_pixelbuffer::{PixelBuffer, PixelFormat, WindowedFramebuffer};
///
/// fn describe<B: PixelBuffer>(buffer: &B) -> String {
///     let (w, h) = buffer.dimensions();
///     format!("{}x{} {} ({} bytes)", w, h, buffer.pixel_format(), buffer.data().len())
/// }
///
/// let fb = WindowedFramebuffer::new(16, 2, PixelFormat::Mono);
/// assert_eq!(describe(&fb), "16x2 MONO (4 bytes)");
/// ```
pub trait PixelBuffer {
    /// Returns the dimensions of the buffer as (width, height) in pixels.
    fn dimensions(&self) -> (u16, u16);

    /// Returns the pixel format of the raw data.
    fn pixel_format(&self) -> PixelFormat;

    /// Returns the raw pixel bytes.
    fn data(&self) -> &[u8];

    /// Returns the row stride in bytes.
    fn stride(&self) -> usize {
        let (width, _) = self.dimensions();
        self.pixel_format().row_stride(usize::from(width))
    }

    /// Renders the buffer as RGBA8888 rotated clockwise by `rotation`.
    ///
    /// Returns `(rgba, width, height)` of the rotated image.
    fn to_rgba(&self, rotation: Rotation) -> (Vec<u8>, usize, usize) {
        let (width, height) = self.dimensions();
        render_rgba(
            self.data(),
            usize::from(width),
            usize::from(height),
            self.pixel_format(),
            rotation,
        )
    }
}
