//! Windowed framebuffer implementation.
//!
//! This module provides [`WindowedFramebuffer`], the pixel store the device
//! draws into. It owns a contiguous, row-major byte buffer in the device's
//! native [`PixelFormat`] and a [`Window`] that sequential writes are clipped
//! to.
//!
//! # Write regimes
//!
//! - **Full-width window** (`wrap_size == 0`): the bytes between
//!   `front_size` and `len - back_size` form a simple ring. The cursor wraps
//!   back to `front_size` when it reaches the end.
//! - **Partial-width window**: each row segment is bounded by the window's
//!   right edge. On reaching it the cursor skips `wrap_size` bytes to the next
//!   row's left edge, or returns to `front_size` after the last row.
//!
//! Writes of any length tile into successive rows of the window, wrapping to
//! its top-left indefinitely. Payloads longer than the window are not errors.
//!
//! # Example
//!
//! ```
//! use vlcd_pixelbuffer::{PixelBuffer, PixelFormat, WindowedFramebuffer};
//!
//! let mut fb = WindowedFramebuffer::new(4, 4, PixelFormat::Gray8);
//! fb.set_window(1, 1, 2, 2).unwrap();
//! fb.write(&[1, 2, 3, 4]);
//!
//! assert_eq!(&fb.data()[4..8], &[0, 1, 2, 0]);
//! assert_eq!(&fb.data()[8..12], &[0, 3, 4, 0]);
//! ```

use crate::{PixelBuffer, PixelFormat, Window};
use vlcd_common::{Point, Rect};

/// Errors raised by framebuffer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramebufferError {
    /// The window rectangle is empty or extends past the screen.
    #[error("invalid window {rect:?} for {width}x{height} screen")]
    InvalidWindow { rect: Rect, width: u16, height: u16 },

    /// The point lies outside the screen.
    #[error("invalid point {point:?} for {width}x{height} screen")]
    InvalidPoint {
        point: Point,
        width: u16,
        height: u16,
    },
}

/// A framebuffer with a clipping write window.
#[derive(Debug, Clone)]
pub struct WindowedFramebuffer {
    width: u16,
    height: u16,
    format: PixelFormat,
    data: Vec<u8>,
    window: Window,
}

impl WindowedFramebuffer {
    /// Creates a zeroed framebuffer with a full-screen window.
    pub fn new(width: u16, height: u16, format: PixelFormat) -> Self {
        let len = format.buffer_len(usize::from(width), usize::from(height));
        Self {
            width,
            height,
            format,
            data: vec![0u8; len],
            window: Window::full(width, height, format),
        }
    }

    /// Reallocates for new parameters. Contents are zeroed and the window is
    /// reset to the full screen.
    pub fn reset(&mut self, width: u16, height: u16, format: PixelFormat) {
        *self = Self::new(width, height, format);
    }

    /// Current write window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Sets the write window to `w` x `h` pixels at `(x, y)`.
    ///
    /// On error the previous window, including its cursor, is left intact.
    pub fn set_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), FramebufferError> {
        self.window = Window::new(Rect::new(x, y, w, h), self.width, self.height, self.format)?;
        Ok(())
    }

    /// Writes raw pixel bytes at the cursor, clipped and wrapped to the window.
    pub fn write(&mut self, mut data: &[u8]) {
        let len = self.data.len();
        if len == 0 {
            return;
        }
        let front = self.window.front_size;
        let end = self.window.end(len);

        if self.window.is_full_width() {
            while !data.is_empty() {
                let n = data.len().min(end - self.window.cursor);
                let cursor = self.window.cursor;
                self.data[cursor..cursor + n].copy_from_slice(&data[..n]);
                data = &data[n..];
                self.window.cursor += n;
                if self.window.cursor >= end {
                    self.window.cursor = front;
                }
            }
            return;
        }

        let stride = self.format.row_stride(usize::from(self.width));
        let right = self.format.column_end(usize::from(self.window.x1) + 1);
        while !data.is_empty() {
            let cursor = self.window.cursor;
            let row_end = cursor - cursor % stride + right;
            let n = data.len().min(row_end - cursor);
            self.data[cursor..cursor + n].copy_from_slice(&data[..n]);
            data = &data[n..];
            self.window.cursor += n;
            if self.window.cursor == row_end {
                if self.window.cursor >= end {
                    self.window.cursor = front;
                } else {
                    self.window.cursor += self.window.wrap_size;
                }
            }
        }
    }

    /// Writes a single pixel at an absolute position, ignoring the window.
    ///
    /// Whole-byte formats store the low `bytes_per_pixel` bytes of `color`
    /// little-endian. Packed formats set or clear one bit from `color & 1`.
    pub fn draw_point(&mut self, x: u16, y: u16, color: u32) -> Result<(), FramebufferError> {
        if !Rect::new(0, 0, self.width, self.height).contains_point(x, y) {
            return Err(FramebufferError::InvalidPoint {
                point: Point::new(x, y),
                width: self.width,
                height: self.height,
            });
        }

        let stride = self.format.row_stride(usize::from(self.width));
        let row = usize::from(y) * stride;
        match self.format.whole_bytes_per_pixel() {
            Some(bpp) => {
                let offset = row + usize::from(x) * bpp;
                self.data[offset..offset + bpp].copy_from_slice(&color.to_le_bytes()[..bpp]);
            }
            None => {
                let offset = row + usize::from(x) / 8;
                let bit = 0x80u8 >> (x % 8);
                if color & 1 != 0 {
                    self.data[offset] |= bit;
                } else {
                    self.data[offset] &= !bit;
                }
            }
        }
        Ok(())
    }
}

impl PixelBuffer for WindowedFramebuffer {
    fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}
