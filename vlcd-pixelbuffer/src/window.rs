//! Write-window geometry.
//!
//! A [`Window`] describes the rectangular region of a framebuffer that
//! sequential `write` payloads are clipped and wrapped into. All sizes are byte
//! counts derived from the pixel format, computed in bits so that packed
//! formats round correctly:
//!
//! ```text
//! stride     = ceil(width * bits / 8)
//! front_size = stride * y + floor(x * bits / 8)
//! back_size  = stride * (height - y - h) + stride - ceil((x + w) * bits / 8)
//! wrap_size  = stride - (ceil((x + w) * bits / 8) - floor(x * bits / 8))
//! ```
//!
//! `front_size` bytes precede the window's first byte and `back_size` bytes
//! follow its last; `wrap_size` bytes separate the right edge of one row from
//! the left edge of the next.

use crate::{FramebufferError, PixelFormat};
use vlcd_common::Rect;

/// Geometry of the current write window. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
    pub front_size: usize,
    pub back_size: usize,
    pub wrap_size: usize,
    pub cursor: usize,
}

impl Window {
    /// Computes the window for `rect` on a `width` x `height` surface.
    ///
    /// Fails with [`FramebufferError::InvalidWindow`] if the rectangle is empty
    /// or extends past the surface.
    pub fn new(
        rect: Rect,
        width: u16,
        height: u16,
        format: PixelFormat,
    ) -> Result<Self, FramebufferError> {
        if rect.is_empty() || !rect.fits_within(width, height) {
            return Err(FramebufferError::InvalidWindow {
                rect,
                width,
                height,
            });
        }

        let stride = format.row_stride(usize::from(width));
        let left = format.column_start(usize::from(rect.x));
        let right = format.column_end(rect.right() as usize);
        let rows_below = usize::from(height) - rect.bottom() as usize;
        let front_size = stride * usize::from(rect.y) + left;

        Ok(Self {
            x0: rect.x,
            y0: rect.y,
            x1: rect.x + (rect.width - 1),
            y1: rect.y + (rect.height - 1),
            front_size,
            back_size: stride * rows_below + (stride - right),
            wrap_size: stride - (right - left),
            cursor: front_size,
        })
    }

    /// Full-surface window. A zero-sized surface yields an empty window
    /// anchored at the origin.
    pub fn full(width: u16, height: u16, format: PixelFormat) -> Self {
        Self::new(Rect::new(0, 0, width, height), width, height, format).unwrap_or(Self {
            x0: 0,
            y0: 0,
            x1: 0,
            y1: 0,
            front_size: 0,
            back_size: 0,
            wrap_size: 0,
            cursor: 0,
        })
    }

    /// The window as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x0,
            self.y0,
            self.x1 - self.x0 + 1,
            self.y1 - self.y0 + 1,
        )
    }

    /// True if the window spans whole rows, so writes form a simple ring.
    pub fn is_full_width(&self) -> bool {
        self.wrap_size == 0
    }

    /// Offset one past the window's last byte in a buffer of `buffer_len`.
    pub fn end(&self, buffer_len: usize) -> usize {
        buffer_len - self.back_size
    }
}
