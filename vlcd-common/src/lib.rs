//! Common types shared across the virtual LCD bridge crates.
//!
//! This crate provides the small vocabulary every other crate speaks:
//! - [`Point`] - 2D point in screen pixels
//! - [`Rect`] - Rectangle with position and dimensions
//! - [`Rotation`] - Display rotation negotiated by the device
//! - [`InputDeviceMask`] - Input device classes the device accepts

use bitflags::bitflags;
use std::fmt;

/// A 2D point with unsigned screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by top-left position and dimensions.
///
/// Coordinates use the device's `u16` range; edges are computed in `u32` so
/// that `x + width` never overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the right edge (x + width, exclusive).
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.width as u32
    }

    /// Get the bottom edge (y + height, exclusive).
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.height as u32
    }

    /// True if the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is contained within this rectangle.
    pub const fn contains_point(&self, px: u16, py: u16) -> bool {
        px >= self.x && (px as u32) < self.right() && py >= self.y && (py as u32) < self.bottom()
    }

    /// Check that the rectangle lies inside a `width` x `height` surface.
    pub const fn fits_within(&self, width: u16, height: u16) -> bool {
        self.right() <= width as u32 && self.bottom() <= height as u32
    }
}

/// Display rotation, applied clockwise when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Decode the wire rotation code (0..=3).
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Deg0),
            1 => Some(Self::Deg90),
            2 => Some(Self::Deg180),
            3 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Wire rotation code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Rotation in degrees.
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// True when width and height swap on screen.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

bitflags! {
    /// Input device classes enabled by the device's init command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InputDeviceMask: u8 {
        const KEYBOARD = 1 << 0;
        const TOUCH    = 1 << 1;
        const MOUSE    = 1 << 2;
        const BUTTON   = 1 << 3;
        const ENCODER  = 1 << 4;
    }
}

impl Default for InputDeviceMask {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for InputDeviceMask {
    /// Compact form used in status lines, e.g. `DEV[KTM]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DEV[")?;
        for (flag, letter) in [
            (Self::KEYBOARD, 'K'),
            (Self::TOUCH, 'T'),
            (Self::MOUSE, 'M'),
            (Self::BUTTON, 'B'),
            (Self::ENCODER, 'E'),
        ] {
            if self.contains(flag) {
                write!(f, "{letter}")?;
            }
        }
        f.write_str("]")
    }
}
