//! Pixel format table and conversions.
//!
//! This module defines the [`PixelFormat`] type which describes how the device
//! encodes pixels in the framebuffer it streams to us. There are five formats,
//! identified on the wire by a single byte:
//!
//! | code | format     | bits/pixel | storage                               |
//! |------|------------|------------|---------------------------------------|
//! | 0    | `Rgb565`   | 16         | little-endian `u16`, R5 G6 B5         |
//! | 1    | `Rgb888`   | 24         | bytes `R, G, B`                       |
//! | 2    | `Mono`     | 1          | 8 pixels per byte, MSB first, 1 = lit |
//! | 3    | `MonoInv`  | 1          | as `Mono`, 1 = dark                   |
//! | 4    | `Gray8`    | 8          | one luminance byte                    |
//!
//! # Bytes per pixel may be fractional
//!
//! The packed monochrome formats store 1/8 byte per pixel. Every byte
//! computation is therefore done in **bits** and rounded at row granularity:
//!
//! ```text
//! row_stride  = ceil(width * bits_per_pixel / 8)
//! buffer_len  = row_stride * height
//! ```
//!
//! For whole-byte formats this is exactly `width * height * bytes_per_pixel`.
//!
//! # Example
//!
//! ```
//! use vlcd_pixelbuffer::PixelFormat;
//!
//! let pf = PixelFormat::from_code(0).unwrap();
//! assert_eq!(pf, PixelFormat::Rgb565);
//! assert_eq!(pf.buffer_len(10, 10), 200);
//!
//! // 0xF800 is pure red in RGB565
//! assert_eq!(pf.to_rgba(&[0x00, 0xF8]), [0xFF, 0x00, 0x00, 0xFF]);
//!
//! // Packed formats round each row up to whole bytes
//! assert_eq!(PixelFormat::Mono.row_stride(12), 2);
//! assert_eq!(PixelFormat::Mono.buffer_len(12, 3), 6);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use vlcd_common::Rotation;

/// Error returned for a format code outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unsupported pixel format code {0:#04x}")]
pub struct UnsupportedFormat(pub u8);

/// Pixel storage formats understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 16-bit RGB, little-endian, 5/6/5 bits.
    #[default]
    #[serde(rename = "rgb565")]
    Rgb565,
    /// 24-bit RGB, one byte per channel in R, G, B order.
    #[serde(rename = "rgb888")]
    Rgb888,
    /// 1 bit per pixel, MSB first, set bit is lit.
    #[serde(rename = "mono")]
    Mono,
    /// 1 bit per pixel, MSB first, set bit is dark.
    #[serde(rename = "mono_inv")]
    MonoInv,
    /// 8-bit grayscale.
    #[serde(rename = "gray8")]
    Gray8,
}

impl PixelFormat {
    /// All formats in wire-code order.
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgb565,
        PixelFormat::Rgb888,
        PixelFormat::Mono,
        PixelFormat::MonoInv,
        PixelFormat::Gray8,
    ];

    /// Decode a wire format code.
    pub fn from_code(code: u8) -> Result<Self, UnsupportedFormat> {
        match code {
            0 => Ok(Self::Rgb565),
            1 => Ok(Self::Rgb888),
            2 => Ok(Self::Mono),
            3 => Ok(Self::MonoInv),
            4 => Ok(Self::Gray8),
            other => Err(UnsupportedFormat(other)),
        }
    }

    /// Wire format code.
    pub const fn code(self) -> u8 {
        match self {
            Self::Rgb565 => 0,
            Self::Rgb888 => 1,
            Self::Mono => 2,
            Self::MonoInv => 3,
            Self::Gray8 => 4,
        }
    }

    /// Storage bits per pixel.
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Rgb565 => 16,
            Self::Rgb888 => 24,
            Self::Mono | Self::MonoInv => 1,
            Self::Gray8 => 8,
        }
    }

    /// Bytes per pixel, fractional for the packed formats.
    pub fn bytes_per_pixel(self) -> f64 {
        f64::from(self.bits_per_pixel()) / 8.0
    }

    /// Bytes per pixel for whole-byte formats, `None` for packed ones.
    pub const fn whole_bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Mono | Self::MonoInv => None,
            other => Some((other.bits_per_pixel() / 8) as usize),
        }
    }

    /// True for the sub-byte monochrome formats.
    pub const fn is_packed(self) -> bool {
        matches!(self, Self::Mono | Self::MonoInv)
    }

    /// Byte offset of column `x` within a row (rounded down).
    pub const fn column_start(self, x: usize) -> usize {
        x * self.bits_per_pixel() as usize / 8
    }

    /// Byte offset just past column `x - 1` within a row (rounded up).
    pub const fn column_end(self, x: usize) -> usize {
        (x * self.bits_per_pixel() as usize).div_ceil(8)
    }

    /// Bytes per row for a surface `width` pixels wide.
    pub const fn row_stride(self, width: usize) -> usize {
        self.column_end(width)
    }

    /// Total buffer size for a `width` x `height` surface.
    pub const fn buffer_len(self, width: usize, height: usize) -> usize {
        self.row_stride(width) * height
    }

    /// Short label used in status lines.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rgb565 => "RGB16",
            Self::Rgb888 => "RGB24",
            Self::Mono => "MONO",
            Self::MonoInv => "MONOi",
            Self::Gray8 => "GRAY8",
        }
    }

    /// Converts one whole-byte pixel to RGBA8888 `[R, G, B, 255]`.
    ///
    /// For the packed formats `pixel[0]` is interpreted as a single bit value
    /// (0 or non-zero); use [`render_rgba`] to unpack whole rows.
    ///
    /// # Panics
    ///
    /// Panics if `pixel` is shorter than the format's storage size.
    pub fn to_rgba(self, pixel: &[u8]) -> [u8; 4] {
        match self {
            Self::Rgb565 => {
                let value = u16::from_le_bytes([pixel[0], pixel[1]]);
                let r = ((value >> 11) & 0x1F) as u32;
                let g = ((value >> 5) & 0x3F) as u32;
                let b = (value & 0x1F) as u32;
                [
                    (r * 255 / 31) as u8,
                    (g * 255 / 63) as u8,
                    (b * 255 / 31) as u8,
                    255,
                ]
            }
            Self::Rgb888 => [pixel[0], pixel[1], pixel[2], 255],
            Self::Gray8 => [pixel[0], pixel[0], pixel[0], 255],
            Self::Mono => mono_rgba(pixel[0] != 0),
            Self::MonoInv => mono_rgba(pixel[0] == 0),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn mono_rgba(lit: bool) -> [u8; 4] {
    if lit {
        [0xFF, 0xFF, 0xFF, 0xFF]
    } else {
        [0x00, 0x00, 0x00, 0xFF]
    }
}

/// Reads pixel `(x, y)` of a raw buffer as RGBA.
fn pixel_rgba(data: &[u8], stride: usize, format: PixelFormat, x: usize, y: usize) -> [u8; 4] {
    let row = &data[y * stride..(y + 1) * stride];
    if format.is_packed() {
        let bit = (row[x / 8] >> (7 - (x % 8))) & 1;
        format.to_rgba(&[bit])
    } else {
        let start = format.column_start(x);
        format.to_rgba(&row[start..format.column_end(x + 1)])
    }
}

/// Converts a raw framebuffer to a rotated RGBA8888 image.
///
/// Returns `(rgba, out_width, out_height)`. Rotation is clockwise; at 90° and
/// 270° the output dimensions are swapped.
///
/// # Panics
///
/// Panics if `data` is shorter than `format.buffer_len(width, height)`.
///
/// # Example
///
/// ```
/// use vlcd_pixelbuffer::{render_rgba, PixelFormat};
/// use vlcd_common::Rotation;
///
/// // 2x1 grayscale: black, white
/// let (rgba, w, h) = render_rgba(&[0x00, 0xFF], 2, 1, PixelFormat::Gray8, Rotation::Deg90);
/// assert_eq!((w, h), (1, 2));
/// assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
/// assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
/// ```
pub fn render_rgba(
    data: &[u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    rotation: Rotation,
) -> (Vec<u8>, usize, usize) {
    let stride = format.row_stride(width);
    assert!(
        data.len() >= stride * height,
        "buffer length {} is smaller than {}x{} {}",
        data.len(),
        width,
        height,
        format
    );

    let (out_w, out_h) = if rotation.swaps_axes() {
        (height, width)
    } else {
        (width, height)
    };
    let mut out = vec![0u8; out_w * out_h * 4];

    for y in 0..height {
        for x in 0..width {
            let (dx, dy) = match rotation {
                Rotation::Deg0 => (x, y),
                Rotation::Deg90 => (height - 1 - y, x),
                Rotation::Deg180 => (width - 1 - x, height - 1 - y),
                Rotation::Deg270 => (y, width - 1 - x),
            };
            let offset = (dy * out_w + dx) * 4;
            out[offset..offset + 4].copy_from_slice(&pixel_rgba(data, stride, format, x, y));
        }
    }

    (out, out_w, out_h)
}
