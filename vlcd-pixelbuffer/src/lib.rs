//! Pixel formats and framebuffer management for the virtual LCD bridge.
//!
//! This crate provides the device-native pixel store and everything needed to
//! interpret it:
//! - [`PixelFormat`] - the five wire pixel formats and their byte arithmetic
//! - [`Window`] / [`WindowedFramebuffer`] - the clipping, wrapping write window
//! - [`render_rgba`] - conversion to rotated RGBA8888 for display
//! - [`MonoRowPacker`] - MSB-first packing of monochrome bitmaps

pub mod buffer;
pub mod format;
pub mod pack;
pub mod window;
pub mod windowed;

pub use buffer::PixelBuffer;
pub use format::{render_rgba, PixelFormat, UnsupportedFormat};
pub use pack::{MonoRowPacker, PackError};
pub use window::Window;
pub use windowed::{FramebufferError, WindowedFramebuffer};
