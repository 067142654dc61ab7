//! Virtual LCD wire protocol.
//!
//! This crate provides the framing and message layer shared by the host and
//! the device. It has no knowledge of pixel buffers or screen state.
//!
//! # Modules
//!
//! - [`frame`] - The `0xAA 0x55` envelope and frame encoding
//! - [`reassembler`] - Incremental frame parsing with resynchronization
//! - [`messages`] - Display commands and input events
//! - [`io`] - Buffered async frame output
//! - [`trace`] - Opt-in wire trace (`VLCD_TRACE=1`)
//!
//! # Examples
//!
//! ```
//! use vlcd_protocol::{DisplayCommand, FrameReassembler};
//!
//! let wire = DisplayCommand::DrawPoint { x: 3, y: 4, color: 0xF800 }.encode();
//!
//! let mut reassembler = FrameReassembler::new();
//! for frame in reassembler.feed(&wire) {
//!     let cmd = DisplayCommand::parse(frame.kind, &frame.payload).unwrap();
//!     assert_eq!(cmd, DisplayCommand::DrawPoint { x: 3, y: 4, color: 0xF800 });
//! }
//! ```

pub mod frame;
pub mod io;
pub mod messages;
pub mod reassembler;
pub mod trace;

// Re-export commonly used types
pub use frame::{encode_frame, Frame, DEFAULT_MAX_PAYLOAD_LEN, HEADER_LEN, SYNC};
pub use io::FrameWriter;
pub use messages::{DisplayCommand, InitParams, InputEvent, MessageError};
pub use reassembler::{FrameReassembler, FramingError, ReassemblerStats};
