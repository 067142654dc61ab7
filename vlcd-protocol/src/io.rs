//! Buffered frame output.
//!
//! [`FrameWriter`] batches encoded frames in a `BytesMut` and writes them to
//! any `AsyncWrite` on [`flush`](FrameWriter::flush).
//!
//! # Examples
//!
//! ```no_run
//! use vlcd_protocol::io::FrameWriter;
//! use vlcd_protocol::InputEvent;
//!
//! # async fn example<W: tokio::io::AsyncWrite + Unpin>(writer: W) -> std::io::Result<()> {
//! let mut out = FrameWriter::new(writer);
//! out.write_event(&InputEvent::InitRequest);
//! out.flush().await?;
//! # Ok(())
//! # }
//! ```

use crate::frame::{encode_into, Frame};
use crate::messages::{DisplayCommand, InputEvent};
use crate::trace;
use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Buffered writer for outbound frames.
///
/// # Important: Flushing
///
/// Frames are only sent when [`flush()`](Self::flush) is called. Dropping the
/// writer without flushing loses anything buffered.
pub struct FrameWriter<W> {
    writer: W,
    buffer: BytesMut,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Create a writer with the default buffer size (8KB).
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 8192)
    }

    /// Create a writer with a specific initial buffer capacity.
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Buffer one raw frame.
    pub fn write_raw(&mut self, kind: u8, payload: &[u8]) {
        trace::outbound(kind, payload);
        encode_into(&mut self.buffer, kind, payload);
    }

    /// Buffer a frame.
    pub fn write_frame(&mut self, frame: &Frame) {
        self.write_raw(frame.kind, &frame.payload);
    }

    /// Buffer an input event.
    pub fn write_event(&mut self, event: &InputEvent) {
        self.write_raw(event.kind(), &event.payload());
    }

    /// Buffer a display command.
    pub fn write_command(&mut self, command: &DisplayCommand) {
        self.write_raw(command.kind(), &command.payload());
    }

    /// Write all buffered frames and flush the underlying writer.
    pub async fn flush(&mut self) -> std::io::Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer).await?;
            self.buffer.clear();
        }
        self.writer.flush().await
    }

    /// Number of bytes waiting to be flushed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the writer and return the underlying stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameReassembler;

    #[tokio::test]
    async fn test_flush_writes_all_frames() {
        let mut out = FrameWriter::new(Vec::new());
        out.write_event(&InputEvent::InitRequest);
        out.write_event(&InputEvent::Button {
            index: 1,
            pressed: true,
        });
        assert_eq!(out.buffered(), 7 + 9);

        out.flush().await.unwrap();
        assert_eq!(out.buffered(), 0);

        let frames = FrameReassembler::new().feed(out.get_ref());
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].kind, 0xFF);
        assert_eq!(&frames[1].payload[..], &[1, 1]);
    }

    #[tokio::test]
    async fn test_flush_empty_is_noop() {
        let mut out = FrameWriter::new(Vec::new());
        out.flush().await.unwrap();
        assert!(out.into_inner().is_empty());
    }
}
