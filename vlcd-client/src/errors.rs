//! Error types for the virtual LCD client.

use std::io;
use thiserror::Error;
use vlcd_pixelbuffer::{FramebufferError, UnsupportedFormat};
use vlcd_protocol::{FramingError, MessageError};

/// Errors that can occur during bridge operation.
///
/// Per-frame errors (`Framing`, `Message`, `Framebuffer`, `UnsupportedFormat`,
/// `InvalidRotation`, `InvalidDimensions`) are contained by the engine: they
/// are logged and counted, and processing continues with the next frame.
#[derive(Debug, Error)]
pub enum VlcdError {
    /// Byte stream framing error; the reassembler has resynchronized.
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Malformed message payload.
    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    /// Rejected window or point.
    #[error("Framebuffer error: {0}")]
    Framebuffer(#[from] FramebufferError),

    /// Init carried an unknown pixel format code.
    #[error("Init rejected: {0}")]
    UnsupportedFormat(#[from] UnsupportedFormat),

    /// Init carried a rotation code outside 0..=3.
    #[error("Init rejected: invalid rotation code {0}")]
    InvalidRotation(u8),

    /// Init carried a zero width or height.
    #[error("Init rejected: invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u16, height: u16 },

    /// Transport-level error (TCP, socket operations).
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    /// Connection failed (TCP connection establishment failed).
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection timeout.
    #[error("Connection timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection has been closed.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Internal error (should not happen in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VlcdError {
    /// Returns true if this error is potentially retryable.
    ///
    /// Retryable errors are transient link problems; reconnecting may
    /// succeed. Configuration errors are fatal.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Timeout(_)
                | Self::ConnectionFailed(_)
                | Self::ConnectionClosed
        )
    }

    /// Returns true if this is a fatal error that should not be retried.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        assert!(VlcdError::Transport(io::Error::from(io::ErrorKind::ConnectionReset))
            .is_retryable());
        assert!(VlcdError::Timeout(std::time::Duration::from_secs(10)).is_retryable());
        assert!(VlcdError::ConnectionClosed.is_retryable());
        assert!(VlcdError::ConnectionFailed("refused".to_string()).is_retryable());

        assert!(VlcdError::Config("bad address".to_string()).is_fatal());
        assert!(VlcdError::Internal("oops".to_string()).is_fatal());
    }

    #[test]
    fn test_frame_errors_are_not_retryable() {
        assert!(VlcdError::InvalidRotation(7).is_fatal());
        assert!(VlcdError::from(UnsupportedFormat(9)).is_fatal());
        assert!(VlcdError::from(MessageError::UnknownType(0x42)).is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = VlcdError::InvalidDimensions {
            width: 0,
            height: 480,
        };
        assert_eq!(err.to_string(), "Init rejected: invalid dimensions 0x480");

        let err = VlcdError::from(FramingError::PayloadTooLarge { len: 20, max: 10 });
        assert_eq!(
            err.to_string(),
            "Framing error: frame payload length 20 exceeds maximum 10"
        );

        let err = VlcdError::Timeout(std::time::Duration::from_secs(5));
        assert!(err.to_string().contains("5s"));
    }
}
