//! Transport layer for device connections.
//!
//! The bridge runs over any byte stream implementing tokio's `AsyncRead` and
//! `AsyncWrite`. This module provides the TCP connector and the outbound
//! path: an [`OutboundLink`] that never blocks its caller, drained by a writer
//! task into a [`FrameWriter`].

use crate::errors::VlcdError;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use vlcd_protocol::{FrameWriter, InputEvent};

/// Connects to a device over TCP.
///
/// TCP_NODELAY is enabled so small input frames are not delayed.
///
/// # Errors
///
/// Returns [`VlcdError::Timeout`] if the connection is not established within
/// `timeout`, and [`VlcdError::ConnectionFailed`] if it is refused.
pub async fn connect_tcp(
    address: &str,
    timeout: std::time::Duration,
) -> Result<TcpStream, VlcdError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
        .await
        .map_err(|_| VlcdError::Timeout(timeout))?
        .map_err(|e| {
            VlcdError::ConnectionFailed(format!("Failed to connect to {}: {}", address, e))
        })?;

    stream.set_nodelay(true).map_err(|e| {
        VlcdError::ConnectionFailed(format!("Failed to set TCP_NODELAY: {}", e))
    })?;

    if let (Ok(local), Ok(peer)) = (stream.local_addr(), stream.peer_addr()) {
        info!("Connected via TCP: local={} -> remote={}", local, peer);
    } else {
        info!("Connected to {} via TCP", address);
    }
    Ok(stream)
}

/// Non-blocking sender of outbound input events.
///
/// A full or closed link drops the event.
#[derive(Debug, Clone)]
pub struct OutboundLink {
    tx: flume::Sender<InputEvent>,
}

impl OutboundLink {
    /// Creates a link and the receiver its writer drains.
    pub fn bounded(capacity: usize) -> (Self, flume::Receiver<InputEvent>) {
        let (tx, rx) = flume::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Queues `event`. Returns false if it was dropped.
    pub fn try_send(&self, event: InputEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(kind = event.kind(), "outbound event dropped: {}", e);
                false
            }
        }
    }

    /// Queues every event in order.
    pub fn send_all(&self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.try_send(event);
        }
    }

    /// True once the writer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_disconnected()
    }
}

/// Spawns the writer task.
///
/// The task encodes queued events in batches and flushes after each batch.
/// It ends when every [`OutboundLink`] is dropped or on the first write error.
pub fn spawn_writer<W>(
    writer: W,
    events: flume::Receiver<InputEvent>,
) -> JoinHandle<Result<(), VlcdError>>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut out = FrameWriter::new(writer);
        while let Ok(event) = events.recv_async().await {
            out.write_event(&event);
            while let Ok(event) = events.try_recv() {
                out.write_event(&event);
            }
            out.flush().await?;
        }
        debug!("outbound link closed, writer exiting");
        Ok(())
    })
}
