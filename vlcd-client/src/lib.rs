//! Host side of the virtual LCD bridge.
//!
//! This crate drives a remote device's virtual display: it reassembles the
//! device's display commands from a byte stream, applies them to a windowed
//! framebuffer, and sends host input back as device events. It is built on
//! the `vlcd-protocol`, `vlcd-pixelbuffer` and `vlcd-input` crates.
//!
//! # Quick Start
//!
//! ```no_run
//! use vlcd_client::{ClientBuilder, Config, DisplayEvent};
//! use anyhow::Result;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::builder().address("192.168.1.50:7000").build()?;
//!
//!     let client = ClientBuilder::new(config).connect().await?;
//!     let handle = client.handle();
//!
//!     while let Ok(event) = handle.events().recv_async().await {
//!         match event {
//!             DisplayEvent::ParametersChanged(screen) => println!("{}", screen),
//!             DisplayEvent::FrameChanged(frame) => {
//!                 let (_rgba, _w, _h) = frame.to_display_rgba();
//!             }
//!             DisplayEvent::ConnectionClosed => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! One task per connection runs a `select!` loop over:
//!
//! - **Read arm**: feeds received bytes to the [`Engine`], which applies every
//!   complete frame before the arm yields
//! - **Command arm**: turns [`InputCommand`]s into device events
//! - **Init-request timer**: asks the device for its init while the screen is
//!   disabled
//!
//! A writer task drains outbound events. Notifications reach the application
//! through a bounded channel; a full channel drops them rather than stalling
//! the loop.
//!
//! # Error Handling
//!
//! Errors confined to one frame (bad framing, short payloads, rejected
//! windows, rejected init) are logged and counted, never fatal. Transport
//! errors end the connection and are reported as [`DisplayEvent::Error`].

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod errors;
pub mod messages;
pub mod screen;
pub mod stats;
pub mod transport;

mod event_loop;

#[cfg(feature = "cli")]
pub mod args;

pub use config::Config;
pub use engine::{DisplayObserver, Engine, EngineStats, FrameSnapshot, SharedEngine};
pub use errors::VlcdError;
pub use event_loop::ChannelEngine;
pub use messages::{DisplayEvent, InputCommand};
pub use screen::ScreenState;
pub use stats::ThroughputMeter;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tracing::debug;

/// Builder for creating a bridge client.
///
/// # Examples
///
/// ```no_run
/// use vlcd_client::{ClientBuilder, Config};
/// # use anyhow::Result;
///
/// # async fn example() -> Result<()> {
/// let config = Config::builder().address("localhost:7000").build()?;
/// let client = ClientBuilder::new(config).connect().await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: Config,
}

impl ClientBuilder {
    /// Creates a new client builder with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Connects to `connection.address` over TCP and starts the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, or the connection
    /// fails or times out.
    pub async fn connect(self) -> Result<Client, VlcdError> {
        self.config.validate()?;
        let address = self.config.connection.address.clone();
        let stream = transport::connect_tcp(&address, self.config.timeout()).await?;
        Ok(self.start(stream, address))
    }

    /// Starts the client over an already-connected stream.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build_with_io<S>(self, io: S) -> Result<Client, VlcdError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        self.config.validate()?;
        Ok(self.start(io, "stream".to_string()))
    }

    fn start<S>(self, io: S, peer: String) -> Client
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let channels = &self.config.channels;
        let (cmd_tx, cmd_rx) = flume::bounded(channels.command_capacity);
        let (event_tx, event_rx) = flume::bounded(channels.event_capacity);

        let engine = Engine::from_config(event_tx.clone(), &self.config).into_shared();
        event_loop::emit(&event_tx, DisplayEvent::Connected { peer });

        let join_handle = event_loop::spawn(io, self.config, engine.clone(), cmd_rx, event_tx);

        Client {
            handle: ClientHandle {
                commands: cmd_tx,
                events: event_rx,
            },
            engine,
            join_handle: Some(join_handle),
        }
    }
}

/// Handle for interacting with a running client.
///
/// This handle allows sending input and receiving display events. It can be
/// cloned and shared across threads.
#[derive(Clone)]
pub struct ClientHandle {
    commands: flume::Sender<InputCommand>,
    events: flume::Receiver<DisplayEvent>,
}

impl ClientHandle {
    /// Sends an input command to the device.
    ///
    /// # Errors
    ///
    /// Returns an error if the client has been shut down.
    pub fn send(&self, cmd: InputCommand) -> Result<(), VlcdError> {
        self.commands
            .send(cmd)
            .map_err(|_| VlcdError::ConnectionClosed)
    }

    /// Returns a reference to the event receiver.
    #[must_use]
    pub fn events(&self) -> &flume::Receiver<DisplayEvent> {
        &self.events
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the client has already been shut down.
    pub fn close(&self) -> Result<(), VlcdError> {
        self.send(InputCommand::Close)
    }
}

/// A running client.
///
/// Dropping the client asks its connection task to close.
pub struct Client {
    handle: ClientHandle,
    engine: ChannelEngine,
    join_handle: Option<JoinHandle<()>>,
}

impl Client {
    /// Returns a handle for interacting with the client.
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        self.handle.clone()
    }

    /// Returns the shared engine, for reading screen state and snapshots.
    #[must_use]
    pub fn engine(&self) -> ChannelEngine {
        self.engine.clone()
    }

    /// Waits for the connection task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection task panicked.
    pub async fn join(mut self) -> Result<(), VlcdError> {
        match self.join_handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| VlcdError::Internal(format!("Client task panicked: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if self.join_handle.is_some() {
            if let Err(e) = self.handle.commands.try_send(InputCommand::Close) {
                debug!("close on drop not delivered: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_handle_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClientHandle>();
        assert_send_sync::<ChannelEngine>();
    }

    #[test]
    fn test_build_with_io_rejects_invalid_config() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let (io, _peer) = tokio::io::duplex(64);
            let result = ClientBuilder::new(Config::default()).build_with_io(io);
            assert!(matches!(result, Err(VlcdError::Config(_))));
        });
    }
}
