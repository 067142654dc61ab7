//! Command dispatcher: applies display commands to the screen and framebuffer.
//!
//! The [`Engine`] owns the [`ScreenState`], the [`WindowedFramebuffer`] and the
//! [`FrameReassembler`]. Inbound bytes go in through [`Engine::feed`]; every
//! complete frame is parsed and applied before `feed` returns, so a renderer
//! never observes a half-applied frame.
//!
//! Per-frame errors never escape `feed`. They are logged, counted in
//! [`EngineStats`] and the next frame is processed normally.

use crate::config::Config;
use crate::errors::VlcdError;
use crate::messages::DisplayEvent;
use crate::screen::ScreenState;
use crate::stats::ThroughputMeter;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};
use vlcd_common::{InputDeviceMask, Rotation};
use vlcd_pixelbuffer::{PixelBuffer, PixelFormat, WindowedFramebuffer};
use vlcd_protocol::messages::InitParams;
use vlcd_protocol::{DisplayCommand, Frame, FrameReassembler, MessageError};

/// Immutable copy of the framebuffer handed to renderers.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    /// Screen parameters the data was produced under.
    pub screen: ScreenState,
    /// Raw pixel data in `screen.format`.
    pub data: Bytes,
}

impl PixelBuffer for FrameSnapshot {
    fn dimensions(&self) -> (u16, u16) {
        (self.screen.width, self.screen.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.screen.format
    }

    fn data(&self) -> &[u8] {
        &self.data
    }
}

impl FrameSnapshot {
    /// Renders the snapshot as RGBA, rotated for display.
    pub fn to_display_rgba(&self) -> (Vec<u8>, usize, usize) {
        self.to_rgba(self.screen.rotation)
    }
}

/// Receiver of engine notifications.
pub trait DisplayObserver {
    /// Screen parameters changed (init accepted, or the screen was disabled).
    fn on_parameters_changed(&mut self, screen: ScreenState);

    /// The framebuffer changed.
    fn on_frame_changed(&mut self, frame: &FrameSnapshot);

    /// Whether a frame notification would be consumed. Returning false lets
    /// the engine skip building the snapshot.
    fn wants_frame(&self) -> bool {
        true
    }
}

impl DisplayObserver for () {
    fn on_parameters_changed(&mut self, _screen: ScreenState) {}

    fn on_frame_changed(&mut self, _frame: &FrameSnapshot) {}

    fn wants_frame(&self) -> bool {
        false
    }
}

impl DisplayObserver for flume::Sender<DisplayEvent> {
    fn on_parameters_changed(&mut self, screen: ScreenState) {
        if let Err(e) = self.try_send(DisplayEvent::ParametersChanged(screen)) {
            debug!("parameters notification dropped: {}", e);
        }
    }

    fn on_frame_changed(&mut self, frame: &FrameSnapshot) {
        if let Err(e) = self.try_send(DisplayEvent::FrameChanged(frame.clone())) {
            debug!("frame notification dropped: {}", e);
        }
    }

    fn wants_frame(&self) -> bool {
        !self.is_full() && !self.is_disconnected()
    }
}

/// Counters kept by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Bytes received through `feed`.
    pub bytes_in: u64,
    /// Frames applied successfully.
    pub frames_applied: u64,
    /// Display commands ignored because the screen was disabled.
    pub ignored_disabled: u64,
    /// Frames with an unknown type byte.
    pub unknown_frames: u64,
    /// Frames rejected by a per-frame error.
    pub rejected_frames: u64,
    /// Framing errors from the reassembler.
    pub framing_errors: u64,
}

impl EngineStats {
    fn record_error(&mut self, err: &VlcdError) {
        match err {
            VlcdError::Framing(_) => self.framing_errors += 1,
            _ => self.rejected_frames += 1,
        }
    }
}

/// Engine shared between the event loop and other threads.
pub type SharedEngine<O> = Arc<Mutex<Engine<O>>>;

/// The protocol engine.
pub struct Engine<O: DisplayObserver> {
    screen: ScreenState,
    framebuffer: WindowedFramebuffer,
    reassembler: FrameReassembler,
    observer: O,
    stats: EngineStats,
    throughput: ThroughputMeter,
}

impl<O: DisplayObserver> Engine<O> {
    /// Creates an engine with default screen parameters.
    pub fn new(observer: O) -> Self {
        Self::with_screen(observer, ScreenState::default(), vlcd_protocol::DEFAULT_MAX_PAYLOAD_LEN)
    }

    /// Creates an engine with the given initial (disabled) screen parameters
    /// and payload limit.
    pub fn with_screen(observer: O, screen: ScreenState, max_payload_len: usize) -> Self {
        let screen = ScreenState {
            enabled: false,
            ..screen
        };
        Self {
            framebuffer: WindowedFramebuffer::new(screen.width, screen.height, screen.format),
            screen,
            reassembler: FrameReassembler::with_max_payload_len(max_payload_len),
            observer,
            stats: EngineStats::default(),
            throughput: ThroughputMeter::default(),
        }
    }

    /// Creates an engine using the configured screen defaults and payload limit.
    pub fn from_config(observer: O, config: &Config) -> Self {
        let screen = ScreenState {
            width: config.screen.width,
            height: config.screen.height,
            format: config.screen.format,
            ..ScreenState::default()
        };
        Self::with_screen(observer, screen, config.protocol.max_payload_len)
    }

    /// Wraps the engine for sharing across threads.
    pub fn into_shared(self) -> SharedEngine<O> {
        Arc::new(Mutex::new(self))
    }

    /// Current screen parameters.
    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    /// The framebuffer in the device's native format.
    pub fn framebuffer(&self) -> &WindowedFramebuffer {
        &self.framebuffer
    }

    /// Copies the current framebuffer.
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            screen: self.screen,
            data: Bytes::copy_from_slice(self.framebuffer.data()),
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Inbound throughput.
    pub fn throughput(&self) -> &ThroughputMeter {
        &self.throughput
    }

    /// Reassembler counters.
    pub fn framing_stats(&self) -> vlcd_protocol::ReassemblerStats {
        self.reassembler.stats()
    }

    /// The attached observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable access to the attached observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Processes received bytes and returns the number of frames applied.
    pub fn feed(&mut self, data: &[u8]) -> usize {
        self.stats.bytes_in += data.len() as u64;
        self.throughput.record(data.len(), Instant::now());
        self.reassembler.extend(data);

        let mut applied = 0;
        loop {
            match self.reassembler.next_frame() {
                Ok(Some(frame)) => {
                    if self.apply_frame(&frame).is_ok() {
                        applied += 1;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    let err = VlcdError::from(e);
                    self.stats.record_error(&err);
                    warn!("{}, resynchronizing", err);
                }
            }
        }
        applied
    }

    /// Parses and applies one frame.
    ///
    /// Unknown frame types are ignored and reported as success. Errors are
    /// logged and counted before being returned.
    pub fn apply_frame(&mut self, frame: &Frame) -> Result<(), VlcdError> {
        let result = match DisplayCommand::parse(frame.kind, &frame.payload) {
            Ok(command) => self.apply_command(command),
            Err(MessageError::UnknownType(kind)) => {
                self.stats.unknown_frames += 1;
                debug!(kind, "ignoring unknown frame type");
                return Ok(());
            }
            Err(e) => Err(e.into()),
        };

        match &result {
            Ok(()) => self.stats.frames_applied += 1,
            Err(e) => {
                self.stats.record_error(e);
                warn!(kind = frame.kind, "frame rejected: {}", e);
            }
        }
        result
    }

    /// Applies one parsed display command.
    pub fn apply_command(&mut self, command: DisplayCommand) -> Result<(), VlcdError> {
        let kind = command.kind();
        match command {
            DisplayCommand::Init(params) => return self.init(params),
            _ if !self.screen.enabled => {
                self.stats.ignored_disabled += 1;
                debug!(kind, "screen disabled, command ignored");
                return Ok(());
            }
            DisplayCommand::SetWindow(rect) => {
                self.framebuffer
                    .set_window(rect.x, rect.y, rect.width, rect.height)?;
                trace!(?rect, "window set");
                return Ok(());
            }
            DisplayCommand::Write(data) => {
                self.framebuffer.write(&data);
            }
            DisplayCommand::SetWindowWrite { rect, data } => {
                self.framebuffer
                    .set_window(rect.x, rect.y, rect.width, rect.height)?;
                self.framebuffer.write(&data);
            }
            DisplayCommand::DrawPoint { x, y, color } => {
                self.framebuffer.draw_point(x, y, color)?;
            }
        }

        self.notify_frame();
        Ok(())
    }

    /// Marks the screen disabled, e.g. after the transport was lost.
    pub fn disable(&mut self) {
        self.screen.enabled = false;
        self.reassembler.reset();
        info!("screen disabled");
        self.observer.on_parameters_changed(self.screen);
    }

    fn init(&mut self, params: InitParams) -> Result<(), VlcdError> {
        let screen = match validate_init(params) {
            Ok(screen) => screen,
            Err(e) => {
                let was_enabled = self.screen.enabled;
                self.screen.enabled = false;
                if was_enabled {
                    self.observer.on_parameters_changed(self.screen);
                }
                return Err(e);
            }
        };

        self.screen = screen;
        self.framebuffer
            .reset(screen.width, screen.height, screen.format);
        info!("screen initialized: {}", screen);
        self.observer.on_parameters_changed(screen);
        Ok(())
    }

    fn notify_frame(&mut self) {
        if self.observer.wants_frame() {
            let snapshot = self.snapshot();
            self.observer.on_frame_changed(&snapshot);
        } else {
            trace!("frame notification skipped");
        }
    }
}

/// Checks init parameters and builds the new screen state.
fn validate_init(params: InitParams) -> Result<ScreenState, VlcdError> {
    let rotation =
        Rotation::from_code(params.rotation).ok_or(VlcdError::InvalidRotation(params.rotation))?;
    if params.width == 0 || params.height == 0 {
        return Err(VlcdError::InvalidDimensions {
            width: params.width,
            height: params.height,
        });
    }
    let format = PixelFormat::from_code(params.format)?;

    Ok(ScreenState {
        width: params.width,
        height: params.height,
        rotation,
        format,
        enabled: true,
        devices: InputDeviceMask::from_bits_truncate(params.devices),
    })
}
