//! End-to-end tests of the client loop against an in-memory device.

use bytes::Bytes;
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use vlcd_client::{ClientBuilder, Config, DisplayEvent, InputCommand, VlcdError};
use vlcd_common::{InputDeviceMask, Rect, Rotation};
use vlcd_pixelbuffer::PixelBuffer;
use vlcd_protocol::{DisplayCommand, Frame, FrameReassembler, InitParams, InputEvent};

const WAIT: Duration = Duration::from_secs(5);

struct Device {
    io: DuplexStream,
    reassembler: FrameReassembler,
    pending: Vec<Frame>,
}

impl Device {
    fn new(io: DuplexStream) -> Self {
        Self {
            io,
            reassembler: FrameReassembler::new(),
            pending: Vec::new(),
        }
    }

    async fn next_event(&mut self) -> InputEvent {
        loop {
            if !self.pending.is_empty() {
                let frame = self.pending.remove(0);
                return InputEvent::parse(frame.kind, &frame.payload).unwrap();
            }
            let mut buf = [0u8; 256];
            let n = tokio::time::timeout(WAIT, self.io.read(&mut buf))
                .await
                .expect("device read timed out")
                .unwrap();
            assert!(n > 0, "client closed the stream");
            self.pending = self.reassembler.feed(&buf[..n]);
        }
    }

    async fn send(&mut self, command: DisplayCommand) {
        self.io.write_all(&command.encode()).await.unwrap();
    }
}

fn config() -> Config {
    Config::builder().address("duplex").build().unwrap()
}

fn init(width: u16, height: u16, format: u8) -> DisplayCommand {
    DisplayCommand::Init(InitParams::new(
        width,
        height,
        format,
        Rotation::Deg0,
        InputDeviceMask::all(),
    ))
}

async fn next_display_event(rx: &flume::Receiver<DisplayEvent>) -> DisplayEvent {
    tokio::time::timeout(WAIT, rx.recv_async())
        .await
        .expect("no display event")
        .unwrap()
}

#[tokio::test]
async fn test_init_request_then_draw() {
    let (client_io, device_io) = tokio::io::duplex(4096);
    let mut device = Device::new(device_io);
    let client = ClientBuilder::new(config()).build_with_io(client_io).unwrap();
    let handle = client.handle();

    assert_eq!(device.next_event().await, InputEvent::InitRequest);
    assert!(matches!(
        next_display_event(handle.events()).await,
        DisplayEvent::Connected { .. }
    ));

    device.send(init(4, 2, 4)).await;
    device
        .send(DisplayCommand::SetWindowWrite {
            rect: Rect::new(1, 0, 2, 2),
            data: Bytes::from_static(&[1, 2, 3, 4]),
        })
        .await;

    match next_display_event(handle.events()).await {
        DisplayEvent::ParametersChanged(screen) => {
            assert!(screen.enabled);
            assert_eq!(screen.summary(), "4x2@0° GRAY8 DEV[KTMBE]");
        }
        other => panic!("unexpected event {:?}", other),
    }
    match next_display_event(handle.events()).await {
        DisplayEvent::FrameChanged(frame) => {
            assert_eq!(frame.data(), &[0, 1, 2, 0, 0, 3, 4, 0]);
        }
        other => panic!("unexpected event {:?}", other),
    }

    let engine = client.engine();
    assert_eq!(engine.lock().framebuffer().data(), &[0, 1, 2, 0, 0, 3, 4, 0]);
    assert_eq!(engine.lock().stats().frames_applied, 2);
}

#[tokio::test]
async fn test_input_reaches_device() {
    let (client_io, device_io) = tokio::io::duplex(4096);
    let mut device = Device::new(device_io);
    let client = ClientBuilder::new(config()).build_with_io(client_io).unwrap();
    let handle = client.handle();

    assert_eq!(device.next_event().await, InputEvent::InitRequest);
    device.send(init(10, 10, 0)).await;

    // Wait until the init has been applied so device gating is current.
    loop {
        if let DisplayEvent::ParametersChanged(screen) = next_display_event(handle.events()).await
        {
            assert!(screen.enabled);
            break;
        }
    }

    handle
        .send(InputCommand::Button {
            index: 3,
            pressed: true,
        })
        .unwrap();
    handle.send(InputCommand::EncoderRotate { delta: 300 }).unwrap();

    assert_eq!(
        device.next_event().await,
        InputEvent::Button {
            index: 3,
            pressed: true
        }
    );
    assert_eq!(
        device.next_event().await,
        InputEvent::Encoder {
            delta: 127,
            pressed: false
        }
    );
}

#[tokio::test]
async fn test_device_eof_disables_screen() {
    let (client_io, device_io) = tokio::io::duplex(4096);
    let mut device = Device::new(device_io);
    let client = ClientBuilder::new(config()).build_with_io(client_io).unwrap();
    let handle = client.handle();

    device.send(init(8, 8, 1)).await;
    drop(device);

    let mut saw_disabled = false;
    loop {
        match next_display_event(handle.events()).await {
            DisplayEvent::ParametersChanged(screen) if !screen.enabled => saw_disabled = true,
            DisplayEvent::ConnectionClosed => break,
            _ => {}
        }
    }
    assert!(saw_disabled);
    assert!(!client.engine().lock().screen().enabled);
    client.join().await.unwrap();
}

#[tokio::test]
async fn test_close_command_ends_loop() {
    let (client_io, _device_io) = tokio::io::duplex(4096);
    let client = ClientBuilder::new(config()).build_with_io(client_io).unwrap();
    let handle = client.handle();

    handle.close().unwrap();
    tokio::time::timeout(WAIT, client.join())
        .await
        .expect("client did not stop")
        .unwrap();
    assert!(matches!(handle.close(), Err(VlcdError::ConnectionClosed)));

    let mut closed = false;
    while let Ok(event) = handle.events().try_recv() {
        closed |= matches!(event, DisplayEvent::ConnectionClosed);
    }
    assert!(closed);
}

#[tokio::test(start_paused = true)]
async fn test_init_request_repeats_until_init() {
    let (client_io, device_io) = tokio::io::duplex(4096);
    let mut device = Device::new(device_io);
    let _client = ClientBuilder::new(config()).build_with_io(client_io).unwrap();

    assert_eq!(device.next_event().await, InputEvent::InitRequest);
    assert_eq!(device.next_event().await, InputEvent::InitRequest);
}
