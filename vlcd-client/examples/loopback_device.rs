//! Simulated device - listens for a bridge and serves a test pattern.
//!
//! Usage:
//!   cargo run --example loopback_device -- 127.0.0.1:7000
//!
//! Then point the viewer at the same address:
//!   cargo run -p vlcd-viewer -- 127.0.0.1:7000 --snapshot-dir /tmp/vlcd
//!
//! The device answers every init request with its init command, then
//! redraws a scrolling bar pattern every 100ms and logs the input it
//! receives.

use bytes::Bytes;
use std::env;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};
use vlcd_common::{InputDeviceMask, Rect, Rotation};
use vlcd_protocol::{DisplayCommand, FrameReassembler, FrameWriter, InitParams, InputEvent};

const WIDTH: u16 = 160;
const HEIGHT: u16 = 80;
const FORMAT_RGB565: u8 = 0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:7000".to_string());
    let listener = TcpListener::bind(&addr).await?;
    info!("Device listening on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Bridge connected from {}", peer);
        if let Err(e) = serve(stream).await {
            warn!("Session ended: {}", e);
        }
    }
}

async fn serve(stream: TcpStream) -> anyhow::Result<()> {
    stream.set_nodelay(true)?;
    let (mut reader, writer) = stream.into_split();
    let mut out = FrameWriter::new(writer);
    let mut reassembler = FrameReassembler::new();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let mut buf = vec![0u8; 4096];
    let mut initialized = false;
    let mut phase: u16 = 0;

    let init = DisplayCommand::Init(InitParams::new(
        WIDTH,
        HEIGHT,
        FORMAT_RGB565,
        Rotation::Deg0,
        InputDeviceMask::all(),
    ));

    loop {
        tokio::select! {
            n = reader.read(&mut buf) => {
                let n = n?;
                if n == 0 {
                    info!("Bridge disconnected");
                    return Ok(());
                }
                for frame in reassembler.feed(&buf[..n]) {
                    match InputEvent::parse(frame.kind, &frame.payload) {
                        Ok(InputEvent::InitRequest) => {
                            info!("Init requested");
                            out.write_command(&init);
                            out.write_command(&full_frame(phase));
                            out.flush().await?;
                            initialized = true;
                        }
                        Ok(event) => info!("Input: {:?}", event),
                        Err(e) => warn!("Bad input frame: {}", e),
                    }
                }
            }

            _ = ticker.tick(), if initialized => {
                phase = (phase + 1) % WIDTH;
                out.write_command(&column(phase));
                out.write_command(&DisplayCommand::DrawPoint {
                    x: phase,
                    y: HEIGHT / 2,
                    color: 0xFFFF,
                });
                out.flush().await?;
            }
        }
    }
}

fn bar_color(x: u16) -> u16 {
    match (x / 20) % 4 {
        0 => 0xF800,
        1 => 0x07E0,
        2 => 0x001F,
        _ => 0x0000,
    }
}

fn full_frame(phase: u16) -> DisplayCommand {
    let mut data = Vec::with_capacity(usize::from(WIDTH) * usize::from(HEIGHT) * 2);
    for _ in 0..HEIGHT {
        for x in 0..WIDTH {
            data.extend_from_slice(&bar_color(x.wrapping_add(phase)).to_le_bytes());
        }
    }
    DisplayCommand::SetWindowWrite {
        rect: Rect::new(0, 0, WIDTH, HEIGHT),
        data: Bytes::from(data),
    }
}

fn column(x: u16) -> DisplayCommand {
    let color = bar_color(x.wrapping_mul(3)).to_le_bytes();
    let data: Vec<u8> = (0..HEIGHT).flat_map(|_| color).collect();
    DisplayCommand::SetWindowWrite {
        rect: Rect::new(x, 0, 1, HEIGHT),
        data: Bytes::from(data),
    }
}
