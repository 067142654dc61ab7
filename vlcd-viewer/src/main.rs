mod snapshot;

use anyhow::{bail, Result};
use snapshot::SnapshotWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vlcd_client::args::Args;
use vlcd_client::{Client, ClientBuilder, Config, DisplayEvent};

const STATUS_INTERVAL: Duration = Duration::from_secs(1);

fn init_logging(verbose: u8) -> Result<()> {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "vlcd_viewer={0},vlcd_client={0},vlcd_protocol={0},protocol_trace=trace",
                    log_level
                )
                .into()
            }),
        )
        .with_target(false)
        .init();

    Ok(())
}

/// `config.toml` in the platform config directory, if it exists.
fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vlcd-viewer")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.exists())
}

fn load_config(args: &Args) -> Result<Config> {
    if args.config.is_some() {
        return Ok(Config::from_args(args)?);
    }
    let base = match default_config_path() {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::load(&path)?
        }
        None => Config::default(),
    };
    Ok(Config::merge_args(base, args)?)
}

enum SessionEnd {
    Disconnected,
    Interrupted,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    info!("Starting vlcd-viewer {}", env!("CARGO_PKG_VERSION"));
    let config = load_config(&args)?;

    let mut snapshots = match &args.snapshot_dir {
        Some(dir) => Some(SnapshotWriter::new(
            dir,
            Duration::from_millis(args.snapshot_interval_ms),
        )?),
        None => None,
    };

    let mut attempts: u32 = 0;
    loop {
        info!("Connecting to {}", config.connection.address);
        match ClientBuilder::new(config.clone()).connect().await {
            Ok(client) => {
                attempts = 0;
                match run_session(client, snapshots.as_mut()).await? {
                    SessionEnd::Interrupted => break,
                    SessionEnd::Disconnected => {}
                }
            }
            Err(e) if e.is_retryable() => warn!("Connection failed: {}", e),
            Err(e) => return Err(e.into()),
        }

        if !config.reconnect.enabled {
            break;
        }
        attempts += 1;
        if config.reconnect.max_retries > 0 && attempts > config.reconnect.max_retries {
            bail!("Giving up after {} reconnection attempts", attempts - 1);
        }
        debug!("Reconnecting in {:?}", config.reconnect_interval());
        tokio::time::sleep(config.reconnect_interval()).await;
    }

    if let Some(writer) = &snapshots {
        info!("{} snapshots written to {}", writer.written(), writer.path().display());
    }
    info!("Exiting");
    Ok(())
}

async fn run_session(
    client: Client,
    mut snapshots: Option<&mut SnapshotWriter>,
) -> Result<SessionEnd> {
    let handle = client.handle();
    let engine = client.engine();
    let mut status = tokio::time::interval(STATUS_INTERVAL);
    let mut frames: u64 = 0;

    let end = loop {
        tokio::select! {
            event = handle.events().recv_async() => {
                let Ok(event) = event else {
                    break SessionEnd::Disconnected;
                };
                match event {
                    DisplayEvent::Connected { peer } => info!("Connected to {}", peer),
                    DisplayEvent::ParametersChanged(screen) => info!("Screen: {}", screen),
                    DisplayEvent::FrameChanged(frame) => {
                        frames += 1;
                        if let Some(writer) = snapshots.as_deref_mut() {
                            if let Err(e) = writer.offer(&frame, Instant::now()) {
                                warn!("Snapshot failed: {:#}", e);
                            }
                        }
                    }
                    DisplayEvent::Error { message } => warn!("Connection error: {}", message),
                    DisplayEvent::ConnectionClosed => {
                        info!("Connection closed");
                        break SessionEnd::Disconnected;
                    }
                }
            }

            _ = status.tick() => {
                let engine = engine.lock();
                let stats = engine.stats();
                info!(
                    frames_applied = stats.frames_applied,
                    rejected = stats.rejected_frames,
                    notifications = frames,
                    "{} {}",
                    engine.screen(),
                    engine.throughput().format_rate()
                );
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing connection");
                if let Err(e) = handle.close() {
                    debug!("Close request not delivered: {}", e);
                }
                break SessionEnd::Interrupted;
            }
        }
    };

    if let Err(e) = client.join().await {
        warn!("{}", e);
    }
    Ok(end)
}
