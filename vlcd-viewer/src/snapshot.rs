//! PNG export of the device screen.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;
use vlcd_client::FrameSnapshot;
use vlcd_pixelbuffer::PixelBuffer;

/// File name of the most recent snapshot inside the snapshot directory.
pub const LATEST: &str = "latest.png";

/// Writes the latest frame to `<dir>/latest.png`, at most once per interval.
pub struct SnapshotWriter {
    dir: PathBuf,
    min_interval: Duration,
    last_written: Option<Instant>,
    written: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, min_interval: Duration) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;
        Ok(Self {
            dir,
            min_interval,
            last_written: None,
            written: 0,
        })
    }

    /// Path the next snapshot is written to.
    pub fn path(&self) -> PathBuf {
        self.dir.join(LATEST)
    }

    /// Number of snapshots written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes `frame` unless the previous write was less than the interval ago.
    /// Returns whether a file was written.
    pub fn offer(&mut self, frame: &FrameSnapshot, now: Instant) -> Result<bool> {
        if let Some(last) = self.last_written {
            if now.duration_since(last) < self.min_interval {
                return Ok(false);
            }
        }
        self.write(frame)?;
        self.last_written = Some(now);
        Ok(true)
    }

    /// Writes `frame` unconditionally.
    pub fn write(&mut self, frame: &FrameSnapshot) -> Result<()> {
        // Write then rename, so readers never see a partial file.
        let tmp = self.dir.join(".latest.png.tmp");
        write_png(&tmp, frame)?;
        std::fs::rename(&tmp, self.path())
            .with_context(|| format!("Failed to move snapshot into {}", self.dir.display()))?;
        self.written += 1;
        debug!(
            format = %frame.pixel_format(),
            "snapshot {} written to {}",
            self.written,
            self.path().display()
        );
        Ok(())
    }
}

/// Encodes `frame`, rotated for display, as a PNG file.
pub fn write_png(path: &Path, frame: &FrameSnapshot) -> Result<()> {
    let (rgba, width, height) = frame.to_display_rgba();
    let image = image::RgbaImage::from_raw(width as u32, height as u32, rgba)
        .context("Snapshot buffer does not match its dimensions")?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))
}
