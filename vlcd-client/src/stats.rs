//! Inbound link throughput.
//!
//! Bytes are summed over a refresh window; once more than the window has
//! elapsed the rate is recomputed and the sum restarts. Readers see a value
//! that changes at most once per window.

use std::time::{Duration, Instant};

/// Default averaging window.
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(2);

/// Windowed byte-rate meter.
#[derive(Debug, Clone)]
pub struct ThroughputMeter {
    refresh: Duration,
    window_start: Option<Instant>,
    window_bytes: u64,
    bytes_per_sec: f64,
    total_bytes: u64,
}

impl Default for ThroughputMeter {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH)
    }
}

impl ThroughputMeter {
    /// Creates a meter averaging over `refresh`.
    pub fn new(refresh: Duration) -> Self {
        Self {
            refresh,
            window_start: None,
            window_bytes: 0,
            bytes_per_sec: 0.0,
            total_bytes: 0,
        }
    }

    /// Records `bytes` received at `now`.
    pub fn record(&mut self, bytes: usize, now: Instant) {
        let start = *self.window_start.get_or_insert(now);
        self.window_bytes += bytes as u64;
        self.total_bytes += bytes as u64;

        if now.duration_since(start) > self.refresh {
            self.bytes_per_sec = self.window_bytes as f64 / self.refresh.as_secs_f64();
            self.window_bytes = 0;
            self.window_start = Some(now);
        }
    }

    /// Rate over the last completed window, in bytes per second.
    pub fn bytes_per_sec(&self) -> f64 {
        self.bytes_per_sec
    }

    /// Rate in megabits per second (1 Mbit = 2^20 bits).
    pub fn mbps(&self) -> f64 {
        self.bytes_per_sec / 1024.0 / 1024.0 * 8.0
    }

    /// Bytes recorded since creation.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Human-readable rate, e.g. `1.25 Mbps`.
    pub fn format_rate(&self) -> String {
        format!("{:.2} Mbps", self.mbps())
    }
}
