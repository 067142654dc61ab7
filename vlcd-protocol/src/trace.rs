//! Opt-in wire trace.
//!
//! Set `VLCD_TRACE=1` to log every inbound and outbound frame header plus a
//! short hexdump under the `protocol_trace` target.

use crate::frame::Frame;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

/// Bytes of payload included in each hexdump.
const HEXDUMP_LIMIT: usize = 64;

static TRACE_ENABLED: Lazy<AtomicBool> = Lazy::new(|| {
    let on = std::env::var("VLCD_TRACE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false);
    AtomicBool::new(on)
});

#[inline]
pub fn enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

#[inline]
pub fn set_enabled(on: bool) {
    TRACE_ENABLED.store(on, Ordering::Relaxed)
}

#[inline]
pub fn inbound(frame: &Frame) {
    if enabled() {
        tracing::info!(
            target: "protocol_trace",
            "IN  type={:#04x} len={}",
            frame.kind,
            frame.payload.len()
        );
        hexdump("IN  |", &frame.payload, HEXDUMP_LIMIT);
    }
}

#[inline]
pub fn outbound(kind: u8, payload: &[u8]) {
    if enabled() {
        tracing::info!(
            target: "protocol_trace",
            "OUT type={:#04x} len={}",
            kind,
            payload.len()
        );
        hexdump("OUT |", payload, HEXDUMP_LIMIT);
    }
}

pub fn hexdump(prefix: &str, data: &[u8], max: usize) {
    if !enabled() || data.is_empty() {
        return;
    }
    for line in hex_lines(&data[..max.min(data.len())]) {
        tracing::info!(target: "protocol_trace", "{}{}", prefix, line);
    }
}

fn hex_lines(data: &[u8]) -> Vec<String> {
    use std::fmt::Write as _;
    data.chunks(16)
        .map(|chunk| {
            let mut line = String::with_capacity(chunk.len() * 3);
            for b in chunk {
                let _ = write!(line, " {:02X}", b);
            }
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_lines_wraps_at_16() {
        let data: Vec<u8> = (0..20).collect();
        let lines = hex_lines(&data);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 00 01 02"));
        assert_eq!(lines[1], " 10 11 12 13");
    }
}
