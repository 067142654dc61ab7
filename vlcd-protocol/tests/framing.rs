//! Chunking and resynchronization properties of the frame reassembler.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vlcd_protocol::{encode_frame, Frame, FrameReassembler, FramingError};

fn arb_frame() -> impl Strategy<Value = Frame> {
    (any::<u8>(), prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(kind, payload)| Frame::new(kind, payload))
}

/// Feed `wire` split at the given cut points.
fn feed_split(r: &mut FrameReassembler, wire: &[u8], cuts: &[usize]) -> Vec<Frame> {
    let mut points: Vec<usize> = cuts.iter().map(|c| c % (wire.len() + 1)).collect();
    points.sort_unstable();
    let mut frames = Vec::new();
    let mut start = 0;
    for p in points.into_iter().chain(std::iter::once(wire.len())) {
        frames.extend(r.feed(&wire[start..p]));
        start = p;
    }
    frames
}

proptest! {
    #[test]
    fn byte_at_a_time_matches_single_chunk(frame in arb_frame()) {
        let wire = frame.to_bytes();

        let mut whole = FrameReassembler::new();
        let expected = whole.feed(&wire);

        let mut bytewise = FrameReassembler::new();
        let mut got = Vec::new();
        for b in wire.iter() {
            got.extend(bytewise.feed(std::slice::from_ref(b)));
        }

        prop_assert_eq!(expected.len(), 1);
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(&got[0], &frame);
    }

    #[test]
    fn arbitrary_chunking_preserves_frames(
        frames in prop::collection::vec(arb_frame(), 1..8),
        cuts in prop::collection::vec(any::<usize>(), 0..16),
    ) {
        let mut wire = Vec::new();
        for f in &frames {
            wire.extend_from_slice(&f.to_bytes());
        }
        let mut r = FrameReassembler::new();
        let got = feed_split(&mut r, &wire, &cuts);
        prop_assert_eq!(got, frames);
        prop_assert_eq!(r.pending(), 0);
    }

    #[test]
    fn resyncs_after_garbage_prefix(
        garbage in prop::collection::vec(any::<u8>().prop_filter("no sync start", |b| *b != 0xAA), 0..64),
        payload in prop::collection::vec(any::<u8>(), 8),
    ) {
        let mut wire = garbage.clone();
        wire.extend_from_slice(&encode_frame(0x02, &payload));

        let mut r = FrameReassembler::new();
        let frames = r.feed(&wire);
        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].kind, 0x02);
        prop_assert_eq!(&frames[0].payload[..], &payload[..]);
        prop_assert_eq!(r.stats().discarded_bytes, garbage.len() as u64);
    }
}

#[test]
fn zero_length_frame_needs_no_more_input() {
    let mut r = FrameReassembler::new();
    r.extend(&[0xAA, 0x55, 0x10, 0, 0, 0, 0]);
    let frame = r.next_frame().unwrap().unwrap();
    assert_eq!(frame.kind, 0x10);
    assert!(frame.payload.is_empty());
    assert_eq!(r.next_frame(), Ok(None));
}

#[test]
fn oversize_then_valid_frame_in_separate_chunks() {
    let mut r = FrameReassembler::with_max_payload_len(1024);
    r.extend(&[0xAA, 0x55, 0x03, 0x00, 0x00, 0x00, 0x10]);
    assert!(matches!(
        r.next_frame(),
        Err(FramingError::PayloadTooLarge { len: 0x1000_0000, max: 1024 })
    ));
    assert_eq!(r.next_frame(), Ok(None));

    let frames = r.feed(&encode_frame(0x05, &[0; 8]));
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].kind, 0x05);
}

#[test]
fn frame_with_sync_bytes_in_payload() {
    let payload = [0xAA, 0x55, 0xAA, 0x55];
    let mut wire = encode_frame(0x03, &payload).to_vec();
    wire.extend_from_slice(&encode_frame(0x03, &[1]));

    let mut r = FrameReassembler::new();
    let frames = r.feed(&wire);
    assert_eq!(frames.len(), 2);
    assert_eq!(&frames[0].payload[..], &payload);
}
