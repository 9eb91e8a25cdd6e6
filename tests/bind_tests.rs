//! Bind Handshake Tests
//!
//! Tests for the 4-stage handshake state machine: stage progression,
//! idempotent rejection of non-conforming frames and record assembly.

use rc_receiver::link::bind::{BindHandshake, BindProgress};
use rc_receiver::protocol::Frame;
use rc_receiver::types::Protocol;

/// The hop table the fake transmitter beacons
const HOP_TABLE: [u8; 20] = [
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, //
    0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0x20, 0x21, 0x22, 0x23,
];

const ADDRESS: [u8; 5] = [0xA1, 0xA2, 0xA3, 0xA4, 0xA5];

fn checksum() -> u16 {
    ADDRESS.iter().map(|&b| u16::from(b)).sum()
}

fn marker_frame(protocol_id: u8, stick_id: u8) -> Frame {
    let mut payload = [0u8; 10];
    payload[0] = 0xFF;
    payload[1] = protocol_id;
    payload[2] = stick_id;
    payload[3..8].copy_from_slice(&ADDRESS);
    payload
}

fn hop_frame(seq: u8) -> Frame {
    let sum = checksum();
    let mut payload = [0u8; 10];
    payload[0] = (sum & 0xFF) as u8;
    payload[1] = (sum >> 8) as u8;
    payload[2] = seq;

    let offset = usize::from(seq) * 7;
    let len = if seq == 2 { 6 } else { 7 };
    payload[3..3 + len].copy_from_slice(&HOP_TABLE[offset..offset + len]);
    payload
}

// ============================================================================
// Happy Path
// ============================================================================

#[test]
fn full_handshake_produces_matching_record() {
    let mut handshake = BindHandshake::new();

    assert_eq!(
        handshake.accept(&marker_frame(0xAA, 0x55)),
        BindProgress::Advanced
    );
    assert_eq!(handshake.accept(&hop_frame(0)), BindProgress::Advanced);
    assert_eq!(handshake.accept(&hop_frame(1)), BindProgress::Advanced);

    let BindProgress::Complete(record) = handshake.accept(&hop_frame(2)) else {
        panic!("handshake did not complete");
    };

    assert_eq!(record.address.as_bytes(), &ADDRESS);
    assert_eq!(record.hop_channels, HOP_TABLE);
    assert_eq!(record.protocol, Protocol::ThreeChannel);
}

#[test]
fn four_channel_marker_selects_variant() {
    let mut handshake = BindHandshake::new();

    handshake.accept(&marker_frame(0xAB, 0x56));
    handshake.accept(&hop_frame(0));
    handshake.accept(&hop_frame(1));

    let BindProgress::Complete(record) = handshake.accept(&hop_frame(2)) else {
        panic!("handshake did not complete");
    };
    assert_eq!(record.protocol, Protocol::FourChannel);
}

#[test]
fn record_is_exactly_the_transmitted_bytes() {
    let mut handshake = BindHandshake::new();
    handshake.accept(&marker_frame(0xAA, 0x55));
    handshake.accept(&hop_frame(0));
    handshake.accept(&hop_frame(1));
    let BindProgress::Complete(record) = handshake.accept(&hop_frame(2)) else {
        panic!("handshake did not complete");
    };

    let blob = record.as_bytes();
    assert_eq!(&blob[..5], &ADDRESS);
    assert_eq!(&blob[5..25], &HOP_TABLE);
    assert_eq!(blob[25], 0xAA);
}

// ============================================================================
// Rejection Is Idempotent
// ============================================================================

#[test]
fn stage_zero_ignores_non_marker_frames() {
    let mut handshake = BindHandshake::new();

    // Hop-table frames mean nothing before the marker arrived
    assert_eq!(handshake.accept(&hop_frame(0)), BindProgress::Ignored);

    // The marker still works afterwards
    assert_eq!(
        handshake.accept(&marker_frame(0xAA, 0x55)),
        BindProgress::Advanced
    );
}

#[test]
fn bad_checksum_never_advances_the_stage() {
    let mut handshake = BindHandshake::new();
    handshake.accept(&marker_frame(0xAA, 0x55));

    let mut corrupted = hop_frame(0);
    corrupted[0] ^= 0x01;
    assert_eq!(handshake.accept(&corrupted), BindProgress::Ignored);

    // Recovery without restarting from the marker stage
    assert_eq!(handshake.accept(&hop_frame(0)), BindProgress::Advanced);
    assert_eq!(handshake.accept(&hop_frame(1)), BindProgress::Advanced);
    assert!(matches!(
        handshake.accept(&hop_frame(2)),
        BindProgress::Complete(_)
    ));
}

#[test]
fn wrong_sequence_byte_never_advances_the_stage() {
    let mut handshake = BindHandshake::new();
    handshake.accept(&marker_frame(0xAA, 0x55));
    handshake.accept(&hop_frame(0));

    // Block 2 while block 1 is expected: ignored, repeated deliveries too
    assert_eq!(handshake.accept(&hop_frame(2)), BindProgress::Ignored);
    assert_eq!(handshake.accept(&hop_frame(2)), BindProgress::Ignored);

    assert_eq!(handshake.accept(&hop_frame(1)), BindProgress::Advanced);
    assert!(matches!(
        handshake.accept(&hop_frame(2)),
        BindProgress::Complete(_)
    ));
}

#[test]
fn beacon_cycle_with_repeats_completes() {
    // The transmitter cycles marker, 0, 1, 2 over and over; a receiver
    // joining mid-cycle sees the tail frames first and must still bind
    // within the next full cycle.
    let mut handshake = BindHandshake::new();

    handshake.accept(&hop_frame(1));
    handshake.accept(&hop_frame(2));
    handshake.accept(&marker_frame(0xAA, 0x55));
    handshake.accept(&hop_frame(0));
    handshake.accept(&hop_frame(1));
    assert!(matches!(
        handshake.accept(&hop_frame(2)),
        BindProgress::Complete(_)
    ));
}

// ============================================================================
// Restart
// ============================================================================

#[test]
fn restart_discards_partial_progress() {
    let mut handshake = BindHandshake::new();
    handshake.accept(&marker_frame(0xAA, 0x55));
    handshake.accept(&hop_frame(0));

    handshake.restart();

    // Back at the marker stage: hop blocks are ignored again
    assert_eq!(handshake.accept(&hop_frame(1)), BindProgress::Ignored);
    assert_eq!(
        handshake.accept(&marker_frame(0xAA, 0x55)),
        BindProgress::Advanced
    );
}

#[test]
fn completion_leaves_the_handshake_reset() {
    let mut handshake = BindHandshake::new();
    handshake.accept(&marker_frame(0xAA, 0x55));
    handshake.accept(&hop_frame(0));
    handshake.accept(&hop_frame(1));
    assert!(matches!(
        handshake.accept(&hop_frame(2)),
        BindProgress::Complete(_)
    ));

    // A fresh session starts from the marker again
    assert_eq!(handshake.accept(&hop_frame(0)), BindProgress::Ignored);
    assert_eq!(
        handshake.accept(&marker_frame(0xAB, 0x56)),
        BindProgress::Advanced
    );
}
