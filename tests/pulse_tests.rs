//! Pulse Generator Tests
//!
//! Tests for the double-buffered channel handoff and the
//! interrupt-stepped pulse train.

use rc_receiver::pulse::{PulseBuffer, PulseGenerator};
use rc_receiver::sim::{PinEvent, SimPulsePins, SimPulseTimer};
use rc_receiver::types::{ChannelSet, Protocol};

/// Run one complete train: trigger, then step until the timer halts
fn run_train(
    generator: &mut PulseGenerator,
    buffer: &PulseBuffer,
    pins: &mut SimPulsePins,
    timer: &mut SimPulseTimer,
) {
    generator.trigger(buffer, pins, timer);
    while timer.running {
        generator.on_timer(pins, timer);
    }
    assert!(generator.is_idle());
}

// ============================================================================
// Buffer Tests
// ============================================================================

#[test]
fn publish_then_snapshot_round_trips() {
    let buffer = PulseBuffer::new();
    let channels = ChannelSet::from_ticks([1500, 1600, 1700, 1800]);

    buffer.publish(&channels);
    assert_eq!(buffer.snapshot(), channels);
}

#[test]
fn publish_alternates_slots() {
    let buffer = PulseBuffer::new();
    let first = ChannelSet::from_ticks([1000, 1000, 1000, 1000]);
    let second = ChannelSet::from_ticks([2000, 2000, 2000, 2000]);

    buffer.publish(&first);
    buffer.publish(&second);
    assert_eq!(buffer.snapshot(), second);

    buffer.publish(&first);
    assert_eq!(buffer.snapshot(), first);
}

#[test]
fn buffer_defaults_to_three_channel() {
    let buffer = PulseBuffer::new();
    assert_eq!(buffer.protocol(), Protocol::ThreeChannel);

    buffer.set_protocol(Protocol::FourChannel);
    assert_eq!(buffer.protocol(), Protocol::FourChannel);
}

// ============================================================================
// Train Shape Tests
// ============================================================================

#[test]
fn three_channel_train_emits_three_pulses() {
    let buffer = PulseBuffer::new();
    buffer.publish(&ChannelSet::from_ticks([1600, 2000, 2400, 999]));

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);

    // Three durations, in channel order; channel 4's value never loads
    assert_eq!(timer.reloads.as_slice(), &[1600, 2000, 2400]);
    assert!(!timer.running);
    assert_eq!(pins.channels, [false; 4]);
}

#[test]
fn four_channel_train_emits_four_pulses() {
    let buffer = PulseBuffer::new();
    buffer.set_protocol(Protocol::FourChannel);
    buffer.publish(&ChannelSet::from_ticks([1600, 2000, 2400, 1500]));

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);

    assert_eq!(timer.reloads.as_slice(), &[1600, 2000, 2400, 1500]);
    assert!(!timer.running);
    assert_eq!(pins.channels, [false; 4]);
}

#[test]
fn pulses_overlap_nothing_and_run_in_order() {
    let buffer = PulseBuffer::new();
    buffer.set_protocol(Protocol::FourChannel);
    buffer.publish(&ChannelSet::NEUTRAL);

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);

    let channel_events: Vec<_> = pins
        .events
        .iter()
        .filter_map(|event| match event {
            PinEvent::Channel(index, high) => Some((*index, *high)),
            PinEvent::Composite(_) => None,
        })
        .collect();

    assert_eq!(
        channel_events,
        [
            (0, true),
            (0, false),
            (1, true),
            (1, false),
            (2, true),
            (2, false),
            (3, true),
            (3, false),
        ]
    );
}

#[test]
fn composite_output_strobes_each_step_in_three_channel_mode() {
    let buffer = PulseBuffer::new();
    buffer.publish(&ChannelSet::NEUTRAL);

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);

    // Four steps (three pulses plus the closing step), one low/high
    // strobe pair each, ending high
    let strobes: Vec<_> = pins
        .events
        .iter()
        .filter_map(|event| match event {
            PinEvent::Composite(high) => Some(*high),
            PinEvent::Channel(..) => None,
        })
        .collect();
    assert_eq!(strobes.len(), 8);
    assert!(strobes.chunks(2).all(|pair| !pair[0] && pair[1]));
    assert!(pins.composite);
}

#[test]
fn composite_pin_is_left_alone_in_four_channel_mode() {
    let buffer = PulseBuffer::new();
    buffer.set_protocol(Protocol::FourChannel);
    buffer.publish(&ChannelSet::NEUTRAL);

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);

    assert!(pins
        .events
        .iter()
        .all(|event| matches!(event, PinEvent::Channel(..))));
}

// ============================================================================
// Timing Safety Tests
// ============================================================================

#[test]
fn reloads_are_never_written_while_counting() {
    let buffer = PulseBuffer::new();
    buffer.set_protocol(Protocol::FourChannel);
    buffer.publish(&ChannelSet::from_ticks([1234, 2345, 3456, 4567]));

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    run_train(&mut generator, &buffer, &mut pins, &mut timer);
    assert!(!timer.torn_write);
}

#[test]
fn trigger_is_ignored_while_a_train_is_in_flight() {
    let buffer = PulseBuffer::new();
    buffer.publish(&ChannelSet::NEUTRAL);

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    generator.trigger(&buffer, &mut pins, &mut timer);
    assert!(!generator.is_idle());
    let events_so_far = pins.events.len();

    generator.trigger(&buffer, &mut pins, &mut timer);
    assert_eq!(pins.events.len(), events_so_far);
}

// ============================================================================
// Snapshot Semantics Tests
// ============================================================================

#[test]
fn buffer_swap_mid_train_takes_effect_next_train() {
    let buffer = PulseBuffer::new();
    let old = ChannelSet::from_ticks([1100, 1200, 1300, 0]);
    let new = ChannelSet::from_ticks([2100, 2200, 2300, 0]);
    buffer.publish(&old);

    let mut generator = PulseGenerator::new();
    let mut pins = SimPulsePins::default();
    let mut timer = SimPulseTimer::default();

    generator.trigger(&buffer, &mut pins, &mut timer);

    // New values land while the first pulse is still out
    buffer.publish(&new);

    while timer.running {
        generator.on_timer(&mut pins, &mut timer);
    }
    assert_eq!(timer.reloads.as_slice(), &[1100, 1200, 1300]);

    // The following train picks the new values up
    timer.reloads.clear();
    run_train(&mut generator, &buffer, &mut pins, &mut timer);
    assert_eq!(timer.reloads.as_slice(), &[2100, 2200, 2300]);
}
