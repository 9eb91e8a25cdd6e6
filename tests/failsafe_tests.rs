//! Failsafe Monitor Tests
//!
//! Tests for fallback configuration and the first-success gating of the
//! staleness timeout.

use rc_receiver::config::FAILSAFE_TIMEOUT_TICKS;
use rc_receiver::link::failsafe::{FailsafeMonitor, FailsafeSet};
use rc_receiver::tick::Countdown;
use rc_receiver::types::ChannelSet;

#[test]
fn defaults_are_disabled_and_neutral() {
    let set = FailsafeSet::new();
    assert!(!set.is_enabled());
    assert_eq!(set.values(), ChannelSet::NEUTRAL);
}

#[test]
fn never_fires_before_first_stick_data() {
    let monitor = FailsafeMonitor::new();
    let timer = Countdown::expired();

    // Timer long expired, but no stick data has ever arrived
    assert!(monitor.check(&timer).is_none());
    assert!(!monitor.is_armed());
}

#[test]
fn fires_after_arming_once_the_timer_expires() {
    let mut monitor = FailsafeMonitor::new();
    let mut timer = Countdown::expired();

    monitor.note_stick_data(&mut timer);
    assert!(monitor.is_armed());
    assert!(!timer.is_expired());
    assert!(monitor.check(&timer).is_none());

    for _ in 0..FAILSAFE_TIMEOUT_TICKS {
        timer.tick();
    }
    assert_eq!(monitor.check(&timer), Some(ChannelSet::NEUTRAL));
}

#[test]
fn stick_data_pushes_the_deadline_out() {
    let mut monitor = FailsafeMonitor::new();
    let mut timer = Countdown::expired();
    monitor.note_stick_data(&mut timer);

    // Almost expire, then fresh data arrives
    for _ in 0..FAILSAFE_TIMEOUT_TICKS - 1 {
        timer.tick();
    }
    monitor.note_stick_data(&mut timer);

    timer.tick();
    assert!(monitor.check(&timer).is_none());
}

#[test]
fn configured_values_are_substituted() {
    let mut monitor = FailsafeMonitor::new();
    let mut timer = Countdown::expired();
    let fallback = ChannelSet::from_ticks([1000, 1100, 1200, 1300]);

    monitor.apply_config(Some(fallback), &mut timer);
    assert!(monitor.set().is_enabled());

    monitor.note_stick_data(&mut timer);
    for _ in 0..FAILSAFE_TIMEOUT_TICKS {
        timer.tick();
    }
    assert_eq!(monitor.check(&timer), Some(fallback));
}

#[test]
fn disabling_returns_to_neutral_defaults() {
    let mut monitor = FailsafeMonitor::new();
    let mut timer = Countdown::expired();

    monitor.apply_config(
        Some(ChannelSet::from_ticks([900, 900, 900, 900])),
        &mut timer,
    );
    monitor.apply_config(None, &mut timer);

    assert!(!monitor.set().is_enabled());
    assert_eq!(monitor.set().values(), ChannelSet::NEUTRAL);
    // Disabling also restarts the staleness timer, like the stock units
    assert!(!timer.is_expired());
}

#[test]
fn arming_survives_reconfiguration() {
    let mut monitor = FailsafeMonitor::new();
    let mut timer = Countdown::expired();

    monitor.note_stick_data(&mut timer);
    monitor.apply_config(None, &mut timer);
    assert!(monitor.is_armed());
}
