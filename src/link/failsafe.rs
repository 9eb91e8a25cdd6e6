//! Failsafe fallback
//!
//! When stick data stops arriving the configured fallback values are
//! substituted. The fallback is never applied before at least one valid
//! stick-data frame has been received since power-up, so servos stay
//! quiet while the transmitter is still off.

use crate::config::FAILSAFE_TIMEOUT_TICKS;
use crate::tick::Countdown;
use crate::types::ChannelSet;

/// Per-channel fallback configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailsafeSet {
    enabled: bool,
    values: ChannelSet,
}

impl FailsafeSet {
    /// Disabled, every channel at the neutral position
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: false,
            values: ChannelSet::NEUTRAL,
        }
    }

    /// Whether the transmitter configured explicit fallback values
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The values substituted on signal loss
    #[must_use]
    pub const fn values(&self) -> ChannelSet {
        self.values
    }
}

impl Default for FailsafeSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Stick-data staleness tracking plus the active fallback configuration
#[derive(Clone, Copy, Debug, Default)]
pub struct FailsafeMonitor {
    set: FailsafeSet,
    armed: bool,
}

impl FailsafeMonitor {
    /// Create disarmed with neutral defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            set: FailsafeSet::new(),
            armed: false,
        }
    }

    /// A valid stick-data frame arrived: arm the monitor and push the
    /// staleness deadline out
    pub fn note_stick_data(&mut self, timer: &mut Countdown) {
        self.armed = true;
        timer.restart(FAILSAFE_TIMEOUT_TICKS);
    }

    /// Returns the fallback values once the staleness timer has expired,
    /// and only after reception has succeeded at least once
    #[must_use]
    pub fn check(&self, timer: &Countdown) -> Option<ChannelSet> {
        if self.armed && timer.is_expired() {
            Some(self.set.values())
        } else {
            None
        }
    }

    /// Apply a failsafe-configuration frame. `Some` stores the
    /// transmitter's fallback values; `None` (failsafe disabled) returns
    /// to neutral defaults, like the stock receivers do.
    pub fn apply_config(&mut self, values: Option<ChannelSet>, timer: &mut Countdown) {
        match values {
            Some(channels) => {
                self.set = FailsafeSet {
                    enabled: true,
                    values: channels,
                };
            }
            None => {
                self.set = FailsafeSet::new();
                timer.restart(FAILSAFE_TIMEOUT_TICKS);
            }
        }
    }

    /// The current fallback configuration
    #[must_use]
    pub const fn set(&self) -> &FailsafeSet {
        &self.set
    }

    /// Whether at least one stick-data frame has ever been received
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }
}
