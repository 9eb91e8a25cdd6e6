//! Link status indicator
//!
//! Maps [`LinkStatus`] to a static LED level or blink pattern: receiving
//! is steady on, binding blinks fast, idle and failsafe blink slow. The
//! blink phase advances on its own countdown, independent of status
//! changes; a status change reconfigures the pattern and resets that
//! countdown.

use crate::config::{BLINK_TIME_BINDING_TICKS, BLINK_TIME_FAILSAFE_TICKS};
use crate::hw::DigitalOutput;
use crate::tick::Countdown;
use crate::types::LinkStatus;

/// LED pattern state for the status indicator
#[derive(Debug)]
pub struct StatusIndicator {
    shown: Option<LinkStatus>,
    blinking: bool,
    blink_reload: u16,
    level: bool,
}

impl StatusIndicator {
    /// Create an indicator that will configure the LED on its first update
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shown: None,
            blinking: false,
            blink_reload: 0,
            level: false,
        }
    }

    /// Advance the blink phase and track status changes. Called once per
    /// dispatch; `blink` is the dedicated blink countdown.
    pub fn update<L: DigitalOutput>(
        &mut self,
        status: LinkStatus,
        blink: &mut Countdown,
        led: &mut L,
    ) {
        if self.blinking && blink.is_expired() {
            blink.restart(self.blink_reload);
            self.level = !self.level;
            led.set(self.level);
        }

        if self.shown == Some(status) {
            return;
        }
        self.shown = Some(status);

        match status {
            LinkStatus::Receiving => {
                self.blinking = false;
                self.level = true;
                led.set_high();
            }
            LinkStatus::Binding => {
                // Start blinking with a dark phase
                self.level = false;
                led.set_low();
                self.blink_reload = BLINK_TIME_BINDING_TICKS;
                self.blinking = true;
                blink.restart(self.blink_reload);
            }
            LinkStatus::Idle | LinkStatus::Failsafe => {
                self.level = false;
                led.set_low();
                self.blink_reload = BLINK_TIME_FAILSAFE_TICKS;
                self.blinking = true;
                blink.restart(self.blink_reload);
            }
        }
    }

    /// Current LED level (for tests and telemetry)
    #[must_use]
    pub const fn level(&self) -> bool {
        self.level
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}
