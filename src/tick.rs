//! System-tick bookkeeping
//!
//! One external 16 ms tick drives three independent countdown timers and
//! the debounced bind-button edge detector. Everything here is plain
//! state mutated from the main dispatch; the tick interrupt itself only
//! raises a flag.

/// A saturating-at-zero tick counter
#[derive(Clone, Copy, Debug, Default)]
pub struct Countdown(u16);

impl Countdown {
    /// Create an already-expired countdown
    #[must_use]
    pub const fn expired() -> Self {
        Self(0)
    }

    /// Create a running countdown
    #[must_use]
    pub const fn starting_at(ticks: u16) -> Self {
        Self(ticks)
    }

    /// Restart from the given number of ticks
    pub fn restart(&mut self, ticks: u16) {
        self.0 = ticks;
    }

    /// Advance one tick; stays at zero once it gets there
    pub fn tick(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    /// Whether the countdown has reached zero
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.0 == 0
    }
}

/// Bind-button edge detector.
///
/// Sampled once per system tick; a level change registers only after it
/// has survived a full tick, and only the released→pressed edge raises a
/// request.
#[derive(Clone, Copy, Debug)]
pub struct BindButton {
    was_pressed: bool,
}

impl BindButton {
    /// Create with the button assumed released
    #[must_use]
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Feed one sample; returns true exactly on the press edge
    pub fn update(&mut self, pressed: bool) -> bool {
        if pressed == self.was_pressed {
            return false;
        }
        self.was_pressed = pressed;
        pressed
    }
}

impl Default for BindButton {
    fn default() -> Self {
        Self::new()
    }
}

/// The three link countdowns plus the button detector, advanced together
/// on every system tick
#[derive(Debug, Default)]
pub struct TickScheduler {
    /// Stick-data staleness timeout
    pub failsafe: Countdown,
    /// Bind handshake timeout
    pub bind: Countdown,
    /// LED blink phase period
    pub blink: Countdown,
    button: BindButton,
}

impl TickScheduler {
    /// Create with all countdowns expired and the button released
    #[must_use]
    pub const fn new() -> Self {
        Self {
            failsafe: Countdown::expired(),
            bind: Countdown::expired(),
            blink: Countdown::expired(),
            button: BindButton::new(),
        }
    }

    /// Run one tick: decrement every countdown and sample the button.
    /// Returns true when a bind request edge was detected.
    pub fn tick(&mut self, button_pressed: bool) -> bool {
        self.failsafe.tick();
        self.bind.tick();
        self.blink.tick();
        self.button.update(button_pressed)
    }
}
