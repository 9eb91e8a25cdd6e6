//! Servo pulse generation
//!
//! One precisely-timed pulse per channel, stepped entirely from the
//! highest-priority timer interrupt so cooperative-scheduling jitter can
//! never reach a servo. The main context hands new channel values over
//! through [`PulseBuffer`], a lock-free double buffer whose active-slot
//! flip is the only mutation the interrupt side observes.

use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};

use crate::config::MAX_CHANNELS;
use crate::hw::{PulseOutputs, PulseTimer};
use crate::types::{ChannelSet, Protocol, PulseWidth};

/// Double-buffered channel handoff between the main context and the
/// pulse interrupt.
///
/// The writer fills the inactive slot, then flips the selector with a
/// release store; the interrupt side acquires the selector and reads a
/// fully-written slot. The bound protocol variant rides along so the
/// interrupt knows the train length without touching any other state.
pub struct PulseBuffer {
    slots: [[AtomicU16; MAX_CHANNELS]; 2],
    active: AtomicU8,
    protocol_id: AtomicU8,
}

impl PulseBuffer {
    /// Create with both slots zeroed and the 3-channel variant selected
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [
                [
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                ],
                [
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                    AtomicU16::new(0),
                ],
            ],
            active: AtomicU8::new(0),
            protocol_id: AtomicU8::new(Protocol::ThreeChannel.id()),
        }
    }

    /// Publish a new channel set: write the inactive slot, then make it
    /// the active one
    pub fn publish(&self, channels: &ChannelSet) {
        let inactive = self.active.load(Ordering::Relaxed) ^ 1;
        let slot = &self.slots[inactive as usize];
        for (value, ticks) in slot.iter().zip(channels.as_ticks()) {
            value.store(ticks, Ordering::Relaxed);
        }
        self.active.store(inactive, Ordering::Release);
    }

    /// Read the currently active channel set
    #[must_use]
    pub fn snapshot(&self) -> ChannelSet {
        let active = self.active.load(Ordering::Acquire);
        let slot = &self.slots[active as usize];
        let mut set = ChannelSet::default();
        for (index, value) in slot.iter().enumerate() {
            set.set_channel(index, PulseWidth::from_ticks(value.load(Ordering::Relaxed)));
        }
        set
    }

    /// Record the protocol variant agreed at bind time
    pub fn set_protocol(&self, protocol: Protocol) {
        self.protocol_id.store(protocol.id(), Ordering::Release);
    }

    /// The protocol variant the pulse train follows
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        Protocol::from_id(self.protocol_id.load(Ordering::Acquire))
    }
}

impl Default for PulseBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The pulse-train state machine.
///
/// Owned exclusively by the pulse-timer interrupt. Each expiry brings the
/// previous channel low, the next one high, and reprograms the timer with
/// that channel's duration; after the last channel the train halts until
/// the next [`trigger`](Self::trigger). The buffer is snapshotted once
/// per train, so a swap landing mid-train takes effect at the next train
/// boundary instead of mixing two frames in one output cycle.
pub struct PulseGenerator {
    step: u8,
    train: ChannelSet,
    protocol: Protocol,
}

impl PulseGenerator {
    /// Create an idle generator
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: 0,
            train: ChannelSet::NEUTRAL,
            protocol: Protocol::ThreeChannel,
        }
    }

    /// Whether no train is currently in flight
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.step == 0
    }

    /// Start a new pulse train from the buffer's current contents.
    /// Ignored while a train is still in flight.
    pub fn trigger<P: PulseOutputs, T: PulseTimer>(
        &mut self,
        buffer: &PulseBuffer,
        pins: &mut P,
        timer: &mut T,
    ) {
        if !self.is_idle() {
            return;
        }
        self.train = buffer.snapshot();
        self.protocol = buffer.protocol();
        self.on_timer(pins, timer);
    }

    /// Advance the train one step; called from the pulse-timer interrupt.
    ///
    /// The timer is always stopped before the 16-bit reload is written
    /// and restarted afterwards. Writing while counting could let the low
    /// reload byte roll over and decrement the high byte between the two
    /// byte writes, stretching one pulse by an entire low-byte period.
    pub fn on_timer<P: PulseOutputs, T: PulseTimer>(&mut self, pins: &mut P, timer: &mut T) {
        timer.stop();

        // Channel-boundary strobe of the composite train output. In the
        // 4-channel variant the pin belongs to channel 4 instead.
        if self.protocol.composite_output() {
            pins.set_composite(false);
        }

        self.step += 1;
        match self.step {
            1 => {
                pins.set_channel(0, true);
                self.arm(timer, 0);
            }
            2 => {
                pins.set_channel(0, false);
                pins.set_channel(1, true);
                self.arm(timer, 1);
            }
            3 => {
                pins.set_channel(1, false);
                pins.set_channel(2, true);
                self.arm(timer, 2);
            }
            4 => {
                pins.set_channel(2, false);
                if self.protocol.channel_count() == 4 {
                    pins.set_channel(3, true);
                    self.arm(timer, 3);
                } else {
                    // 3-channel train complete; timer stays stopped
                    self.step = 0;
                }
            }
            _ => {
                pins.set_channel(3, false);
                self.step = 0;
            }
        }

        if self.protocol.composite_output() {
            pins.set_composite(true);
        }
    }

    fn arm<T: PulseTimer>(&self, timer: &mut T, channel: usize) {
        timer.load(self.train.channel(channel).as_ticks());
        timer.start();
    }
}

impl Default for PulseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
