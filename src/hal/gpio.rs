//! GPIO Abstractions
//!
//! Type-safe pin wrappers for the receiver board: status LED (single or
//! dual color), bind button and the servo output bank.

use embassy_stm32::gpio::{Input, Output};

use crate::hw::{DigitalOutput, PulseOutputs};

/// Single status LED. LEDs connect to ground on all board variants, so
/// driving the pin high lights them.
pub struct StatusLed<'d> {
    pin: Output<'d>,
}

impl<'d> StatusLed<'d> {
    /// Create a new status LED
    #[must_use]
    pub fn new(pin: Output<'d>) -> Self {
        Self { pin }
    }
}

impl DigitalOutput for StatusLed<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }
}

/// Dual-color status LED fitted on some board variants: green while the
/// logical indicator is lit, red otherwise.
pub struct DualColorLed<'d> {
    red: Output<'d>,
    green: Output<'d>,
}

impl<'d> DualColorLed<'d> {
    /// Create from the red and green pins
    #[must_use]
    pub fn new(red: Output<'d>, green: Output<'d>) -> Self {
        Self { red, green }
    }
}

impl DigitalOutput for DualColorLed<'_> {
    fn set_high(&mut self) {
        self.green.set_high();
        self.red.set_low();
    }

    fn set_low(&mut self) {
        self.green.set_low();
        self.red.set_high();
    }
}

/// Bind button input (active low with internal pull-up)
pub struct BindButtonInput<'d> {
    pin: Input<'d>,
}

impl<'d> BindButtonInput<'d> {
    /// Create a new bind button input
    #[must_use]
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }

    /// Check if the button is pressed (active low)
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pin.is_low()
    }
}

/// The servo output bank: four channel pins plus the composite
/// pulse-train pin
pub struct ServoOutputs<'d> {
    channels: [Output<'d>; 4],
    composite: Output<'d>,
}

impl<'d> ServoOutputs<'d> {
    /// Create from the channel pins and the composite pin
    #[must_use]
    pub fn new(channels: [Output<'d>; 4], composite: Output<'d>) -> Self {
        Self {
            channels,
            composite,
        }
    }
}

impl PulseOutputs for ServoOutputs<'_> {
    fn set_channel(&mut self, index: usize, high: bool) {
        if high {
            self.channels[index].set_high();
        } else {
            self.channels[index].set_low();
        }
    }

    fn set_composite(&mut self, high: bool) {
        if high {
            self.composite.set_high();
        } else {
            self.composite.set_low();
        }
    }
}
