//! System configuration and protocol constants
//!
//! This module defines compile-time constants for the RC receiver.
//! All link-protocol values, timing parameters, and hardware assignments
//! are centralized here.

/// Radio payload size in bytes (fixed for all data and bind frames)
pub const PAYLOAD_SIZE: usize = 10;

/// Radio address width in bytes
pub const ADDRESS_WIDTH: usize = 5;

/// Number of entries in the frequency-hopping sequence
pub const NUMBER_OF_HOP_CHANNELS: usize = 20;

/// Maximum channels any protocol variant carries
pub const MAX_CHANNELS: usize = 4;

/// Consecutive missed hops tolerated before a full resynchronization
pub const MAX_HOPS_WITHOUT_PACKET: u8 = 15;

/// Hop interval armed right after a successful reception, in microseconds.
/// Shorter than the steady interval so the receiver re-centers on the
/// transmitter's schedule quickly.
pub const FIRST_HOP_TIME_US: u32 = 2_500;

/// Steady-state hop interval in microseconds
pub const HOP_TIME_US: u32 = 5_000;

/// System tick period in milliseconds
pub const SYSTICK_MS: u32 = 16;

/// Failsafe timeout in system ticks (640 ms without stick data)
pub const FAILSAFE_TIMEOUT_TICKS: u16 = (640 / SYSTICK_MS) as u16;

/// Bind session timeout in system ticks (5 s)
pub const BIND_TIMEOUT_TICKS: u16 = (5_000 / SYSTICK_MS) as u16;

/// LED blink period while in failsafe or idle, in system ticks (320 ms)
pub const BLINK_TIME_FAILSAFE_TICKS: u16 = (320 / SYSTICK_MS) as u16;

/// LED blink period while binding, in system ticks (50 ms)
pub const BLINK_TIME_BINDING_TICKS: u16 = (50 / SYSTICK_MS) as u16;

/// Fixed radio channel the transmitter's low-power bind beacon uses
pub const BIND_CHANNEL: u8 = 0x51;

/// Well-known radio address of the bind beacon
pub const BIND_ADDRESS: [u8; ADDRESS_WIDTH] = [0x12, 0x23, 0x23, 0x45, 0x78];

/// Size of the persisted bind record: address + hop table + protocol id
pub const BIND_RECORD_SIZE: usize = ADDRESS_WIDTH + NUMBER_OF_HOP_CHANNELS + 1;

/// Data pipe used for all reception
pub const DATA_PIPE: u8 = 0;

/// Protocol identifier byte for the 3-channel variant
pub const PROTOCOL_ID_3CH: u8 = 0xAA;

/// Protocol identifier byte for the 4-channel variant
pub const PROTOCOL_ID_4CH: u8 = 0xAB;

/// Stick-data frame discriminator, 3-channel variant
pub const STICKDATA_ID_3CH: u8 = 0x55;

/// Failsafe-configuration frame discriminator, 3-channel variant
pub const FAILSAFE_ID_3CH: u8 = 0xAA;

/// Stick-data frame discriminator, 4-channel variant
pub const STICKDATA_ID_4CH: u8 = 0x56;

/// Failsafe-configuration frame discriminator, 4-channel variant
pub const FAILSAFE_ID_4CH: u8 = 0xAB;

/// Byte position of the frame discriminator within a data payload
pub const DISCRIMINATOR_INDEX: usize = 7;

/// Byte position of the failsafe enable marker
pub const FAILSAFE_MARKER_INDEX: usize = 8;

/// Failsafe enable marker value (any other value disables failsafe)
pub const FAILSAFE_ENABLED_MARKER: u8 = 0x5A;

/// Neutral servo pulse in hardware-timer reload units (1500 µs × 4 / 3).
/// Channel values on the wire are already in these units.
pub const SERVO_PULSE_CENTER: u16 = 1500 * 4 / 3;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Status LED (red, or the only LED on single-LED boards)
    pub const LED_STATUS: &str = "PA5";

    /// Second status LED color (green), fitted on some board variants
    pub const LED_GREEN: &str = "PA6";

    /// Bind button input (active low)
    pub const BIND_BUTTON: &str = "PA0";

    /// Servo channel 1 output
    pub const SERVO_CH1: &str = "PB0";

    /// Servo channel 2 output
    pub const SERVO_CH2: &str = "PB1";

    /// Servo channel 3 output
    pub const SERVO_CH3: &str = "PB2";

    /// Servo channel 4 output
    pub const SERVO_CH4: &str = "PB3";

    /// Composite pulse-train output; some board variants wire this to the
    /// same pad as channel 4, which is why the 4-channel protocol drops it
    pub const PULSE_TRAIN: &str = "PB4";

    /// Radio chip-enable
    pub const RADIO_CE: &str = "PB10";

    /// Radio IRQ input (active low)
    pub const RADIO_IRQ: &str = "PB11";

    /// Debug UART TX (diagnostic pass-through, 3-channel protocol only)
    pub const DEBUG_TX: &str = "PA2";
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// Servo pulse timer (steps the pulse train from its own interrupt)
    pub const SERVO_PULSE: u8 = 1;

    /// Hop timer (requests the next frequency-hopping channel)
    pub const HOP: u8 = 2;

    /// System tick source (16 ms)
    pub const SYSTICK: u8 = 6;
}
