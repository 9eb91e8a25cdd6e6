//! Hardware capability seams
//!
//! Narrow interfaces the link engine depends on instead of touching
//! registers: the radio transceiver surface, the two hardware timers, the
//! pulse and LED outputs, persistent storage and the diagnostic port.
//! The embedded HAL binds them to real peripherals; `sim` provides
//! deterministic host implementations for the test suite.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::BIND_RECORD_SIZE;
use crate::protocol::Frame;

/// CRC mode of the radio's packet engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrcMode {
    /// CRC disabled
    Disabled,
    /// 1-byte CRC
    OneByte,
    /// 2-byte CRC
    TwoBytes,
}

/// On-air data rate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataRate {
    /// 250 kbit/s (longest range, used by this link)
    Kbps250,
    /// 1 Mbit/s
    Mbps1,
    /// 2 Mbit/s
    Mbps2,
}

/// Event the radio is allowed to raise its interrupt line for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrqSource {
    /// A frame arrived in the receive queue
    RxDataReady,
}

/// Register-level surface of the radio transceiver the engine consumes.
/// The concrete driver (SPI transfers, register maps) is a separate
/// collaborator; the engine only ever issues these operations.
pub trait Transceiver {
    /// Program the receive address of one data pipe
    fn set_rx_address(&mut self, pipe: u8, address: &[u8]);
    /// Select the active RF channel
    fn set_channel(&mut self, channel: u8);
    /// Select the packet-engine CRC mode
    fn set_crc(&mut self, mode: CrcMode);
    /// Restrict the interrupt line to one event source
    fn set_irq_source(&mut self, source: IrqSource);
    /// Select the on-air data rate
    fn set_data_rate(&mut self, rate: DataRate);
    /// Enable or disable auto-acknowledge on one pipe
    fn set_auto_acknowledge(&mut self, pipe: u8, enabled: bool);
    /// Program the address width in bytes
    fn set_address_width(&mut self, width: u8);
    /// Program the fixed payload size of one pipe
    fn set_payload_size(&mut self, pipe: u8, size: u8);
    /// Drop everything buffered in the receive queue
    fn flush_rx(&mut self);
    /// Whether the receive queue holds no frame
    fn rx_empty(&self) -> bool;
    /// Read (and consume) the oldest buffered frame
    fn read_frame(&mut self, payload: &mut Frame);
    /// Clear the pending receive interrupt
    fn clear_irq(&mut self);
    /// Assert or release chip-enable (reception runs only while asserted)
    fn set_chip_enable(&mut self, enabled: bool);
}

/// The hop timer. `start` arms the short resynchronization interval; the
/// hardware side reloads the steady hop interval on every expiry by
/// itself, so the engine only ever starts and stops it.
pub trait HopTimer {
    /// Arm with the first (short) interval
    fn start(&mut self);
    /// Stop; no further expiries until the next `start`
    fn stop(&mut self);
}

/// The servo pulse timer. The reload write is 16 bits wide; callers stop
/// the countdown before `load` and restart it after, so the two reload
/// bytes can never straddle a decrement.
pub trait PulseTimer {
    /// Halt the countdown
    fn stop(&mut self);
    /// Write the reload value while halted
    fn load(&mut self, reload: u16);
    /// Resume counting toward the next expiry
    fn start(&mut self);
}

/// Servo output pins plus the shared composite pulse-train pin
pub trait PulseOutputs {
    /// Drive one servo channel pin
    fn set_channel(&mut self, index: usize, high: bool);
    /// Drive the composite pulse-train pin
    fn set_composite(&mut self, high: bool);
}

/// A single digital output (status LED)
pub trait DigitalOutput {
    /// Drive the output high
    fn set_high(&mut self);
    /// Drive the output low
    fn set_low(&mut self);

    /// Drive the output to an explicit level
    fn set(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Non-volatile home of the bind record
pub trait BindStore {
    /// Read the stored record (all zeroes if never written)
    fn load(&mut self, blob: &mut [u8; BIND_RECORD_SIZE]);
    /// Atomically replace the stored record
    fn save(&mut self, blob: &[u8; BIND_RECORD_SIZE]);
}

/// Serial diagnostic pass-through. Carries no protocol traffic; the
/// 4-channel variant disables it because its pin doubles as channel 4.
pub trait DebugPort {
    /// Bring the port up
    fn enable(&mut self);
    /// Release the port (and its pin)
    fn disable(&mut self);
    /// Emit a diagnostic line
    fn send_str(&mut self, text: &str);
}

/// Interrupt-to-main-loop signal block.
///
/// Each flag has exactly one writer (its interrupt) and one reader (the
/// dispatch), which test-and-clears it before acting. Release/acquire
/// pairs order the flag against the data it announces; nothing ever
/// blocks on a flag.
#[derive(Debug, Default)]
pub struct IrqFlags {
    tick: AtomicBool,
    radio_ready: AtomicBool,
    hop_due: AtomicBool,
}

impl IrqFlags {
    /// Create with all flags clear
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tick: AtomicBool::new(false),
            radio_ready: AtomicBool::new(false),
            hop_due: AtomicBool::new(false),
        }
    }

    /// Raise the system-tick flag (tick interrupt)
    pub fn raise_tick(&self) {
        self.tick.store(true, Ordering::Release);
    }

    /// Consume the system-tick flag
    pub fn take_tick(&self) -> bool {
        self.tick.swap(false, Ordering::AcqRel)
    }

    /// Raise the radio-data-ready flag (radio interrupt)
    pub fn raise_radio_ready(&self) {
        self.radio_ready.store(true, Ordering::Release);
    }

    /// Consume the radio-data-ready flag
    pub fn take_radio_ready(&self) -> bool {
        self.radio_ready.swap(false, Ordering::AcqRel)
    }

    /// Drop a pending radio-data-ready flag without acting on it (used
    /// when reception is re-armed from scratch)
    pub fn clear_radio_ready(&self) {
        self.radio_ready.store(false, Ordering::Release);
    }

    /// Raise the hop-due flag (hop-timer interrupt)
    pub fn raise_hop_due(&self) {
        self.hop_due.store(true, Ordering::Release);
    }

    /// Consume the hop-due flag
    pub fn take_hop_due(&self) -> bool {
        self.hop_due.swap(false, Ordering::AcqRel)
    }

    /// Drop a pending hop request (hop timer was stopped)
    pub fn clear_hop_due(&self) {
        self.hop_due.store(false, Ordering::Release);
    }
}
