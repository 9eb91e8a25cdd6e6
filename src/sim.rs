//! Simulated hardware
//!
//! Host-side implementations of the `hw` capability traits, recording
//! every operation so the test suite can drive the whole link engine
//! deterministically and assert on the exact hardware interaction.
//! Compiled only for `std` builds; nothing here reaches the target.

use heapless::{Deque, Vec};

use crate::config::BIND_RECORD_SIZE;
use crate::hw::{
    BindStore, CrcMode, DataRate, DebugPort, DigitalOutput, HopTimer, IrqSource, PulseOutputs,
    PulseTimer, Transceiver,
};
use crate::protocol::Frame;

/// Scripted radio: tests queue frames, the engine drains them; every
/// register-level operation is recorded.
pub struct SimRadio {
    /// Frames waiting in the receive queue
    pub queue: Deque<Frame, 16>,
    /// Currently programmed RF channel
    pub channel: u8,
    /// Currently programmed receive address
    pub rx_address: [u8; 5],
    /// Chip-enable level
    pub chip_enabled: bool,
    /// Last programmed CRC mode
    pub crc: Option<CrcMode>,
    /// Last programmed IRQ source
    pub irq_source: Option<IrqSource>,
    /// Last programmed data rate
    pub data_rate: Option<DataRate>,
    /// Last auto-acknowledge setting (pipe, enabled)
    pub auto_ack: Option<(u8, bool)>,
    /// Last programmed address width
    pub address_width: u8,
    /// Last programmed payload size (pipe, size)
    pub payload_size: Option<(u8, u8)>,
    /// Number of receive-queue flushes
    pub flushes: u32,
    /// Number of IRQ clears
    pub irq_clears: u32,
}

impl SimRadio {
    /// Create with an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: Deque::new(),
            channel: 0,
            rx_address: [0; 5],
            chip_enabled: false,
            crc: None,
            irq_source: None,
            data_rate: None,
            auto_ack: None,
            address_width: 0,
            payload_size: None,
            flushes: 0,
            irq_clears: 0,
        }
    }

    /// Queue one frame for the engine to read
    pub fn push_frame(&mut self, frame: Frame) {
        self.queue.push_back(frame).expect("sim rx queue overflow");
    }
}

impl Default for SimRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl Transceiver for SimRadio {
    fn set_rx_address(&mut self, _pipe: u8, address: &[u8]) {
        self.rx_address.copy_from_slice(address);
    }

    fn set_channel(&mut self, channel: u8) {
        self.channel = channel;
    }

    fn set_crc(&mut self, mode: CrcMode) {
        self.crc = Some(mode);
    }

    fn set_irq_source(&mut self, source: IrqSource) {
        self.irq_source = Some(source);
    }

    fn set_data_rate(&mut self, rate: DataRate) {
        self.data_rate = Some(rate);
    }

    fn set_auto_acknowledge(&mut self, pipe: u8, enabled: bool) {
        self.auto_ack = Some((pipe, enabled));
    }

    fn set_address_width(&mut self, width: u8) {
        self.address_width = width;
    }

    fn set_payload_size(&mut self, pipe: u8, size: u8) {
        self.payload_size = Some((pipe, size));
    }

    fn flush_rx(&mut self) {
        self.queue.clear();
        self.flushes += 1;
    }

    fn rx_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn read_frame(&mut self, payload: &mut Frame) {
        if let Some(frame) = self.queue.pop_front() {
            *payload = frame;
        }
    }

    fn clear_irq(&mut self) {
        self.irq_clears += 1;
    }

    fn set_chip_enable(&mut self, enabled: bool) {
        self.chip_enabled = enabled;
    }
}

/// Hop timer stub recording start/stop activity
#[derive(Debug, Default)]
pub struct SimHopTimer {
    /// Whether the timer is armed
    pub running: bool,
    /// Number of starts
    pub starts: u32,
    /// Number of stops
    pub stops: u32,
}

impl HopTimer for SimHopTimer {
    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}

/// Pulse timer stub. Records every reload and whether any reload was
/// written while the countdown was still running (the torn-write hazard
/// the engine must never trigger).
#[derive(Debug, Default)]
pub struct SimPulseTimer {
    /// Whether the countdown is running
    pub running: bool,
    /// All reload values in write order
    pub reloads: Vec<u16, 16>,
    /// Set if a reload was written without stopping the timer first
    pub torn_write: bool,
}

impl PulseTimer for SimPulseTimer {
    fn stop(&mut self) {
        self.running = false;
    }

    fn load(&mut self, reload: u16) {
        if self.running {
            self.torn_write = true;
        }
        self.reloads.push(reload).expect("sim reload log overflow");
    }

    fn start(&mut self) {
        self.running = true;
    }
}

/// One recorded output-pin transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinEvent {
    /// A servo channel pin changed level
    Channel(usize, bool),
    /// The composite pulse-train pin changed level
    Composite(bool),
}

/// Servo pin recorder
#[derive(Debug, Default)]
pub struct SimPulsePins {
    /// Current channel pin levels
    pub channels: [bool; 4],
    /// Current composite pin level
    pub composite: bool,
    /// Every transition in order
    pub events: Vec<PinEvent, 64>,
}

impl PulseOutputs for SimPulsePins {
    fn set_channel(&mut self, index: usize, high: bool) {
        self.channels[index] = high;
        self.events
            .push(PinEvent::Channel(index, high))
            .expect("sim pin log overflow");
    }

    fn set_composite(&mut self, high: bool) {
        self.composite = high;
        self.events
            .push(PinEvent::Composite(high))
            .expect("sim pin log overflow");
    }
}

/// Status LED recorder
#[derive(Debug, Default)]
pub struct SimLed {
    /// Current level
    pub level: bool,
    /// Number of level writes
    pub writes: u32,
}

impl DigitalOutput for SimLed {
    fn set_high(&mut self) {
        self.level = true;
        self.writes += 1;
    }

    fn set_low(&mut self) {
        self.level = false;
        self.writes += 1;
    }
}

/// In-memory bind record storage
#[derive(Debug)]
pub struct SimStore {
    /// The stored blob (zeroed = never written)
    pub blob: [u8; BIND_RECORD_SIZE],
    /// Number of save operations
    pub saves: u32,
}

impl SimStore {
    /// Empty storage, as on first power-up
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blob: [0u8; BIND_RECORD_SIZE],
            saves: 0,
        }
    }

    /// Storage seeded with an existing record
    #[must_use]
    pub const fn with_blob(blob: [u8; BIND_RECORD_SIZE]) -> Self {
        Self { blob, saves: 0 }
    }
}

impl Default for SimStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BindStore for SimStore {
    fn load(&mut self, blob: &mut [u8; BIND_RECORD_SIZE]) {
        *blob = self.blob;
    }

    fn save(&mut self, blob: &[u8; BIND_RECORD_SIZE]) {
        self.blob = *blob;
        self.saves += 1;
    }
}

/// Debug port stub
#[derive(Debug, Default)]
pub struct SimDebugPort {
    /// Whether the port is currently enabled
    pub enabled: bool,
    /// Number of lines sent
    pub lines_sent: u32,
}

impl DebugPort for SimDebugPort {
    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn send_str(&mut self, _text: &str) {
        self.lines_sent += 1;
    }
}
