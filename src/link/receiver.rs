//! Receiver context and main dispatch
//!
//! One owned context holds every piece of link state and runs the
//! cooperative dispatch once per poll: tick bookkeeping, the bind
//! handshake, packet reception with hopping and failsafe, and the status
//! indicator. Interrupts only raise flags; everything here runs to
//! completion in the main context and never blocks.

use crate::config::{
    ADDRESS_WIDTH, BIND_ADDRESS, BIND_CHANNEL, BIND_RECORD_SIZE, BIND_TIMEOUT_TICKS, DATA_PIPE,
    FAILSAFE_TIMEOUT_TICKS, PAYLOAD_SIZE,
};
use crate::hw::{
    BindStore, CrcMode, DataRate, DebugPort, DigitalOutput, HopTimer, IrqFlags, IrqSource,
    Transceiver,
};
use crate::link::bind::{BindHandshake, BindProgress};
use crate::link::failsafe::FailsafeMonitor;
use crate::link::hop::HopSequence;
use crate::protocol::{classify, BindRecord, DataFrame, Frame};
use crate::pulse::PulseBuffer;
use crate::status::StatusIndicator;
use crate::tick::TickScheduler;
use crate::types::{LinkStatus, ModelAddress, Protocol};

/// The complete receiver engine, generic over the hardware seams
pub struct Receiver<'a, R, H, S, L, D>
where
    R: Transceiver,
    H: HopTimer,
    S: BindStore,
    L: DigitalOutput,
    D: DebugPort,
{
    radio: R,
    hop_timer: H,
    store: S,
    led: L,
    debug: D,
    flags: &'a IrqFlags,
    pulses: &'a PulseBuffer,

    ticks: TickScheduler,
    indicator: StatusIndicator,

    address: ModelAddress,
    hops: HopSequence,
    protocol: Protocol,
    status: LinkStatus,

    handshake: BindHandshake,
    binding: bool,
    bind_requested: bool,
    prior_status: LinkStatus,

    failsafe: FailsafeMonitor,
    payload: Frame,
}

impl<'a, R, H, S, L, D> Receiver<'a, R, H, S, L, D>
where
    R: Transceiver,
    H: HopTimer,
    S: BindStore,
    L: DigitalOutput,
    D: DebugPort,
{
    /// Bring the receiver up: load the persisted bind record, program the
    /// radio's fixed parameters and arm reception on the first hop
    /// channel. With no record stored yet the address and hop table are
    /// all zero and nothing will validate until a bind completes, which
    /// is the expected unbound state.
    pub fn new(
        radio: R,
        hop_timer: H,
        mut store: S,
        led: L,
        debug: D,
        flags: &'a IrqFlags,
        pulses: &'a PulseBuffer,
    ) -> Self {
        let mut blob = [0u8; BIND_RECORD_SIZE];
        store.load(&mut blob);
        let record = BindRecord::parse(&blob);

        let mut receiver = Self {
            radio,
            hop_timer,
            store,
            led,
            debug,
            flags,
            pulses,
            ticks: TickScheduler::new(),
            indicator: StatusIndicator::new(),
            address: record.address,
            hops: HopSequence::new(record.hop_channels),
            protocol: record.protocol,
            status: LinkStatus::Idle,
            handshake: BindHandshake::new(),
            binding: false,
            bind_requested: false,
            prior_status: LinkStatus::Idle,
            failsafe: FailsafeMonitor::new(),
            payload: [0u8; PAYLOAD_SIZE],
        };

        receiver.apply_record(&record);
        receiver.ticks.failsafe.restart(FAILSAFE_TIMEOUT_TICKS);

        receiver.radio.set_crc(CrcMode::TwoBytes);
        receiver.radio.set_irq_source(IrqSource::RxDataReady);
        receiver.radio.set_data_rate(DataRate::Kbps250);
        receiver.radio.set_auto_acknowledge(DATA_PIPE, false);
        receiver.radio.set_address_width(ADDRESS_WIDTH as u8);
        receiver.radio.set_payload_size(DATA_PIPE, PAYLOAD_SIZE as u8);

        receiver.restart_packet_receiving();
        receiver
    }

    /// Run one dispatch pass. `button_pressed` is the current bind-button
    /// level; it is only sampled on system-tick boundaries.
    pub fn poll(&mut self, button_pressed: bool) {
        if self.flags.take_tick() {
            if self.ticks.tick(button_pressed) {
                self.bind_requested = true;
            }
        }

        self.process_binding();
        self.process_receiving();
        self.indicator
            .update(self.status, &mut self.ticks.blink, &mut self.led);
    }

    fn process_binding(&mut self) {
        if !self.binding {
            if !self.bind_requested {
                return;
            }

            self.prior_status = self.status;
            self.status = LinkStatus::Binding;
            self.binding = true;
            self.handshake.restart();
            self.ticks.bind.restart(BIND_TIMEOUT_TICKS);

            #[cfg(feature = "embedded")]
            defmt::info!("starting bind procedure");
            self.debug.send_str("Starting bind procedure\n");

            // Listen on the beacon's fixed channel and well-known address
            self.radio.set_chip_enable(false);
            self.radio.set_rx_address(DATA_PIPE, &BIND_ADDRESS);
            self.radio.set_channel(BIND_CHANNEL);
            self.radio.set_chip_enable(true);
            return;
        }

        if self.ticks.bind.is_expired() {
            #[cfg(feature = "embedded")]
            defmt::info!("bind timeout");
            self.debug.send_str("Bind timeout\n");

            // Keep whatever pair was bound before
            self.finish_binding(self.prior_status);
            return;
        }

        if !self.flags.take_radio_ready() {
            return;
        }
        let got_frame = self.drain_rx();
        self.radio.clear_irq();
        if !got_frame {
            return;
        }

        if let BindProgress::Complete(record) = self.handshake.accept(&self.payload) {
            self.store.save(&record.as_bytes());
            self.apply_record(&record);

            #[cfg(feature = "embedded")]
            defmt::info!("bind successful: {}", record);
            self.debug.send_str("Bind successful\n");

            self.finish_binding(LinkStatus::Idle);
        }
    }

    fn process_receiving(&mut self) {
        if self.binding {
            return;
        }

        // Failsafe only engages after stick data has succeeded at least
        // once since power-up, so servos never jump to the failsafe
        // point just because the transmitter is still off.
        if let Some(values) = self.failsafe.check(&self.ticks.failsafe) {
            self.pulses.publish(&values);
            self.status = LinkStatus::Failsafe;
        }

        if self.flags.take_hop_due() {
            if self.hops.record_miss() {
                // Too many silent hops: park on the first channel and
                // wait for the transmitter to come around again
                self.restart_packet_receiving();
            } else {
                self.radio.set_chip_enable(false);
                let channel = self.hops.advance();
                self.radio.set_channel(channel);
                self.radio.set_chip_enable(true);
            }
        }

        if !self.flags.take_radio_ready() {
            return;
        }
        let got_frame = self.drain_rx();
        self.radio.clear_irq();
        if !got_frame {
            return;
        }

        // Any frame re-centers the hop schedule on the transmitter
        self.restart_hop_timer();

        match classify(&self.payload, self.protocol) {
            Some(DataFrame::Stick(channels)) => {
                self.pulses.publish(&channels);
                self.failsafe.note_stick_data(&mut self.ticks.failsafe);
                self.status = LinkStatus::Receiving;
            }
            Some(DataFrame::FailsafeConfig(values)) => {
                self.failsafe.apply_config(values, &mut self.ticks.failsafe);
            }
            None => {}
        }
    }

    /// Drain the receive queue, keeping only the newest frame. Frames
    /// buffered behind it are stale by definition and are discarded.
    fn drain_rx(&mut self) -> bool {
        let mut read_any = false;
        while !self.radio.rx_empty() {
            self.radio.read_frame(&mut self.payload);
            read_any = true;
        }
        read_any
    }

    /// Re-arm the hop timer with the short resynchronization interval
    fn restart_hop_timer(&mut self) {
        self.hop_timer.stop();
        self.hop_timer.start();
        self.hops.clear_misses();
        self.flags.clear_hop_due();
    }

    /// Tear reception down and re-arm from scratch on the first hop
    /// channel of the bound sequence
    fn restart_packet_receiving(&mut self) {
        self.hop_timer.stop();
        self.flags.clear_hop_due();

        self.radio.set_chip_enable(false);
        self.hops.reset();
        self.radio.set_rx_address(DATA_PIPE, self.address.as_bytes());
        self.radio.set_channel(self.hops.current());
        self.radio.flush_rx();
        self.radio.clear_irq();
        self.flags.clear_radio_ready();
        self.radio.set_chip_enable(true);
    }

    fn finish_binding(&mut self, status: LinkStatus) {
        self.status = status;
        self.binding = false;
        self.bind_requested = false;
        self.ticks.failsafe.restart(FAILSAFE_TIMEOUT_TICKS);
        self.restart_packet_receiving();
    }

    /// Reconfigure the live link from a bind record. The 3-channel
    /// protocol keeps the diagnostic pass-through; the 4-channel variant
    /// reassigns that pin to channel 4 and drops the port.
    fn apply_record(&mut self, record: &BindRecord) {
        self.address = record.address;
        self.hops = HopSequence::new(record.hop_channels);
        self.protocol = record.protocol;
        self.pulses.set_protocol(record.protocol);

        match record.protocol {
            Protocol::ThreeChannel => self.debug.enable(),
            Protocol::FourChannel => self.debug.disable(),
        }
    }

    /// Current link status
    #[must_use]
    pub const fn status(&self) -> LinkStatus {
        self.status
    }

    /// Protocol variant of the current bind
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Link address of the current bind
    #[must_use]
    pub const fn address(&self) -> ModelAddress {
        self.address
    }

    /// Hop sequence state
    #[must_use]
    pub const fn hops(&self) -> &HopSequence {
        &self.hops
    }

    /// Failsafe state
    #[must_use]
    pub const fn failsafe(&self) -> &FailsafeMonitor {
        &self.failsafe
    }

    /// The radio seam (host tests inject frames through this)
    #[must_use]
    pub const fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable radio seam
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// The storage seam
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The debug-port seam
    #[must_use]
    pub const fn debug(&self) -> &D {
        &self.debug
    }

    /// The hop-timer seam
    #[must_use]
    pub const fn hop_timer(&self) -> &H {
        &self.hop_timer
    }

    /// The LED output
    #[must_use]
    pub const fn led(&self) -> &L {
        &self.led
    }
}
