//! Timer Abstractions
//!
//! Embassy-backed implementations of the engine's two timer seams plus
//! the 16 ms system tick. The hop timer is modelled as a task the engine
//! starts and stops through an atomic handle; the pulse train runs in
//! its own task at the servo frame rate.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

use crate::config::{FIRST_HOP_TIME_US, HOP_TIME_US, SYSTICK_MS};
use crate::hal::gpio::ServoOutputs;
use crate::hw::{HopTimer, IrqFlags, PulseTimer};
use crate::pulse::{PulseBuffer, PulseGenerator};

/// Shared state between a [`HopTimerHandle`] and [`hop_timer_task`]
pub struct HopTimerState {
    running: AtomicBool,
    epoch: AtomicU8,
    started: Signal<CriticalSectionRawMutex, ()>,
}

impl HopTimerState {
    /// Create a stopped hop timer state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            epoch: AtomicU8::new(0),
            started: Signal::new(),
        }
    }
}

impl Default for HopTimerState {
    fn default() -> Self {
        Self::new()
    }
}

/// The engine-facing side of the hop timer
pub struct HopTimerHandle {
    state: &'static HopTimerState,
}

impl HopTimerHandle {
    /// Create a handle over the shared state
    #[must_use]
    pub const fn new(state: &'static HopTimerState) -> Self {
        Self { state }
    }
}

impl HopTimer for HopTimerHandle {
    fn start(&mut self) {
        self.state.epoch.fetch_add(1, Ordering::AcqRel);
        self.state.running.store(true, Ordering::Release);
        self.state.started.signal(());
    }

    fn stop(&mut self) {
        self.state.running.store(false, Ordering::Release);
    }
}

/// Hop timing task: waits the short resynchronization interval after
/// each start, then raises the hop flag every steady interval until
/// stopped or restarted.
#[embassy_executor::task]
pub async fn hop_timer_task(state: &'static HopTimerState, flags: &'static IrqFlags) {
    loop {
        state.started.wait().await;
        let epoch = state.epoch.load(Ordering::Acquire);

        Timer::after_micros(u64::from(FIRST_HOP_TIME_US)).await;
        while state.running.load(Ordering::Acquire) && state.epoch.load(Ordering::Acquire) == epoch
        {
            flags.raise_hop_due();
            Timer::after_micros(u64::from(HOP_TIME_US)).await;
        }
    }
}

/// Pulse timer driven by the pulse-train task. The reload value is in
/// hardware ticks of 0.75 µs (the wire unit), converted when the task
/// sleeps on it.
#[derive(Debug, Default)]
pub struct FramePulseTimer {
    running: bool,
    reload: u16,
}

impl FramePulseTimer {
    /// Create a stopped pulse timer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: false,
            reload: 0,
        }
    }

    /// Whether a pulse is currently timing out
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Current pulse duration in microseconds
    #[must_use]
    pub fn reload_us(&self) -> u64 {
        u64::from(self.reload) * 3 / 4
    }
}

impl PulseTimer for FramePulseTimer {
    fn stop(&mut self) {
        self.running = false;
    }

    fn load(&mut self, reload: u16) {
        self.reload = reload;
    }

    fn start(&mut self) {
        self.running = true;
    }
}

/// Pulse-train task: starts one train per servo frame and steps it to
/// completion, sleeping each channel's duration in between.
#[embassy_executor::task]
pub async fn pulse_train_task(buffer: &'static PulseBuffer, mut pins: ServoOutputs<'static>) {
    let mut generator = PulseGenerator::new();
    let mut timer = FramePulseTimer::new();

    loop {
        Timer::after_millis(u64::from(SYSTICK_MS)).await;

        generator.trigger(buffer, &mut pins, &mut timer);
        while timer.is_running() {
            Timer::after_micros(timer.reload_us()).await;
            generator.on_timer(&mut pins, &mut timer);
        }
    }
}

/// System tick task: raises the tick flag every 16 ms
#[embassy_executor::task]
pub async fn systick_task(flags: &'static IrqFlags) {
    loop {
        Timer::after_millis(u64::from(SYSTICK_MS)).await;
        flags.raise_tick();
    }
}
