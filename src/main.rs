//! RC Receiver Main Application
//!
//! Entry point for the receiver firmware. Initializes hardware, spawns
//! the timing tasks and runs the link-engine poll loop.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

use rc_receiver::hal::gpio::{BindButtonInput, ServoOutputs, StatusLed};
use rc_receiver::hal::timer::{hop_timer_task, pulse_train_task, systick_task, HopTimerState};
use rc_receiver::hw::{DigitalOutput, IrqFlags};
use rc_receiver::pulse::PulseBuffer;

/// Interrupt-to-dispatch flags, shared with the timing tasks
static IRQ_FLAGS: IrqFlags = IrqFlags::new();

/// Channel handoff between the dispatch and the pulse train
static PULSES: PulseBuffer = PulseBuffer::new();

/// Hop timer shared state
static HOP_TIMER: HopTimerState = HopTimerState::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RC Receiver Firmware v{}", env!("CARGO_PKG_VERSION"));

    // Initialize peripherals with the default clock configuration
    let config = embassy_stm32::Config::default();
    let p = embassy_stm32::init(config);

    info!("Peripherals initialized");

    let servo = ServoOutputs::new(
        [
            Output::new(p.PB0, Level::Low, Speed::High),
            Output::new(p.PB1, Level::Low, Speed::High),
            Output::new(p.PB2, Level::Low, Speed::High),
            Output::new(p.PB3, Level::Low, Speed::High),
        ],
        Output::new(p.PB4, Level::High, Speed::High),
    );
    let button = BindButtonInput::new(Input::new(p.PA0, Pull::Up));
    let mut led = StatusLed::new(Output::new(p.PA5, Level::Low, Speed::Low));

    // Timing tasks: system tick, hop schedule, servo pulse trains
    spawner.spawn(systick_task(&IRQ_FLAGS)).unwrap();
    spawner.spawn(hop_timer_task(&HOP_TIMER, &IRQ_FLAGS)).unwrap();
    spawner.spawn(pulse_train_task(&PULSES, servo)).unwrap();

    info!("Tasks spawned, entering main loop");

    // The transceiver register driver, the bind-record flash storage and
    // the debug UART are separate collaborators; the link engine binds to
    // them here:
    //
    // let radio = ...;  // impl Transceiver (SPI register driver)
    // let store = ...;  // impl BindStore   (flash page)
    // let debug = ...;  // impl DebugPort   (UART pass-through)
    // let mut receiver = Receiver::new(
    //     radio,
    //     HopTimerHandle::new(&HOP_TIMER),
    //     store,
    //     led,
    //     debug,
    //     &IRQ_FLAGS,
    //     &PULSES,
    // );
    // loop {
    //     receiver.poll(button.is_pressed());
    //     embassy_futures::yield_now().await;
    // }

    // Until then: heartbeat so the board shows life
    let mut lit = false;
    loop {
        Timer::after_millis(500).await;
        lit = !lit;
        led.set(lit);
        if button.is_pressed() {
            info!("bind button pressed");
        }
    }
}
