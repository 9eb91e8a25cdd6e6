//! RC Receiver Firmware Library
//!
//! This library provides the core functionality of a 2.4 GHz
//! frequency-hopping RC receiver: it pairs with a handheld transmitter
//! through a one-time bind handshake, follows the agreed hop sequence,
//! decodes stick data into servo pulse widths, falls back to failsafe
//! values when the link is lost and emits one jitter-free pulse per
//! channel from a dedicated timer interrupt.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LINK ENGINE                             │
//! │  Bind Handshake │ Hop Scheduler │ Failsafe │ Dispatch        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    REAL-TIME OUTPUT                          │
//! │  Pulse double buffer  │  Interrupt-stepped pulse train       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  HARDWARE CAPABILITY SEAMS                   │
//! │  Transceiver │ Timers │ GPIO │ Storage │ Debug port          │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   RTOS / SCHEDULER                           │
//! │          embassy-rs (async/await executor)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Single owned context**: all link state lives in one `Receiver`
//!   object passed to the dispatch; no globals, no singletons
//! - **Interrupts never block**: interrupt handlers raise atomic flags
//!   or step the pulse train; every protocol decision runs in the
//!   cooperative main dispatch
//! - **No fatal errors**: malformed frames are ignored, link loss falls
//!   back to failsafe, a missing bind record is an expected state
//! - **Hardware behind seams**: the engine depends on narrow capability
//!   traits, so the whole protocol runs deterministically on the host

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// Binds the capability seams to embassy-stm32 peripherals.
#[cfg(feature = "embedded")]
pub mod hal;

/// Hardware capability seams
///
/// Narrow traits the link engine depends on, plus the interrupt flag
/// block.
pub mod hw;

/// Radio Link Engine
///
/// Bind handshake, hop scheduling, failsafe and the receiver dispatch.
pub mod link;

/// Servo Pulse Generation
///
/// Double-buffered, interrupt-stepped pulse trains.
pub mod pulse;

/// Wire Formats
///
/// Bit-exact frame layouts and the persisted bind record.
pub mod protocol;

/// Link Status Indicator
///
/// LED level and blink patterns per link state.
pub mod status;

/// System-Tick Bookkeeping
///
/// Countdown timers and the debounced bind button.
pub mod tick;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Simulated hardware for deterministic host testing
#[cfg(feature = "std")]
pub mod sim;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    // Common traits
    pub use embedded_hal::digital::{InputPin, OutputPin};

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
