//! Handheld Transceiver Control Core
//!
//! This library is the control core of a handheld two-way radio. It
//! arbitrates a single shared RF/audio front end among mutually exclusive
//! operating modes and coordinates the timed behaviors that hang off a
//! periodic hardware tick.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DISPATCH LOOP                             │
//! │  Input events  │  10 ms slice  │  500 ms slice               │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    CONTROL CORE                              │
//! │  FunctionStateMachine  │  BatteryMonitor  │  Countdowns      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                 COLLABORATOR BOUNDARY                        │
//! │  Transceiver │ Display │ Backlight │ Announcer │ GPIO        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    TICK SOURCE                               │
//! │      SysTick ISR  →  TickFlags  →  CountdownRegistry         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Explicit context**: all scheduler state lives in one
//!   [`scheduler::Context`] owned by the dispatch loop, no singletons
//! - **Bounded interrupt work**: the tick ISR only bumps atomics
//! - **Exhaustive state machine**: `select` matches every
//!   [`types::FunctionState`] and reports whether the shared epilogue ran
//! - **Functional core, imperative shell**: the battery monitor returns
//!   actions, the dispatcher applies them to the board

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[macro_use]
mod macros;

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// SysTick time base, GPIO, battery ADC and board wiring for STM32G474.
#[cfg(feature = "embedded")]
pub mod hal;

/// Collaborator Drivers
///
/// Boundary traits for the RF chip, display, audio and battery sensor.
pub mod drivers;

/// Radio Control Logic
///
/// Function state machine, transmit sequencing, alarm and DTMF state.
pub mod radio;

/// Power Management
///
/// Battery voltage averaging, charge level and low-battery escalation.
pub mod power;

/// Cooperative Scheduler
///
/// Countdown registry, ISR handoff flags and the dispatch loop.
pub mod scheduler;

/// Tick source and busy-wait delay
pub mod tick;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::types::*;

    pub use crate::drivers::Board;
    pub use crate::scheduler::dispatch::{Dispatcher, InputEvent};
    pub use crate::scheduler::flags::TickFlags;
    pub use crate::scheduler::Context;

    // Common traits
    pub use embedded_hal::delay::DelayNs;
    pub use embedded_hal::digital::OutputPin;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}
