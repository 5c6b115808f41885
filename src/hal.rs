//! Hardware Abstraction Layer
//!
//! Provides safe abstractions over STM32G474 peripherals.
//! This module isolates hardware-specific code from the portable
//! control core.

pub mod adc;
pub mod board;
pub mod gpio;
pub mod timer;
