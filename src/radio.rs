//! Radio Control Logic
//!
//! The function state machine and the behaviors that hang off it.
//! Implements the functional core of the handheld transceiver.

pub mod alarm;
pub mod dtmf;
pub mod function;
pub mod receive;
pub mod state;
pub mod transmit;
