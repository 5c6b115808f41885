//! GPIO Abstractions
//!
//! Type-safe GPIO pin wrappers for the handheld.
//! Provides semantic meaning to pins through the type system.

use embassy_stm32::gpio::{Input, Output};

use crate::drivers::Backlight;
use crate::scheduler::dispatch::InputEvent;

/// Backlight state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LightState {
    /// Backlight is off
    #[default]
    Off,
    /// Backlight is on
    On,
}

impl defmt::Format for LightState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "OFF"),
            Self::On => defmt::write!(f, "ON"),
        }
    }
}

/// LCD backlight driver
pub struct BacklightPin<'d> {
    pin: Output<'d>,
    state: LightState,
}

impl<'d> BacklightPin<'d> {
    /// Create a backlight driver (initially off)
    #[must_use]
    pub fn new(mut pin: Output<'d>) -> Self {
        pin.set_low();
        Self {
            pin,
            state: LightState::Off,
        }
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> LightState {
        self.state
    }
}

impl Backlight for BacklightPin<'_> {
    fn turn_on(&mut self) {
        self.pin.set_high();
        self.state = LightState::On;
    }

    fn turn_off(&mut self) {
        self.pin.set_low();
        self.state = LightState::Off;
    }
}

/// PTT (Push-to-Talk) input with debouncing
pub struct PttInput<'d> {
    pin: Input<'d>,
    pressed: bool,
    last_raw: bool,
    debounce_count: u8,
}

impl<'d> PttInput<'d> {
    /// Required consecutive reads for debounce
    const DEBOUNCE_THRESHOLD: u8 = 3;

    /// Create a PTT input (active low with internal pull-up)
    #[must_use]
    pub fn new(pin: Input<'d>) -> Self {
        Self {
            pin,
            pressed: false,
            last_raw: false,
            debounce_count: 0,
        }
    }

    /// Sample the pin (call periodically)
    ///
    /// Returns the event to queue when the debounced state changes.
    pub fn update(&mut self) -> Option<InputEvent> {
        let current = self.pin.is_low();

        if current == self.last_raw {
            if self.debounce_count < Self::DEBOUNCE_THRESHOLD {
                self.debounce_count += 1;
            }
        } else {
            self.debounce_count = 0;
            self.last_raw = current;
        }

        if self.debounce_count < Self::DEBOUNCE_THRESHOLD || current == self.pressed {
            return None;
        }

        self.pressed = current;
        Some(if current {
            InputEvent::PttPressed
        } else {
            InputEvent::PttReleased
        })
    }

    /// Check if PTT is held (debounced)
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }
}
