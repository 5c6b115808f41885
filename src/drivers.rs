//! Collaborator Drivers
//!
//! The control core talks to the RF chip, the display, the audio announcer,
//! the FM broadcast receiver and the battery sensor only through the traits
//! in this module. A [`Board`] bundles one implementation of each together
//! with the two GPIO lines the core drives directly and a blocking delay.

pub mod audio;
pub mod battery;
pub mod display;
pub mod transceiver;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

pub use audio::{Announcer, FmReceiver};
pub use battery::{BatterySample, BatterySensor};
pub use display::{Backlight, Display};
pub use transceiver::Transceiver;

/// Every collaborator the control core drives
pub trait Board {
    /// RF transceiver chip
    type Rf: Transceiver;
    /// LCD and status bar
    type Display: Display;
    /// LCD backlight
    type Backlight: Backlight;
    /// Beeps and voice prompts
    type Announcer: Announcer;
    /// Auxiliary FM broadcast receiver
    type Fm: FmReceiver;
    /// Battery voltage and charge current sensor
    type Battery: BatterySensor;
    /// Audio amplifier path switch
    type AudioPath: OutputPin<Error = Infallible>;
    /// Transmit indicator LED
    type TxIndicator: OutputPin<Error = Infallible>;
    /// Blocking microsecond delay
    type Delay: DelayNs;

    /// RF transceiver
    fn rf(&mut self) -> &mut Self::Rf;
    /// Display
    fn display(&mut self) -> &mut Self::Display;
    /// Backlight
    fn backlight(&mut self) -> &mut Self::Backlight;
    /// Announcer
    fn announcer(&mut self) -> &mut Self::Announcer;
    /// FM broadcast receiver
    fn fm(&mut self) -> &mut Self::Fm;
    /// Battery sensor
    fn battery(&mut self) -> &mut Self::Battery;
    /// Audio path switch
    fn audio_path(&mut self) -> &mut Self::AudioPath;
    /// Transmit indicator
    fn tx_indicator(&mut self) -> &mut Self::TxIndicator;
    /// Delay provider
    fn delay(&mut self) -> &mut Self::Delay;
}

/// Drive an infallible output pin
pub fn set_pin<P: OutputPin<Error = Infallible>>(pin: &mut P, high: bool) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}
