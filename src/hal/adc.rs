//! ADC Driver
//!
//! Battery divider and charger current sense sampling. A low-priority task
//! posts readings into a [`BatteryMailbox`]; the dispatch loop picks up the
//! latest one through [`MailboxSensor`] whenever it evaluates the battery.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime};
use embassy_stm32::peripherals::ADC1;

use crate::drivers::{BatterySample, BatterySensor};

/// Battery ADC driver
pub struct BatteryAdc<'d> {
    adc: Adc<'d, ADC1>,
    voltage: AnyAdcChannel<ADC1>,
    current: AnyAdcChannel<ADC1>,
}

impl<'d> BatteryAdc<'d> {
    /// Create the driver for the divider and current sense channels
    #[must_use]
    pub fn new(
        adc: ADC1,
        voltage: impl AdcChannel<ADC1>,
        current: impl AdcChannel<ADC1>,
    ) -> Self {
        let mut adc = Adc::new(adc);
        adc.set_sample_time(SampleTime::CYCLES247_5);
        Self {
            adc,
            voltage: voltage.degrade_adc(),
            current: current.degrade_adc(),
        }
    }

    /// Read both channels
    pub fn read(&mut self) -> BatterySample {
        BatterySample {
            voltage: self.adc.blocking_read(&mut self.voltage),
            current: self.adc.blocking_read(&mut self.current),
        }
    }
}

/// Latest battery reading shared between the sampler and the loop
pub struct BatteryMailbox {
    latest: Mutex<Cell<BatterySample>>,
}

impl BatteryMailbox {
    /// Empty mailbox (zero reading)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(Cell::new(BatterySample {
                voltage: 0,
                current: 0,
            })),
        }
    }

    /// Replace the stored reading
    pub fn post(&self, sample: BatterySample) {
        critical_section::with(|cs| self.latest.borrow(cs).set(sample));
    }

    /// Copy of the stored reading
    #[must_use]
    pub fn latest(&self) -> BatterySample {
        critical_section::with(|cs| self.latest.borrow(cs).get())
    }
}

impl Default for BatteryMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// [`BatterySensor`] reading from a mailbox
pub struct MailboxSensor {
    mailbox: &'static BatteryMailbox,
}

impl MailboxSensor {
    /// Read from `mailbox`
    #[must_use]
    pub const fn new(mailbox: &'static BatteryMailbox) -> Self {
        Self { mailbox }
    }
}

impl BatterySensor for MailboxSensor {
    fn sample(&mut self) -> BatterySample {
        self.mailbox.latest()
    }
}
