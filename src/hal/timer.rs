//! Timer Abstractions
//!
//! SysTick as the scheduler time base. The core's 24-bit down counter
//! reloads every tick period and raises the `SysTick` exception; the same
//! counter is sampled for busy-wait delays.

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;

use crate::tick::HardwareTimer;

/// Largest reload value SysTick accepts
pub const SYST_MAX_RELOAD: u32 = 0x00FF_FFFF;

/// SysTick driven from the core clock
pub struct SysTickTimer {
    syst: SYST,
}

impl SysTickTimer {
    /// Take ownership of the SysTick peripheral
    #[must_use]
    pub const fn new(syst: SYST) -> Self {
        Self { syst }
    }

    /// Stop counting and release the peripheral
    pub fn free(mut self) -> SYST {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
        self.syst
    }
}

impl HardwareTimer for SysTickTimer {
    fn configure(&mut self, reload: u32) {
        let reload = reload.min(SYST_MAX_RELOAD);
        self.syst.disable_counter();
        self.syst.set_clock_source(SystClkSource::Core);
        self.syst.set_reload(reload);
        self.syst.clear_current();
        self.syst.enable_interrupt();
        self.syst.enable_counter();
    }

    fn current(&self) -> u32 {
        SYST::get_current()
    }

    fn reload(&self) -> u32 {
        SYST::get_reload()
    }
}

impl defmt::Format for SysTickTimer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SysTick(reload={})", SYST::get_reload());
    }
}
