//! Tick Source
//!
//! Hardware time base for the scheduler. A down-counting reload timer fires
//! the periodic tick interrupt; the same counter is sampled by
//! [`TickSource::delay_microseconds`] for short blocking delays.

use embedded_hal::delay::DelayNs;

/// Down-counting hardware timer that reloads when it reaches zero
///
/// SysTick on Cortex-M is the reference implementation.
pub trait HardwareTimer {
    /// Program the reload value and start counting with the tick interrupt enabled
    fn configure(&mut self, reload: u32);

    /// Current counter value
    fn current(&self) -> u32;

    /// Programmed reload value
    fn reload(&self) -> u32;
}

/// Timer ticks elapsed between two samples of a down counter
///
/// A sample larger than the previous one means the counter passed zero and
/// reloaded in between.
#[must_use]
pub const fn elapsed_ticks(previous: u32, current: u32, reload: u32) -> u32 {
    if current <= previous {
        previous - current
    } else {
        previous.saturating_add(reload - current)
    }
}

/// Scheduler time base and blocking delay primitive
#[derive(Debug)]
pub struct TickSource<T> {
    timer: T,
    ticks_per_us: u32,
}

impl<T: HardwareTimer> TickSource<T> {
    /// Configure `timer` for a fixed tick period derived from `clock_hz`
    pub fn init(mut timer: T, clock_hz: u32, period_us: u32) -> Self {
        let ticks_per_us = (clock_hz / 1_000_000).max(1);
        let reload = ticks_per_us.saturating_mul(period_us).saturating_sub(1);
        timer.configure(reload);
        debug!("tick source: reload={} ticks/us={}", reload, ticks_per_us);
        Self {
            timer,
            ticks_per_us,
        }
    }

    /// Timer ticks per microsecond
    #[must_use]
    pub const fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }

    /// Busy-wait for at least `duration_us` microseconds
    ///
    /// Never returns early. Blocks the caller for the whole duration, so it
    /// must not be used from interrupt context with a tight latency budget.
    pub fn delay_microseconds(&mut self, duration_us: u32) {
        let target = u64::from(duration_us) * u64::from(self.ticks_per_us);
        let reload = self.timer.reload();
        let mut elapsed: u64 = 0;
        let mut previous = self.timer.current();

        while elapsed < target {
            let current = self.timer.current();
            if current == previous {
                continue;
            }
            elapsed += u64::from(elapsed_ticks(previous, current, reload));
            previous = current;
        }
    }

    /// Release the underlying timer
    pub fn free(self) -> T {
        self.timer
    }
}

impl<T: HardwareTimer> DelayNs for TickSource<T> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_microseconds(ns.div_ceil(1000));
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_microseconds(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_microseconds(1000);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_without_wrap() {
        assert_eq!(elapsed_ticks(1000, 400, 1699), 600);
        assert_eq!(elapsed_ticks(5, 5, 1699), 0);
    }

    #[test]
    fn elapsed_across_reload() {
        // 100 ticks down to zero, reload to 1699, then down to 1650
        assert_eq!(elapsed_ticks(100, 1650, 1699), 149);
    }
}
