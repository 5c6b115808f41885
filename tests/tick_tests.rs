//! Tick Source Tests
//!
//! Tests for timer configuration and the wrap-safe busy-wait delay.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test tick_tests

use std::cell::Cell;

use embedded_hal::delay::DelayNs;
use handheld_firmware::config::{SYSTEM_CLOCK_HZ, TICK_PERIOD_US};
use handheld_firmware::tick::{elapsed_ticks, HardwareTimer, TickSource};

/// Down counter that advances `step` ticks every time it is read
struct FakeTimer {
    value: Cell<u32>,
    reload: Cell<u32>,
    step: u32,
    consumed: Cell<u64>,
    configured: Cell<bool>,
}

impl FakeTimer {
    fn new(step: u32) -> Self {
        Self {
            value: Cell::new(0),
            reload: Cell::new(0),
            step,
            consumed: Cell::new(0),
            configured: Cell::new(false),
        }
    }
}

impl HardwareTimer for FakeTimer {
    fn configure(&mut self, reload: u32) {
        self.reload.set(reload);
        self.value.set(reload);
        self.configured.set(true);
    }

    fn current(&self) -> u32 {
        let value = self.value.get();
        let next = if self.step <= value {
            value - self.step
        } else {
            self.reload.get() + 1 - (self.step - value)
        };
        self.value.set(next);
        self.consumed.set(self.consumed.get() + u64::from(self.step));
        next
    }

    fn reload(&self) -> u32 {
        self.reload.get()
    }
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn init_programs_reload_for_period() {
    let source = TickSource::init(FakeTimer::new(1), SYSTEM_CLOCK_HZ, TICK_PERIOD_US);
    assert_eq!(source.ticks_per_us(), 170);

    let timer = source.free();
    assert!(timer.configured.get());
    assert_eq!(timer.reload.get(), 170 * 10_000 - 1);
}

#[test]
fn slow_clock_still_counts() {
    let source = TickSource::init(FakeTimer::new(1), 500_000, 100);
    assert_eq!(source.ticks_per_us(), 1);
}

// =============================================================================
// Elapsed Arithmetic Tests
// =============================================================================

#[test]
fn elapsed_is_difference_without_wrap() {
    assert_eq!(elapsed_ticks(900, 100, 999), 800);
    assert_eq!(elapsed_ticks(42, 42, 999), 0);
}

#[test]
fn elapsed_handles_reload() {
    // 10 ticks to zero, reload, 9 more ticks down to 990
    assert_eq!(elapsed_ticks(10, 990, 999), 19);
}

// =============================================================================
// Delay Tests
// =============================================================================

#[test]
fn delay_never_returns_early() {
    let mut source = TickSource::init(FakeTimer::new(37), 10_000_000, 100);
    source.delay_microseconds(250);

    let timer = source.free();
    let target = 250 * 10;
    assert!(timer.consumed.get() >= target, "returned after {} ticks", timer.consumed.get());
}

#[test]
fn delay_across_many_reloads() {
    // Reload every 100 us, wait 2 ms
    let mut source = TickSource::init(FakeTimer::new(7), 10_000_000, 100);
    source.delay_microseconds(2_000);

    let timer = source.free();
    let target = 2_000 * 10;
    let consumed = timer.consumed.get();
    assert!(consumed >= target, "returned after {consumed} ticks");
    assert!(consumed < target + target / 10, "overshot to {consumed} ticks");
}

#[test]
fn zero_delay_returns_immediately() {
    let mut source = TickSource::init(FakeTimer::new(5), 10_000_000, 100);
    source.delay_microseconds(0);
    let timer = source.free();
    assert!(timer.consumed.get() <= 5);
}

#[test]
fn delay_ns_trait_rounds_up() {
    let mut source = TickSource::init(FakeTimer::new(1), 10_000_000, 100);
    source.delay_ns(1);
    let timer = source.free();
    assert!(timer.consumed.get() >= 10);
}

#[test]
fn delay_ms_trait_waits_whole_milliseconds() {
    let mut source = TickSource::init(FakeTimer::new(11), 10_000_000, 100);
    source.delay_ms(3);
    let timer = source.free();
    assert!(timer.consumed.get() >= 3 * 1_000 * 10);
}
