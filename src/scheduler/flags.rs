//! Scheduler Flags
//!
//! Two handoffs live here. [`TickFlags`] carries tick deliveries from the
//! timer interrupt to the dispatch loop using atomics only. [`ScheduleFlags`]
//! holds the one-shot requests that dispatch code raises and exactly one
//! consumer clears.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::SLOW_TICK_DIVIDER;
use crate::types::Screen;

/// Interrupt-to-loop tick handoff
///
/// The interrupt is the only writer of the counters; the loop is the only
/// reader that resets the pending counts.
#[derive(Debug)]
pub struct TickFlags {
    ticks: AtomicU32,
    pending_fast: AtomicU32,
    pending_slow: AtomicU32,
}

impl TickFlags {
    /// Create with no ticks delivered
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU32::new(0),
            pending_fast: AtomicU32::new(0),
            pending_slow: AtomicU32::new(0),
        }
    }

    /// Record one hardware tick (call from the tick interrupt)
    pub fn on_tick(&self) {
        let ticks = self.ticks.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        self.pending_fast.fetch_add(1, Ordering::Release);
        if ticks % SLOW_TICK_DIVIDER == 0 {
            self.pending_slow.fetch_add(1, Ordering::Release);
        }
    }

    /// Monotonic tick count since boot (wraps after ~497 days)
    #[must_use]
    pub fn tick_count(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Take all fast ticks delivered since the last call
    pub fn take_fast(&self) -> u32 {
        self.pending_fast.swap(0, Ordering::Acquire)
    }

    /// Take all slow ticks delivered since the last call
    pub fn take_slow(&self) -> u32 {
        self.pending_slow.swap(0, Ordering::Acquire)
    }
}

impl Default for TickFlags {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot requests observed by the UI, the scanner and the core itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
#[repr(u16)]
pub enum ScheduleFlag {
    /// Idle long enough, consider entering power save
    SchedulePowerSave = 1 << 0,
    /// Redraw the status bar
    UpdateStatus = 1 << 1,
    /// Redraw the main display
    UpdateDisplay = 1 << 2,
    /// Reprogram the RF chip for the current VFOs
    ReconfigureVfos = 1 << 3,
    /// Persist settings now
    SaveSettings = 1 << 4,
    /// Scanner should step to the next channel
    ScanNext = 1 << 5,
    /// NOAA monitor should check the next weather channel
    NoaaStep = 1 << 6,
}

/// Bitset of raised [`ScheduleFlag`]s plus a pending screen request
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleFlags {
    bits: u16,
    screen: Option<Screen>,
}

impl ScheduleFlags {
    /// Create with nothing raised
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: 0,
            screen: None,
        }
    }

    /// Raise a flag (idempotent)
    pub fn raise(&mut self, flag: ScheduleFlag) {
        self.bits |= flag as u16;
    }

    /// Whether a flag is raised
    #[must_use]
    pub const fn is_raised(&self, flag: ScheduleFlag) -> bool {
        self.bits & flag as u16 != 0
    }

    /// Clear a flag, returns whether it was raised
    pub fn take(&mut self, flag: ScheduleFlag) -> bool {
        let raised = self.is_raised(flag);
        self.bits &= !(flag as u16);
        raised
    }

    /// Ask the UI to switch to `screen`; a later request replaces an earlier one
    pub fn request_screen(&mut self, screen: Screen) {
        self.screen = Some(screen);
    }

    /// Consume the pending screen request
    pub fn take_screen(&mut self) -> Option<Screen> {
        self.screen.take()
    }

    /// Drop everything
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
