//! Countdown Registry
//!
//! Fixed table of decrementing counters. Each counter belongs to one
//! granularity and one owning behavior; the registry decrements, the owner
//! arms and consumes.

use crate::types::Granularity;

/// Identity of every countdown in the system
///
/// The doc on each variant names the only behavior allowed to arm it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum CountdownId {
    /// Idle time before power save is scheduled. Owner: function state machine.
    BatterySave,
    /// Sleep/listen window while in power save. Owner: function state machine.
    PowerSaveCycle,
    /// Delay before the FM broadcast receiver resumes. Owner: function state machine.
    FmRestore,
    /// Dual-watch VFO alternation. Owner: dual watch.
    DualWatch,
    /// Pause on a busy channel before the scanner moves on. Owner: scanner hooks.
    ScanPause,
    /// NOAA weather channel poll. Owner: NOAA monitor.
    NoaaPoll,
    /// Repeater tail elimination tone. Owner: end of transmission.
    TailTone,
    /// Live DTMF string display. Owner: DTMF receive hook.
    DtmfRxLive,
    /// Transmit time limit. Owner: transmit request.
    TxTimeout,
    /// Menu inactivity. Owner: menu activity hooks.
    MenuTimeout,
    /// Return of dual watch to the home VFO. Owner: receive-end hook.
    VfoResume,
    /// Serial configuration session guard. Owner: serial activity hook.
    SerialConfigGuard,
    /// DTMF call state auto reset. Owner: function state machine.
    DtmfAutoReset,
}

impl CountdownId {
    /// Number of countdowns
    pub const COUNT: usize = 13;

    /// Every countdown, in slot order
    pub const ALL: [Self; Self::COUNT] = [
        Self::BatterySave,
        Self::PowerSaveCycle,
        Self::FmRestore,
        Self::DualWatch,
        Self::ScanPause,
        Self::NoaaPoll,
        Self::TailTone,
        Self::DtmfRxLive,
        Self::TxTimeout,
        Self::MenuTimeout,
        Self::VfoResume,
        Self::SerialConfigGuard,
        Self::DtmfAutoReset,
    ];

    /// Tick granularity this countdown is decremented at
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        match self {
            Self::BatterySave
            | Self::PowerSaveCycle
            | Self::FmRestore
            | Self::DualWatch
            | Self::ScanPause
            | Self::NoaaPoll
            | Self::TailTone
            | Self::DtmfRxLive => Granularity::Fast10ms,
            Self::TxTimeout
            | Self::MenuTimeout
            | Self::VfoResume
            | Self::SerialConfigGuard
            | Self::DtmfAutoReset => Granularity::Slow500ms,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Countdown {
    remaining: u16,
    expired: bool,
}

/// All countdowns and their expiry signals
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountdownRegistry {
    slots: [Countdown; CountdownId::COUNT],
}

impl CountdownRegistry {
    /// Create a registry with every countdown disarmed
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [Countdown {
                remaining: 0,
                expired: false,
            }; CountdownId::COUNT],
        }
    }

    /// Disarm everything and drop all pending expiries
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Load `ticks` into a countdown; zero disarms it
    ///
    /// A pending expiry is left untouched, the owner clears it explicitly.
    pub fn arm(&mut self, id: CountdownId, ticks: u16) {
        self.slots[id.slot()].remaining = ticks;
    }

    /// Disarm a countdown
    pub fn disarm(&mut self, id: CountdownId) {
        self.arm(id, 0);
    }

    /// Ticks left before expiry
    #[must_use]
    pub const fn remaining(&self, id: CountdownId) -> u16 {
        self.slots[id.slot()].remaining
    }

    /// Whether the countdown is still running
    #[must_use]
    pub const fn is_active(&self, id: CountdownId) -> bool {
        self.slots[id.slot()].remaining > 0
    }

    /// Whether the expiry signal is raised, without consuming it
    #[must_use]
    pub const fn is_expired(&self, id: CountdownId) -> bool {
        self.slots[id.slot()].expired
    }

    /// Consume the expiry signal, returns whether it was raised
    pub fn take_expired(&mut self, id: CountdownId) -> bool {
        let expired = core::mem::take(&mut self.slots[id.slot()].expired);
        if expired {
            trace!("countdown: {:?} expired", id);
        }
        expired
    }

    /// Drop the expiry signal
    pub fn clear_expired(&mut self, id: CountdownId) {
        self.slots[id.slot()].expired = false;
    }

    /// Deliver one tick of `granularity`
    ///
    /// Every active countdown of that granularity drops by one; those that
    /// reach zero raise their expiry signal.
    pub fn tick(&mut self, granularity: Granularity) {
        for id in CountdownId::ALL {
            if id.granularity() != granularity {
                continue;
            }
            let slot = &mut self.slots[id.slot()];
            if slot.remaining == 0 {
                continue;
            }
            slot.remaining -= 1;
            if slot.remaining == 0 {
                slot.expired = true;
            }
        }
    }
}

impl Default for CountdownRegistry {
    fn default() -> Self {
        Self::new()
    }
}
