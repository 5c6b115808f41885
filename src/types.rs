//! Shared types used across the control core
//!
//! This module defines the domain types that the scheduler, the function
//! state machine and the collaborators exchange.

use core::fmt;

/// Operating mode that currently owns the RF/audio front end
///
/// Exactly one is active system-wide. Only
/// [`select`](crate::radio::function::select) changes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FunctionState {
    /// Idle, receiver armed, nothing heard
    #[default]
    Foreground,
    /// Receiving a qualified call
    Receive,
    /// Squelch forced open by the user
    Monitor,
    /// Squelch opened, call not yet qualified
    Incoming,
    /// Transmitting
    Transmit,
    /// Receiver duty-cycled to save battery
    PowerSave,
}

impl FunctionState {
    /// Every state, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Foreground,
        Self::Receive,
        Self::Monitor,
        Self::Incoming,
        Self::Transmit,
        Self::PowerSave,
    ];

    /// Whether the receiver is producing audio in this state
    #[must_use]
    pub const fn is_receiving(self) -> bool {
        matches!(self, Self::Receive | Self::Monitor | Self::Incoming)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FunctionState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Foreground => defmt::write!(f, "FOREGROUND"),
            Self::Receive => defmt::write!(f, "RECEIVE"),
            Self::Monitor => defmt::write!(f, "MONITOR"),
            Self::Incoming => defmt::write!(f, "INCOMING"),
            Self::Transmit => defmt::write!(f, "TRANSMIT"),
            Self::PowerSave => defmt::write!(f, "POWER_SAVE"),
        }
    }
}

/// Tick granularity of a countdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Granularity {
    /// Decremented on every 10 ms tick
    Fast10ms,
    /// Decremented on every 500 ms tick
    Slow500ms,
}

impl Granularity {
    /// Period of one tick of this granularity in milliseconds
    #[must_use]
    pub const fn period_ms(self) -> u32 {
        match self {
            Self::Fast10ms => 10,
            Self::Slow500ms => 500,
        }
    }
}

/// Screen the UI shows (or is asked to show)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Screen {
    /// Main frequency/channel screen
    #[default]
    Main,
    /// Settings menu
    Menu,
    /// FM broadcast receiver
    FmRadio,
    /// Scanner screen
    Scanner,
}

/// Alarm sequencing state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum AlarmState {
    /// No alarm
    #[default]
    Off,
    /// Alarm requested, waiting for the transmitter
    TxAlarm,
    /// Alarm sounding
    Alarm,
    /// 1750 Hz repeater access burst
    Tx1750,
}

/// What the alarm key does
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum AlarmMode {
    /// Transmit the alarm tone on air
    #[default]
    Site,
    /// Sound the alarm locally only
    Tone,
}

/// DTMF calling progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DtmfCallState {
    /// No call
    #[default]
    None,
    /// We called out and wait for a response
    CallOut,
    /// Somebody called us
    Received,
}

impl DtmfCallState {
    /// Whether a call is mid-flow
    #[must_use]
    pub const fn in_progress(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Pending DTMF reply to send on the next transmission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum DtmfReply {
    /// Nothing queued
    #[default]
    None,
    /// Send our ANI identifier
    Ani,
    /// Acknowledge a call
    Ack,
}

/// Voice scrambler setting of a channel (0 = off, 1..=10 = type)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct ScrambleType(u8);

impl ScrambleType {
    /// Scrambler disabled
    pub const OFF: Self = Self(0);

    /// Highest scrambler type
    pub const MAX: u8 = 10;

    /// Create a scramble type, returns None if out of range
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Zero-based index the RF chip expects, or None when scrambling is off
    #[must_use]
    pub const fn chip_index(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0 - 1)
        }
    }

    /// Raw stored value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Frequency in Hertz with validation
///
/// Covers the receiver's full tuning range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(u32);

impl Frequency {
    /// Lowest tunable frequency (18 MHz)
    pub const MIN_HZ: u32 = 18_000_000;

    /// Highest tunable frequency (1300 MHz)
    pub const MAX_HZ: u32 = 1_300_000_000;

    /// Create a new Frequency from Hz, returns None if out of range
    #[must_use]
    pub const fn from_hz(hz: u32) -> Option<Self> {
        if hz >= Self::MIN_HZ && hz <= Self::MAX_HZ {
            Some(Self(hz))
        } else {
            None
        }
    }

    /// Get the frequency in Hz
    #[must_use]
    pub const fn as_hz(self) -> u32 {
        self.0
    }

    /// Get the frequency in kHz (truncated)
    #[must_use]
    pub const fn as_khz(self) -> u32 {
        self.0 / 1000
    }
}

impl fmt::Debug for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frequency({} Hz)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Frequency {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} Hz", self.0);
    }
}

/// Which of the two VFOs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum VfoSlot {
    /// Upper VFO
    #[default]
    A,
    /// Lower VFO
    B,
}

impl VfoSlot {
    /// The other VFO
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Array index of this VFO
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

/// Channel data the core needs from a VFO
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct VfoInfo {
    /// Transmit frequency
    pub tx_frequency: Frequency,
    /// Scrambler configured for this channel
    pub scramble: ScrambleType,
    /// Signal-strength bar history shown for this VFO
    pub rssi_level: u8,
}

impl VfoInfo {
    /// Create channel data with no scrambling and empty signal history
    #[must_use]
    pub const fn new(tx_frequency: Frequency) -> Self {
        Self {
            tx_frequency,
            scramble: ScrambleType::OFF,
            rssi_level: 0,
        }
    }
}

/// Beep patterns the announcer can play
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Beep {
    /// Low-battery warning
    DoubleBeep500Hz,
    /// Transmit timed out
    TripleBeep880Hz,
    /// Request refused
    Error,
}

/// Voice prompts the announcer can speak
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum VoicePrompt {
    /// "Low voltage"
    LowVoltage,
    /// Battery low, non-critical
    BatteryLow,
    /// Battery critical, entering reduced service
    BatteryCritical,
}
