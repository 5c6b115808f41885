//! System configuration and hardware constants
//!
//! Compile-time constants for the tick scheduler, countdown reload values
//! and battery thresholds, plus the runtime [`Settings`] snapshot of the
//! persistent configuration store and the [`Capabilities`] of this build.

use crate::power::BatteryType;
use crate::types::{AlarmMode, Frequency, VfoInfo};

/// System clock frequency (STM32G474 @ 170MHz)
pub const SYSTEM_CLOCK_HZ: u32 = 170_000_000;

/// Period of the fast scheduler tick in microseconds
pub const TICK_PERIOD_US: u32 = 10_000;

/// Fast ticks per slow (500 ms) tick
pub const SLOW_TICK_DIVIDER: u32 = 50;

/// Idle time before power save is considered (10 s in 10 ms ticks)
pub const BATTERY_SAVE_IDLE_10MS: u16 = 1000;

/// FM broadcast restore delay after reception (5 s in 10 ms ticks)
pub const FM_RESTORE_10MS: u16 = 500;

/// Listen window while duty cycling in power save (100 ms)
pub const POWER_SAVE_LISTEN_10MS: u16 = 10;

/// Dual-watch toggle period while idle
pub const DUAL_WATCH_TOGGLE_10MS: u16 = 10;

/// Dual-watch hold-off after a reception ends (3.6 s)
pub const DUAL_WATCH_AFTER_RX_10MS: u16 = 360;

/// Dual-watch hold-off after a transmission ends (3.6 s)
pub const DUAL_WATCH_AFTER_TX_10MS: u16 = 360;

/// Scanner pause after squelch closes (5 s)
pub const SCAN_PAUSE_10MS: u16 = 500;

/// NOAA weather channel poll interval (500 ms)
pub const NOAA_POLL_10MS: u16 = 50;

/// How long a received DTMF string stays on screen (6 s)
pub const DTMF_RX_LIVE_10MS: u16 = 600;

/// Menu inactivity timeout (30 s in 500 ms ticks)
pub const MENU_TIMEOUT_500MS: u16 = 60;

/// Delay before dual watch returns to the home VFO (2.5 s)
pub const VFO_RESUME_500MS: u16 = 5;

/// Guard after the last serial configuration frame (6 s)
pub const SERIAL_CONFIG_GUARD_500MS: u16 = 12;

/// Slow ticks per configured transmit-timeout minute
pub const TX_TIMEOUT_500MS_PER_MINUTE: u16 = 120;

/// Slow ticks of uninterrupted low battery before escalation (15 s)
pub const LOW_BATTERY_PERIOD: u8 = 30;

/// Battery current above this many raw units means USB-C charging
pub const CHARGING_CURRENT_THRESHOLD: u16 = 500;

/// Reference the calibration factor is scaled against
pub const BATTERY_CALIBRATION_REFERENCE: u32 = 760;

/// Scaled battery voltage above which the pack reads as overvoltage
pub const BATTERY_OVERVOLTAGE: u16 = 890;

/// Scaled battery voltage below which the pack reads as critical
pub const BATTERY_CRITICAL: u16 = 630;

/// Settle time after dropping the audio path in the alarm sequence
pub const ALARM_PATH_SETTLE_US: u32 = 20_000;

/// Short gap between tone start and audio path restore
pub const ALARM_TONE_GAP_US: u32 = 2_000;

/// Time for the speaker amplifier to come up before unmuting
pub const ALARM_SPEAKER_SETTLE_US: u32 = 60_000;

/// Base alarm tone frequency
pub const ALARM_TONE_HZ: u16 = 500;

/// Highest frequency of the alarm sweep
pub const ALARM_SWEEP_MAX_HZ: u16 = 1500;

/// Alarm sweep step per fast tick
pub const ALARM_SWEEP_STEP_HZ: u16 = 25;

/// Fast ticks per phase of a tone-only alarm
pub const ALARM_PHASE_TICKS: u16 = 512;

/// Repeater access tone
pub const TONE_1750_HZ: u16 = 1750;

/// Phase-reversal tone sent for repeater tail elimination
pub const TAIL_TONE_HZ: u16 = 55;

/// Backlight setting that means "always on"
pub const BACKLIGHT_ALWAYS_ON: u8 = 7;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the schematic

    /// Audio amplifier path switch
    pub const AUDIO_PATH: &str = "PC4";

    /// Red transmit indicator LED
    pub const TX_INDICATOR: &str = "PB0";

    /// LCD backlight enable
    pub const BACKLIGHT: &str = "PB6";

    /// PTT input (active low)
    pub const PTT_IN: &str = "PA3";

    /// Battery voltage divider ADC input
    pub const BATTERY_VOLTAGE: &str = "PA0";

    /// Charger current sense ADC input
    pub const BATTERY_CURRENT: &str = "PA1";
}

/// Timer assignments
pub mod timers {
    //! Hardware timer assignments

    /// Scheduler tick (core SysTick, 10 ms reload)
    pub const SCHEDULER: &str = "SysTick";

    /// Embassy time driver
    pub const EMBASSY_TIME: u8 = 2;
}

/// Snapshot of the persistent configuration store
///
/// Loaded once at boot; the core only reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Battery ADC calibration points; index 3 scales the voltage reading
    pub battery_calibration: [u16; 6],
    /// Battery chemistry selecting the discharge curve
    pub battery_type: BatteryType,
    /// Battery-save setting, sleep period is this value times 100 ms (0 = off)
    pub battery_save: u8,
    /// Backlight timeout setting, [`BACKLIGHT_ALWAYS_ON`] keeps it lit
    pub backlight_time: u8,
    /// Transmit timeout in minutes (0 = no limit)
    pub tx_timeout_minutes: u8,
    /// Alarm key behavior
    pub alarm_mode: AlarmMode,
    /// Global scrambler enable
    pub scramble_enabled: bool,
    /// Minutes before a DTMF call state resets itself
    pub dtmf_auto_reset_minutes: u8,
    /// Dual watch enabled
    pub dual_watch: bool,
    /// Voice-operated transmit enabled
    pub vox: bool,
    /// Repeater tail elimination length in 100 ms units (0 = off)
    pub repeater_tail_elimination: u8,
    /// Channel data for VFO A and B
    pub vfos: [VfoInfo; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            battery_calibration: [1540, 1629, 1700, 1750, 1800, 2300],
            battery_type: BatteryType::Mah1600,
            battery_save: 4,
            backlight_time: 3,
            tx_timeout_minutes: 1,
            alarm_mode: AlarmMode::Site,
            scramble_enabled: true,
            dtmf_auto_reset_minutes: 5,
            dual_watch: false,
            vox: false,
            repeater_tail_elimination: 0,
            vfos: [
                VfoInfo::new(DEFAULT_VFO_A),
                VfoInfo::new(DEFAULT_VFO_B),
            ],
        }
    }
}

impl Settings {
    /// Calibration factor applied to the averaged battery reading
    #[must_use]
    pub const fn battery_calibration_factor(&self) -> u16 {
        self.battery_calibration[3]
    }

    /// Whether power save may be entered at all
    #[must_use]
    pub const fn battery_save_enabled(&self) -> bool {
        self.battery_save > 0
    }

    /// Whether the backlight must never be switched off
    #[must_use]
    pub const fn backlight_always_on(&self) -> bool {
        self.backlight_time >= BACKLIGHT_ALWAYS_ON
    }
}

/// Optional subsystems present in this build
///
/// A disabled capability turns the behaviors that depend on it into no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Voice prompt playback
    pub voice: bool,
    /// Auxiliary FM broadcast receiver
    pub fm_radio: bool,
    /// NOAA weather channel monitoring
    pub noaa: bool,
    /// Alarm and 1750 Hz keys
    pub alarm: bool,
    /// DTMF calling and replies
    pub dtmf_calling: bool,
}

impl Capabilities {
    /// Everything enabled
    pub const FULL: Self = Self {
        voice: true,
        fm_radio: true,
        noaa: true,
        alarm: true,
        dtmf_calling: true,
    };

    /// Nothing optional
    pub const MINIMAL: Self = Self {
        voice: false,
        fm_radio: false,
        noaa: false,
        alarm: false,
        dtmf_calling: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// Default VFO A frequency (446.00625 MHz, PMR channel 1)
pub const DEFAULT_VFO_A: Frequency = checked_frequency(446_006_250);

/// Default VFO B frequency (145.500 MHz, 2 m calling)
pub const DEFAULT_VFO_B: Frequency = checked_frequency(145_500_000);

// Evaluated at compile time only.
const fn checked_frequency(hz: u32) -> Frequency {
    match Frequency::from_hz(hz) {
        Some(freq) => freq,
        None => panic!("default frequency out of range"),
    }
}
