//! Power Management
//!
//! Battery voltage averaging, discrete charge level, charger detection and
//! the low-battery escalation that can force the radio into power save.
//!
//! [`BatteryMonitor`] is pure state: every evaluation returns the
//! [`BatteryAction`]s the caller must apply to the board.

use heapless::Vec;

use crate::config::{
    BATTERY_CALIBRATION_REFERENCE, BATTERY_CRITICAL, BATTERY_OVERVOLTAGE,
    CHARGING_CURRENT_THRESHOLD, LOW_BATTERY_PERIOD,
};
use crate::drivers::BatterySample;
use crate::types::{Beep, FunctionState, VoicePrompt};

/// Fixed-point scale used for curve interpolation
const INTERPOLATION_SCALE: i64 = 1000;

/// Percent thresholds promoting the level to 6, 5, 4, 3 and 2
const LEVEL_THRESHOLDS: [(u8, u8); 5] = [(88, 6), (65, 5), (41, 4), (17, 3), (5, 2)];

/// Highest level, the pack is above its rated voltage
pub const LEVEL_OVERVOLTAGE: u8 = 7;

/// Lowest level, the pack is about to brown out
pub const LEVEL_CRITICAL: u8 = 0;

/// One point of a discharge curve
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Breakpoint {
    /// Scaled battery voltage (10 mV units)
    pub voltage: u16,
    /// Remaining charge at that voltage
    pub percent: u8,
}

impl Breakpoint {
    /// Create a breakpoint
    #[must_use]
    pub const fn new(voltage: u16, percent: u8) -> Self {
        Self { voltage, percent }
    }
}

/// Discharge curve of the 1600 mAh pack, highest voltage first, `(0, 0)` terminated
pub const CURVE_1600_MAH: [Breakpoint; 6] = [
    Breakpoint::new(828, 100),
    Breakpoint::new(814, 97),
    Breakpoint::new(760, 25),
    Breakpoint::new(729, 6),
    Breakpoint::new(630, 0),
    Breakpoint::new(0, 0),
];

/// Discharge curve of the 2200 mAh pack, highest voltage first, `(0, 0)` terminated
pub const CURVE_2200_MAH: [Breakpoint; 7] = [
    Breakpoint::new(832, 100),
    Breakpoint::new(813, 95),
    Breakpoint::new(740, 60),
    Breakpoint::new(707, 21),
    Breakpoint::new(682, 5),
    Breakpoint::new(630, 0),
    Breakpoint::new(0, 0),
];

/// Battery chemistry, selects the discharge curve
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BatteryType {
    /// Stock 1600 mAh pack
    #[default]
    Mah1600,
    /// Extended 2200 mAh pack
    Mah2200,
    /// Caller-supplied curve, same ordering rules as the built-in ones
    Custom(&'static [Breakpoint]),
}

impl BatteryType {
    /// Discharge curve for this chemistry
    #[must_use]
    pub const fn curve(self) -> &'static [Breakpoint] {
        match self {
            Self::Mah1600 => &CURVE_1600_MAH,
            Self::Mah2200 => &CURVE_2200_MAH,
            Self::Custom(curve) => curve,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for BatteryType {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Mah1600 => defmt::write!(f, "1600mAh"),
            Self::Mah2200 => defmt::write!(f, "2200mAh"),
            Self::Custom(curve) => defmt::write!(f, "custom({})", curve.len()),
        }
    }
}

/// Remaining charge in percent for a scaled battery voltage
///
/// Finds the first breakpoint strictly below `voltage` and interpolates
/// between it and the breakpoint above. Voltages above the curve clamp to
/// 100, voltages at or below the last real breakpoint give 0.
#[must_use]
pub fn volts_to_percent(curve: &[Breakpoint], voltage: u16) -> u8 {
    for pair in curve.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        if voltage > lower.voltage {
            return interpolate(upper, lower, voltage);
        }
    }
    0
}

fn interpolate(upper: Breakpoint, lower: Breakpoint, voltage: u16) -> u8 {
    let span = i64::from(upper.voltage) - i64::from(lower.voltage);
    if span <= 0 {
        return lower.percent.min(100);
    }
    let rise = i64::from(upper.percent) - i64::from(lower.percent);
    let offset = i64::from(voltage) - i64::from(lower.voltage);
    let scaled = offset * rise * INTERPOLATION_SCALE / span;
    let percent = i64::from(lower.percent) + scaled / INTERPOLATION_SCALE;
    // Clamped to 0..=100, so the narrowing cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = percent.clamp(0, 100) as u8;
    percent
}

/// Discrete battery level (0..=7) for a scaled voltage
#[must_use]
pub fn level_for_voltage(curve: &[Breakpoint], voltage: u16) -> u8 {
    if voltage > BATTERY_OVERVOLTAGE {
        return LEVEL_OVERVOLTAGE;
    }
    if voltage < BATTERY_CRITICAL {
        return LEVEL_CRITICAL;
    }
    let percent = volts_to_percent(curve, voltage);
    LEVEL_THRESHOLDS
        .iter()
        .find(|(threshold, _)| percent > *threshold)
        .map_or(1, |&(_, level)| level)
}

/// Stage of the low-battery escalation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum LowBatteryStatus {
    /// Level is fine
    #[default]
    Inactive,
    /// Level is low, observation window running
    Active,
    /// A full window elapsed and the user was warned
    Confirmed,
}

/// Side effect requested by the battery monitor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum BatteryAction {
    /// Redraw status bar and display
    RefreshStatus,
    /// Redraw the display
    RefreshDisplay,
    /// Switch the backlight on
    BacklightOn,
    /// Redraw the battery indicator
    DrawIcon {
        /// Level to draw
        level: u8,
        /// Blink phase
        blink: bool,
    },
    /// Play a beep
    Beep(Beep),
    /// Speak a voice prompt
    Announce(VoicePrompt),
    /// Critical battery: reduced service, power save, display reset
    EnterReducedService {
        /// Switch the backlight off as well
        backlight_off: bool,
    },
}

/// Actions produced by one battery evaluation
pub type BatteryActions = Vec<BatteryAction, 6>;

fn emit(actions: &mut BatteryActions, action: BatteryAction) {
    if actions.push(action).is_err() {
        warn!("battery: action {:?} dropped", action);
    }
}

/// Battery voltage averaging and low-battery escalation
#[derive(Clone, Debug)]
pub struct BatteryMonitor {
    /// Ring of the four most recent raw voltage samples
    samples: [u16; 4],
    /// Slot the next sample overwrites
    next_sample: usize,
    /// Most recent raw charge current
    current: u16,
    /// Calibration factor (settings index 3)
    calibration: u16,
    /// Chemistry selecting the discharge curve
    battery_type: BatteryType,
    /// Calibration-scaled average voltage
    voltage: u16,
    /// Discrete level, None before the first evaluation
    level: Option<u8>,
    /// Charging over USB-C
    charging: bool,
    /// Low battery observed
    low_active: bool,
    /// User has been warned after a full window
    low_confirmed: bool,
    /// Indicator blink phase
    blink: bool,
    /// Slow ticks into the current observation window
    period_counter: u8,
}

impl BatteryMonitor {
    /// Create a monitor for `battery_type` with calibration factor `calibration`
    #[must_use]
    pub const fn new(battery_type: BatteryType, calibration: u16) -> Self {
        Self {
            samples: [0; 4],
            next_sample: 0,
            current: 0,
            calibration,
            battery_type,
            voltage: 0,
            level: None,
            charging: false,
            low_active: false,
            low_confirmed: false,
            blink: false,
            period_counter: 0,
        }
    }

    /// Fill the whole ring with one sample (boot, before averaging makes sense)
    pub fn prime(&mut self, sample: BatterySample) {
        self.samples = [sample.voltage; 4];
        self.next_sample = 0;
        self.current = sample.current;
    }

    /// Store a fresh sample, overwriting the oldest voltage
    pub fn record_sample(&mut self, sample: BatterySample) {
        self.samples[self.next_sample] = sample.voltage;
        self.next_sample = (self.next_sample + 1) % self.samples.len();
        self.current = sample.current;
    }

    /// Average of the four most recent raw voltage samples
    #[must_use]
    pub fn average_raw(&self) -> u16 {
        let sum: u32 = self.samples.iter().map(|&s| u32::from(s)).sum();
        // Mean of four u16 values fits in u16.
        #[allow(clippy::cast_possible_truncation)]
        let average = (sum / 4) as u16;
        average
    }

    /// Calibration-scaled voltage from the last evaluation (10 mV units)
    #[must_use]
    pub const fn voltage(&self) -> u16 {
        self.voltage
    }

    /// Discrete level from the last evaluation (0 before the first one)
    #[must_use]
    pub fn level(&self) -> u8 {
        self.level.unwrap_or(LEVEL_CRITICAL)
    }

    /// Remaining charge in percent from the last evaluation
    #[must_use]
    pub fn percent(&self) -> u8 {
        volts_to_percent(self.battery_type.curve(), self.voltage)
    }

    /// Charging over USB-C
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        self.charging
    }

    /// Indicator blink phase
    #[must_use]
    pub const fn blink(&self) -> bool {
        self.blink
    }

    /// Slow ticks into the current observation window
    #[must_use]
    pub const fn period_counter(&self) -> u8 {
        self.period_counter
    }

    /// Low-battery flag raised by the last level change
    #[must_use]
    pub const fn is_low(&self) -> bool {
        self.low_active
    }

    /// Whether the user was warned after a full observation window
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.low_confirmed
    }

    /// Escalation stage
    #[must_use]
    pub const fn low_battery_status(&self) -> LowBatteryStatus {
        match (self.low_active, self.low_confirmed) {
            (false, _) => LowBatteryStatus::Inactive,
            (true, false) => LowBatteryStatus::Active,
            (true, true) => LowBatteryStatus::Confirmed,
        }
    }

    fn scaled_voltage(&self) -> u16 {
        let calibration = match self.calibration {
            0 => BATTERY_CALIBRATION_REFERENCE,
            factor => u32::from(factor),
        };
        let scaled = u32::from(self.average_raw()) * BATTERY_CALIBRATION_REFERENCE / calibration;
        u16::try_from(scaled).unwrap_or(u16::MAX)
    }

    /// Re-evaluate voltage, level and charging from the sample ring
    pub fn get_readings(&mut self) -> BatteryActions {
        let mut actions = BatteryActions::new();
        let previous_level = self.level;

        self.voltage = self.scaled_voltage();
        let level = level_for_voltage(self.battery_type.curve(), self.voltage);
        self.level = Some(level);

        let charging = self.current > CHARGING_CURRENT_THRESHOLD;
        if charging != self.charging {
            emit(&mut actions, BatteryAction::RefreshStatus);
            if charging {
                emit(&mut actions, BatteryAction::BacklightOn);
            }
            info!("battery: charging {}", charging);
            self.charging = charging;
            self.period_counter = 0;
        }

        if previous_level != Some(level) {
            info!("battery: level {} ({} x10mV)", level, self.voltage);
            match level {
                3.. => self.low_confirmed = false,
                0 | 1 => self.low_active = true,
                2 => {
                    self.low_active = false;
                    if !self.low_confirmed {
                        emit(&mut actions, BatteryAction::DrawIcon {
                            level,
                            blink: self.blink,
                        });
                    }
                }
            }
            if !self.low_confirmed {
                emit(&mut actions, BatteryAction::RefreshDisplay);
            }
            self.period_counter = 0;
        }

        actions
    }

    /// Advance the low-battery observation window by one slow tick
    ///
    /// `function` is the active mode; escalation pauses while transmitting.
    pub fn time_slice_500ms(
        &mut self,
        function: FunctionState,
        backlight_always_on: bool,
    ) -> BatteryActions {
        let mut actions = BatteryActions::new();
        if !self.low_active {
            return actions;
        }

        self.period_counter = self.period_counter.saturating_add(1);
        self.blink = self.period_counter & 1 == 1;
        emit(&mut actions, BatteryAction::DrawIcon {
            level: self.level(),
            blink: self.blink,
        });

        if function == FunctionState::Transmit {
            return actions;
        }

        if self.period_counter < LOW_BATTERY_PERIOD {
            if self.period_counter == LOW_BATTERY_PERIOD - 1
                && !self.charging
                && !self.low_confirmed
            {
                emit(&mut actions, BatteryAction::Beep(Beep::DoubleBeep500Hz));
            }
            return actions;
        }

        self.period_counter = 0;
        if self.charging {
            return actions;
        }

        if !self.low_confirmed {
            emit(&mut actions, BatteryAction::Beep(Beep::DoubleBeep500Hz));
            emit(&mut actions, BatteryAction::Announce(VoicePrompt::LowVoltage));
            self.low_confirmed = true;
        }

        if self.level() != LEVEL_CRITICAL {
            emit(&mut actions, BatteryAction::Announce(VoicePrompt::BatteryLow));
            return actions;
        }

        warn!("battery: critical, entering reduced service");
        emit(&mut actions, BatteryAction::Announce(VoicePrompt::BatteryCritical));
        emit(&mut actions, BatteryAction::EnterReducedService {
            backlight_off: !backlight_always_on,
        });
        actions
    }
}
