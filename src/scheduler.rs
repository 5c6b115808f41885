//! Cooperative Scheduler
//!
//! All process-wide scheduler state lives in one [`Context`] owned by the
//! dispatch loop and passed by reference to every behavior.

pub mod countdown;
pub mod dispatch;
pub mod flags;

use crate::config::{Capabilities, Settings};
use crate::power::BatteryMonitor;
use crate::radio::alarm::Alarm;
use crate::radio::dtmf::DtmfState;
use crate::radio::function::FunctionStateMachine;
use crate::radio::state::RadioState;
use crate::types::FunctionState;

use countdown::CountdownRegistry;
use flags::ScheduleFlags;

/// Scheduler context
#[derive(Clone, Debug)]
pub struct Context {
    /// Countdowns and their expiry signals
    pub countdowns: CountdownRegistry,
    /// One-shot requests for the UI and the core
    pub flags: ScheduleFlags,
    /// Active operating mode
    pub function: FunctionStateMachine,
    /// Receiver-side state
    pub radio: RadioState,
    /// Alarm sequencing
    pub alarm: Alarm,
    /// DTMF calling
    pub dtmf: DtmfState,
    /// Battery monitor
    pub battery: BatteryMonitor,
    /// Persistent configuration snapshot
    pub settings: Settings,
    /// Optional subsystems of this build
    pub capabilities: Capabilities,
}

impl Context {
    /// Create a context in its boot state
    #[must_use]
    pub fn new(settings: Settings, capabilities: Capabilities) -> Self {
        Self {
            countdowns: CountdownRegistry::new(),
            flags: ScheduleFlags::new(),
            function: FunctionStateMachine::new(),
            radio: RadioState::new(&settings),
            alarm: Alarm::new(),
            dtmf: DtmfState::new(),
            battery: BatteryMonitor::new(
                settings.battery_type,
                settings.battery_calibration_factor(),
            ),
            settings,
            capabilities,
        }
    }

    /// Reset counters, flags and mode to their defaults (mode = Foreground)
    ///
    /// Battery history survives; settings and capabilities are kept.
    pub fn init(&mut self) {
        self.countdowns.reset();
        self.flags.reset();
        self.function.reset();
        self.radio = RadioState::new(&self.settings);
        self.alarm.reset();
        self.dtmf.reset();
    }

    /// Read-only view of the active mode
    #[must_use]
    pub const fn function(&self) -> FunctionState {
        self.function.current()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Settings::default(), Capabilities::default())
    }
}
