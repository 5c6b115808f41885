//! Radio State
//!
//! Receiver-side state the function state machine and the dispatch
//! behaviors read and update: VFO data, which VFO is listening, the
//! receiver idle flag and the auxiliary modes that block power save.

use crate::config::Settings;
use crate::types::{Screen, VfoInfo, VfoSlot};

/// Mutable radio state owned by the scheduler context
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RadioState {
    /// Channel data for VFO A and B
    vfos: [VfoInfo; 2],
    /// VFO the user selected; transmissions use it
    pub home_vfo: VfoSlot,
    /// VFO the receiver is currently tuned to
    pub rx_vfo: VfoSlot,
    /// Receiver powered down by power save
    pub rx_idle: bool,
    /// Speaker amplifier enabled
    pub speaker_enabled: bool,
    /// Auxiliary FM broadcast receiver in use
    pub fm_mode: bool,
    /// Scanner running
    pub scanning: bool,
    /// NOAA weather monitoring running
    pub noaa_mode: bool,
    /// Critical battery: only power save and listening remain
    pub reduced_service: bool,
    /// Screen currently shown
    pub screen: Screen,
    /// Last transmission was cut by the TX timeout
    pub tx_timed_out: bool,
}

impl RadioState {
    /// Create the boot state from settings
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            vfos: settings.vfos,
            home_vfo: VfoSlot::A,
            rx_vfo: VfoSlot::A,
            rx_idle: false,
            speaker_enabled: false,
            fm_mode: false,
            scanning: false,
            noaa_mode: false,
            reduced_service: false,
            screen: Screen::Main,
            tx_timed_out: false,
        }
    }

    /// Channel data of one VFO
    #[must_use]
    pub const fn vfo(&self, slot: VfoSlot) -> &VfoInfo {
        &self.vfos[slot.index()]
    }

    /// Mutable channel data of one VFO
    pub fn vfo_mut(&mut self, slot: VfoSlot) -> &mut VfoInfo {
        &mut self.vfos[slot.index()]
    }

    /// Channel data transmissions use
    #[must_use]
    pub const fn tx_vfo(&self) -> &VfoInfo {
        self.vfo(self.home_vfo)
    }

    /// Forget the signal-strength bars of both VFOs
    pub fn clear_rssi_history(&mut self) {
        for vfo in &mut self.vfos {
            vfo.rssi_level = 0;
        }
    }

    /// Point the receiver at the other VFO, returns the new one
    pub fn toggle_rx_vfo(&mut self) -> VfoSlot {
        self.rx_vfo = self.rx_vfo.other();
        self.rx_vfo
    }

    /// Whether the receiver listens somewhere other than the home VFO
    #[must_use]
    pub fn is_away_from_home(&self) -> bool {
        self.rx_vfo != self.home_vfo
    }
}

impl Default for RadioState {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for RadioState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Radio(rx={}, idle={}, screen={})",
            self.rx_vfo,
            self.rx_idle,
            self.screen
        );
    }
}
