//! Alarm Sequencing
//!
//! The alarm key keys the transmitter with a sweeping tone; the 1750 key
//! sends a steady repeater access tone. In tone-only alarm mode the alarm
//! alternates every [`ALARM_PHASE_TICKS`] between sounding locally and
//! transmitting.

use crate::config::{
    ALARM_PHASE_TICKS, ALARM_SWEEP_MAX_HZ, ALARM_SWEEP_STEP_HZ, ALARM_TONE_GAP_US, ALARM_TONE_HZ,
};
use crate::drivers::{set_pin, Board, Display, Transceiver};
use crate::radio::transmit::{end_transmission, request_transmit, TxRequest};
use crate::scheduler::Context;
use crate::types::{AlarmMode, AlarmState, FunctionState};
use embedded_hal::delay::DelayNs;

/// Alarm state and tone sweep position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Alarm {
    state: AlarmState,
    tone_counter: u16,
    tone_hz: u16,
}

impl Alarm {
    /// No alarm
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AlarmState::Off,
            tone_counter: 0,
            tone_hz: ALARM_TONE_HZ,
        }
    }

    /// Current alarm state
    #[must_use]
    pub const fn state(&self) -> AlarmState {
        self.state
    }

    /// Whether any alarm or 1750 burst is in progress
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.state, AlarmState::Off)
    }

    /// Fast ticks into the current alarm phase
    #[must_use]
    pub const fn tone_counter(&self) -> u16 {
        self.tone_counter
    }

    /// Current sweep frequency
    #[must_use]
    pub const fn tone_hz(&self) -> u16 {
        self.tone_hz
    }

    /// Change the alarm state
    pub fn set_state(&mut self, state: AlarmState) {
        self.state = state;
    }

    /// Restart the phase counter
    pub fn reset_tone_counter(&mut self) {
        self.tone_counter = 0;
    }

    /// Advance the sweep by one step, wrapping back to the base tone
    pub fn step_sweep(&mut self) -> u16 {
        self.tone_hz += ALARM_SWEEP_STEP_HZ;
        if self.tone_hz > ALARM_SWEEP_MAX_HZ {
            self.tone_hz = ALARM_TONE_HZ;
        }
        self.tone_hz
    }

    /// Back to no alarm
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new()
    }
}

/// Alarm or 1750 key pressed
///
/// `kind` is [`AlarmState::TxAlarm`] or [`AlarmState::Tx1750`].
pub fn start<B: Board>(ctx: &mut Context, board: &mut B, kind: AlarmState) {
    if !ctx.capabilities.alarm || ctx.alarm.is_active() {
        return;
    }
    ctx.alarm.set_state(kind);
    ctx.alarm.tone_hz = ALARM_TONE_HZ;
    info!("alarm: {:?}", kind);
    if let TxRequest::Refused(reason) = request_transmit(ctx, board) {
        warn!("alarm: transmit refused ({:?})", reason);
        ctx.alarm.reset();
    }
}

/// Alarm key released: stop sounding and unkey
pub fn stop<B: Board>(ctx: &mut Context, board: &mut B) {
    if !ctx.alarm.is_active() {
        return;
    }
    ctx.alarm.reset();
    end_transmission(ctx, board);
}

/// Per fast tick: sweep the alarm tone and switch tone-only phases
pub fn time_slice_10ms<B: Board>(ctx: &mut Context, board: &mut B) {
    if !matches!(ctx.alarm.state, AlarmState::TxAlarm | AlarmState::Alarm) {
        return;
    }
    if !ctx.function.is(FunctionState::Transmit) {
        return;
    }

    let hz = ctx.alarm.step_sweep();
    board.rf().set_tone_frequency(hz);

    ctx.alarm.tone_counter = ctx.alarm.tone_counter.saturating_add(1);
    if ctx.settings.alarm_mode != AlarmMode::Tone || ctx.alarm.tone_counter < ALARM_PHASE_TICKS {
        return;
    }
    ctx.alarm.tone_counter = 0;

    if ctx.alarm.state == AlarmState::TxAlarm {
        debug!("alarm: local phase");
        ctx.alarm.state = AlarmState::Alarm;
        set_pin(board.tx_indicator(), false);
        board.display().redraw();
    } else {
        debug!("alarm: transmit phase");
        ctx.alarm.state = AlarmState::TxAlarm;
        board.display().redraw();
        set_pin(board.tx_indicator(), true);
        let vfo = *ctx.radio.tx_vfo();
        board.rf().program_transmit(&vfo);
        board.rf().transmit_tone(ALARM_TONE_HZ);
        board.delay().delay_us(ALARM_TONE_GAP_US);
        set_pin(board.audio_path(), true);
        ctx.radio.speaker_enabled = true;
    }
}
