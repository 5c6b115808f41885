//! Function State Machine
//!
//! Single owner of the operating mode that controls the RF/audio front end.
//! [`select`] is the only way to change it: it records the previous mode,
//! wakes the receiver when leaving power save, runs the entry action of the
//! new mode and, when that action asks for it, the shared epilogue that
//! rearms the idle countdown.
//!
//! This module also owns the two countdowns tied to power save:
//! [`CountdownId::BatterySave`] (idle detection) and
//! [`CountdownId::PowerSaveCycle`] (sleep/listen duty cycle).

use crate::config::{
    ALARM_PATH_SETTLE_US, ALARM_SPEAKER_SETTLE_US, ALARM_TONE_GAP_US, ALARM_TONE_HZ,
    BATTERY_SAVE_IDLE_10MS, FM_RESTORE_10MS, POWER_SAVE_LISTEN_10MS, TONE_1750_HZ,
};
use crate::drivers::{set_pin, Board, Display, FmReceiver, Transceiver};
use crate::scheduler::countdown::CountdownId;
use crate::scheduler::flags::ScheduleFlag;
use crate::scheduler::Context;
use crate::types::{AlarmMode, AlarmState, DtmfReply, FunctionState, Screen};
use embedded_hal::delay::DelayNs;

/// Current and previous operating mode
///
/// Read-only outside the crate; [`select`] and [`Context::init`] are the
/// only writers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionStateMachine {
    current: FunctionState,
    previous: FunctionState,
}

impl FunctionStateMachine {
    /// Start in [`FunctionState::Foreground`]
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            current: FunctionState::Foreground,
            previous: FunctionState::Foreground,
        }
    }

    /// Mode that currently owns the hardware
    #[must_use]
    pub const fn current(&self) -> FunctionState {
        self.current
    }

    /// Mode before the last [`select`]
    #[must_use]
    pub const fn previous(&self) -> FunctionState {
        self.previous
    }

    /// Whether `state` is the active mode
    #[must_use]
    pub fn is(&self, state: FunctionState) -> bool {
        self.current == state
    }

    /// Back to boot state
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    fn enter(&mut self, next: FunctionState) -> FunctionState {
        self.previous = self.current;
        self.current = next;
        self.previous
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FunctionStateMachine {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Function({} <- {})", self.current, self.previous);
    }
}

/// Whether an entry action leaves the shared epilogue to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum Epilogue {
    /// Rearm the idle countdown, drop the power-save request, load FM restore
    Apply,
    /// The entry action manages its own countdowns
    Skip,
}

/// Outcome of one [`select`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub struct Transition {
    /// Mode that was active before
    pub previous: FunctionState,
    /// Mode now active
    pub next: FunctionState,
    /// Whether the shared epilogue ran
    pub epilogue: Epilogue,
    /// FM restore delay computed by the entry action
    ///
    /// Only applied when the epilogue runs. The one path that computes a
    /// nonzero value (Foreground after Receive in FM mode) skips the
    /// epilogue, so the value is reported here and not loaded.
    pub fm_restore_10ms: u16,
}

/// Make `next` the active mode
///
/// Leaving [`FunctionState::PowerSave`] powers the receiver back up before
/// the entry action of `next` touches the hardware.
pub fn select<B: Board>(ctx: &mut Context, board: &mut B, next: FunctionState) -> Transition {
    let previous = ctx.function.enter(next);

    if previous == FunctionState::PowerSave && next != FunctionState::PowerSave {
        wake_from_power_save(ctx, board);
    }

    let mut fm_restore_10ms = 0;
    let epilogue = match next {
        FunctionState::Foreground => {
            fm_restore_10ms = enter_foreground(ctx, board, previous);
            Epilogue::Skip
        }
        FunctionState::Receive | FunctionState::Monitor | FunctionState::Incoming => {
            Epilogue::Apply
        }
        FunctionState::PowerSave => {
            enter_power_save(ctx, board);
            Epilogue::Skip
        }
        FunctionState::Transmit => {
            enter_transmit(ctx, board);
            Epilogue::Apply
        }
    };

    if epilogue == Epilogue::Apply {
        ctx.countdowns.arm(CountdownId::BatterySave, BATTERY_SAVE_IDLE_10MS);
        ctx.flags.take(ScheduleFlag::SchedulePowerSave);
        ctx.countdowns.arm(CountdownId::FmRestore, fm_restore_10ms);
    }

    info!("function: {:?} -> {:?} ({:?})", previous, next, epilogue);

    Transition {
        previous,
        next,
        epilogue,
        fm_restore_10ms,
    }
}

fn wake_from_power_save<B: Board>(ctx: &mut Context, board: &mut B) {
    board.rf().wake_receiver();
    ctx.radio.rx_idle = false;
    board.display().draw_status();
}

fn enter_foreground<B: Board>(ctx: &mut Context, board: &mut B, previous: FunctionState) -> u16 {
    let mut fm_restore_10ms = 0;

    if ctx.dtmf.reply() != DtmfReply::None {
        board.rf().prepare_css_tx();
    }

    match previous {
        FunctionState::Transmit => {
            ctx.radio.clear_rssi_history();
            ctx.flags.raise(ScheduleFlag::UpdateStatus);
        }
        FunctionState::Receive => {
            if ctx.capabilities.fm_radio && ctx.radio.fm_mode {
                fm_restore_10ms = FM_RESTORE_10MS;
            }
            if ctx.capabilities.dtmf_calling && ctx.dtmf.call_state().in_progress() {
                let minutes = u16::from(ctx.settings.dtmf_auto_reset_minutes);
                ctx.countdowns
                    .arm(CountdownId::DtmfAutoReset, 1 + minutes * 2);
            }
            ctx.flags.raise(ScheduleFlag::UpdateStatus);
        }
        _ => {}
    }

    fm_restore_10ms
}

fn enter_power_save<B: Board>(ctx: &mut Context, board: &mut B) {
    ctx.countdowns
        .arm(CountdownId::PowerSaveCycle, power_save_sleep_10ms(ctx));
    ctx.radio.rx_idle = true;

    let rf = board.rf();
    rf.set_vox(false);
    rf.sleep();
    rf.set_aux_output(false);

    ctx.countdowns.clear_expired(CountdownId::PowerSaveCycle);
    ctx.radio.screen = Screen::Main;
    board.display().show(Screen::Main);
    ctx.flags.raise(ScheduleFlag::UpdateStatus);
}

fn enter_transmit<B: Board>(ctx: &mut Context, board: &mut B) {
    if ctx.capabilities.fm_radio && ctx.radio.fm_mode {
        board.fm().init_muted();
    }

    if ctx.alarm.state() == AlarmState::TxAlarm && ctx.settings.alarm_mode == AlarmMode::Tone {
        sound_local_alarm(ctx, board);
        return;
    }

    board.display().redraw();
    let vfo = *ctx.radio.tx_vfo();
    board.rf().program_transmit(&vfo);
    set_pin(board.tx_indicator(), true);

    if let Some(digits) = ctx.dtmf.take_reply() {
        board.rf().send_dtmf(&digits);
    }

    if ctx.alarm.is_active() {
        let tone = if ctx.alarm.state() == AlarmState::Tx1750 {
            TONE_1750_HZ
        } else {
            ALARM_TONE_HZ
        };
        board.rf().transmit_tone(tone);
        board.delay().delay_us(ALARM_TONE_GAP_US);
        set_pin(board.audio_path(), true);
        ctx.alarm.reset_tone_counter();
        ctx.radio.speaker_enabled = true;
        return;
    }

    let scrambler = if ctx.settings.scramble_enabled {
        vfo.scramble.chip_index()
    } else {
        None
    };
    board.rf().set_scrambler(scrambler);
}

fn sound_local_alarm<B: Board>(ctx: &mut Context, board: &mut B) {
    ctx.alarm.set_state(AlarmState::Alarm);
    board.display().redraw();
    set_pin(board.audio_path(), false);
    board.delay().delay_us(ALARM_PATH_SETTLE_US);
    board.rf().play_tone(ALARM_TONE_HZ);
    board.delay().delay_us(ALARM_TONE_GAP_US);
    set_pin(board.audio_path(), true);
    ctx.radio.speaker_enabled = true;
    board.delay().delay_us(ALARM_SPEAKER_SETTLE_US);
    board.rf().exit_tx_mute();
    ctx.alarm.reset_tone_counter();
}

fn power_save_sleep_10ms(ctx: &Context) -> u16 {
    u16::from(ctx.settings.battery_save) * 10
}

/// Restart idle detection (user activity, end of a mode)
pub fn rearm_idle_countdown(ctx: &mut Context) {
    ctx.countdowns
        .arm(CountdownId::BatterySave, BATTERY_SAVE_IDLE_10MS);
}

/// Whether nothing is going on that power save would interrupt
#[must_use]
pub fn is_idle(ctx: &Context) -> bool {
    ctx.function.is(FunctionState::Foreground)
        && ctx.radio.screen == Screen::Main
        && !ctx.radio.scanning
        && !ctx.radio.fm_mode
        && !ctx.radio.noaa_mode
        && !ctx.dtmf.call_state().in_progress()
        && !ctx.alarm.is_active()
        && ctx.settings.battery_save_enabled()
}

/// Act on a power-save request: sleep when idle, otherwise keep waiting
pub fn schedule_power_save<B: Board>(ctx: &mut Context, board: &mut B) {
    if is_idle(ctx) {
        select(ctx, board, FunctionState::PowerSave);
    } else {
        trace!("power save: busy, rearming idle countdown");
        rearm_idle_countdown(ctx);
    }
}

/// Alternate between the sleep and listen windows of power save
///
/// A stale expiry after power save was left is ignored.
pub fn power_save_cycle<B: Board>(ctx: &mut Context, board: &mut B) {
    if !ctx.function.is(FunctionState::PowerSave) {
        return;
    }

    if ctx.radio.rx_idle {
        board.rf().wake_receiver();
        ctx.radio.rx_idle = false;
        if ctx.settings.vox {
            board.rf().set_vox(true);
        }
        if ctx.settings.dual_watch {
            ctx.radio.toggle_rx_vfo();
            ctx.flags.raise(ScheduleFlag::ReconfigureVfos);
        }
        ctx.countdowns
            .arm(CountdownId::PowerSaveCycle, POWER_SAVE_LISTEN_10MS);
    } else {
        let rf = board.rf();
        rf.set_vox(false);
        rf.sleep();
        ctx.radio.rx_idle = true;
        ctx.countdowns
            .arm(CountdownId::PowerSaveCycle, power_save_sleep_10ms(ctx));
    }
}

/// Leave power save on user request (not while battery is critical)
pub fn wake_on_activity<B: Board>(ctx: &mut Context, board: &mut B) {
    if ctx.function.is(FunctionState::PowerSave) && !ctx.radio.reduced_service {
        select(ctx, board, FunctionState::Foreground);
    }
}
