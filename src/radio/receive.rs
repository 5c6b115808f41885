//! Receive Behaviors
//!
//! Squelch-driven mode changes and the receive-side countdowns: dual watch,
//! scan pause, VFO resume, NOAA polling and FM broadcast restore.
//!
//! Every expiry handler re-checks that its behavior still applies, since a
//! countdown keeps running when the mode that armed it is left.

use crate::config::{
    DUAL_WATCH_AFTER_RX_10MS, DUAL_WATCH_TOGGLE_10MS, NOAA_POLL_10MS, SCAN_PAUSE_10MS,
    VFO_RESUME_500MS,
};
use crate::drivers::{Board, FmReceiver};
use crate::radio::function::select;
use crate::scheduler::countdown::CountdownId;
use crate::scheduler::flags::ScheduleFlag;
use crate::scheduler::Context;
use crate::types::FunctionState;

/// Squelch opened: start listening (also wakes from power save)
pub fn squelch_opened<B: Board>(ctx: &mut Context, board: &mut B) {
    match ctx.function.current() {
        FunctionState::Foreground | FunctionState::PowerSave => {
            select(ctx, board, FunctionState::Incoming);
        }
        _ => {}
    }
}

/// Sub-audio or DTMF qualification passed: the call is for us
pub fn call_qualified<B: Board>(ctx: &mut Context, board: &mut B) {
    if ctx.function.is(FunctionState::Incoming) {
        select(ctx, board, FunctionState::Receive);
    }
}

/// Squelch closed: back to idle and hand over to the idle behaviors
pub fn squelch_closed<B: Board>(ctx: &mut Context, board: &mut B) {
    if !matches!(
        ctx.function.current(),
        FunctionState::Incoming | FunctionState::Receive
    ) {
        return;
    }

    select(ctx, board, FunctionState::Foreground);

    if ctx.radio.scanning {
        ctx.countdowns.arm(CountdownId::ScanPause, SCAN_PAUSE_10MS);
    }
    if ctx.settings.dual_watch {
        ctx.countdowns
            .arm(CountdownId::DualWatch, DUAL_WATCH_AFTER_RX_10MS);
        if ctx.radio.is_away_from_home() {
            ctx.countdowns.arm(CountdownId::VfoResume, VFO_RESUME_500MS);
        }
    }
}

/// Monitor key: force the squelch open, or close it again
pub fn toggle_monitor<B: Board>(ctx: &mut Context, board: &mut B) {
    match ctx.function.current() {
        FunctionState::Foreground => {
            select(ctx, board, FunctionState::Monitor);
        }
        FunctionState::Monitor => {
            select(ctx, board, FunctionState::Foreground);
        }
        _ => {}
    }
}

/// Start dual-watch alternation if it is configured
pub fn start_dual_watch(ctx: &mut Context) {
    if ctx.settings.dual_watch {
        ctx.countdowns
            .arm(CountdownId::DualWatch, DUAL_WATCH_TOGGLE_10MS);
    }
}

/// Hold dual watch on the current VFO for `ticks` fast ticks
pub fn hold_dual_watch(ctx: &mut Context, ticks: u16) {
    if ctx.settings.dual_watch {
        ctx.countdowns.arm(CountdownId::DualWatch, ticks);
    }
}

/// Dual-watch countdown expired: listen on the other VFO
///
/// Outside Foreground, or while scanning, the alternation only keeps
/// polling so it resumes once the radio is idle again.
pub fn dual_watch_expired(ctx: &mut Context) {
    if !ctx.settings.dual_watch {
        return;
    }
    if ctx.radio.scanning || !ctx.function.is(FunctionState::Foreground) {
        ctx.countdowns
            .arm(CountdownId::DualWatch, DUAL_WATCH_TOGGLE_10MS);
        return;
    }
    let slot = ctx.radio.toggle_rx_vfo();
    trace!("dual watch: listening on {:?}", slot);
    ctx.flags.raise(ScheduleFlag::ReconfigureVfos);
    ctx.countdowns
        .arm(CountdownId::DualWatch, DUAL_WATCH_TOGGLE_10MS);
}

/// VFO resume countdown expired: return the receiver to the home VFO
///
/// Dropped when a new call is in progress; the next squelch close rearms it.
pub fn vfo_resume_expired(ctx: &mut Context) {
    if !ctx.function.is(FunctionState::Foreground) || !ctx.radio.is_away_from_home() {
        return;
    }
    ctx.radio.rx_vfo = ctx.radio.home_vfo;
    ctx.flags.raise(ScheduleFlag::ReconfigureVfos);
}

/// Scan pause expired: the scanner may move on
pub fn scan_pause_expired(ctx: &mut Context) {
    if ctx.radio.scanning && ctx.function.is(FunctionState::Foreground) {
        ctx.flags.raise(ScheduleFlag::ScanNext);
    }
}

/// Begin polling the NOAA weather channels
pub fn start_noaa(ctx: &mut Context) {
    if ctx.capabilities.noaa && ctx.radio.noaa_mode {
        ctx.countdowns.arm(CountdownId::NoaaPoll, NOAA_POLL_10MS);
    }
}

/// NOAA poll expired: ask the monitor to check the next channel
pub fn noaa_poll_expired(ctx: &mut Context) {
    if !ctx.capabilities.noaa || !ctx.radio.noaa_mode {
        return;
    }
    if ctx.function.is(FunctionState::Foreground) {
        ctx.flags.raise(ScheduleFlag::NoaaStep);
    }
    ctx.countdowns.arm(CountdownId::NoaaPoll, NOAA_POLL_10MS);
}

/// FM restore expired: give the speaker back to the broadcast receiver
pub fn fm_restore_expired<B: Board>(ctx: &mut Context, board: &mut B) {
    if ctx.capabilities.fm_radio
        && ctx.radio.fm_mode
        && ctx.function.is(FunctionState::Foreground)
    {
        board.fm().resume();
    }
}
