//! Transmit Control
//!
//! Keying and unkeying the transmitter around the function state machine:
//! policy checks before a transmission starts, the transmit timeout, and
//! the optional repeater tail tone before returning to receive.

use crate::config::{DUAL_WATCH_AFTER_TX_10MS, TAIL_TONE_HZ, TX_TIMEOUT_500MS_PER_MINUTE};
use crate::drivers::{set_pin, Announcer, Board, Transceiver};
use crate::radio::function::select;
use crate::radio::receive::hold_dual_watch;
use crate::scheduler::countdown::CountdownId;
use crate::scheduler::flags::ScheduleFlag;
use crate::scheduler::Context;
use crate::types::{Beep, FunctionState};

/// Why a transmit request was turned down
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum TxRefusal {
    /// Battery critical, reduced service
    ReducedService,
    /// A serial configuration session is active
    SerialConfig,
    /// Already transmitting
    Busy,
}

/// Result of [`request_transmit`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum TxRequest {
    /// Transmitter keyed
    Started,
    /// Request turned down, mode unchanged
    Refused(TxRefusal),
}

/// Transmit time limit in slow ticks for the configured minutes (0 = none)
#[must_use]
pub const fn tx_timeout_ticks(minutes: u8) -> u16 {
    minutes as u16 * TX_TIMEOUT_500MS_PER_MINUTE
}

/// Key the transmitter if policy allows it
pub fn request_transmit<B: Board>(ctx: &mut Context, board: &mut B) -> TxRequest {
    let refusal = if ctx.radio.reduced_service {
        Some(TxRefusal::ReducedService)
    } else if ctx.countdowns.is_active(CountdownId::SerialConfigGuard) {
        Some(TxRefusal::SerialConfig)
    } else if ctx.function.is(FunctionState::Transmit) {
        Some(TxRefusal::Busy)
    } else {
        None
    };

    if let Some(reason) = refusal {
        warn!("transmit: refused ({:?})", reason);
        if reason != TxRefusal::Busy {
            board.announcer().beep(Beep::Error);
        }
        return TxRequest::Refused(reason);
    }

    ctx.radio.tx_timed_out = false;
    ctx.countdowns.disarm(CountdownId::TailTone);
    ctx.countdowns.clear_expired(CountdownId::TxTimeout);
    ctx.countdowns.arm(
        CountdownId::TxTimeout,
        tx_timeout_ticks(ctx.settings.tx_timeout_minutes),
    );
    select(ctx, board, FunctionState::Transmit);
    TxRequest::Started
}

/// PTT released (or timeout): start unkeying
///
/// With repeater tail elimination configured the tail tone is sent first
/// and [`finish_transmission`] runs when it expires.
pub fn end_transmission<B: Board>(ctx: &mut Context, board: &mut B) {
    if !ctx.function.is(FunctionState::Transmit) {
        return;
    }
    if ctx.countdowns.is_active(CountdownId::TailTone) {
        return;
    }

    ctx.countdowns.disarm(CountdownId::TxTimeout);
    board.rf().send_end_of_transmission();

    let tail = u16::from(ctx.settings.repeater_tail_elimination) * 10;
    if tail > 0 {
        board.rf().transmit_tone(TAIL_TONE_HZ);
        ctx.countdowns.arm(CountdownId::TailTone, tail);
        return;
    }

    finish_transmission(ctx, board);
}

/// Unkey and return to idle
pub fn finish_transmission<B: Board>(ctx: &mut Context, board: &mut B) {
    set_pin(board.tx_indicator(), false);
    select(ctx, board, FunctionState::Foreground);
    hold_dual_watch(ctx, DUAL_WATCH_AFTER_TX_10MS);
    ctx.flags.raise(ScheduleFlag::UpdateDisplay);
}

/// Tail tone countdown expired
pub fn tail_tone_expired<B: Board>(ctx: &mut Context, board: &mut B) {
    if ctx.function.is(FunctionState::Transmit) {
        finish_transmission(ctx, board);
    }
}

/// Transmit time limit reached
pub fn tx_timeout_expired<B: Board>(ctx: &mut Context, board: &mut B) {
    if !ctx.function.is(FunctionState::Transmit) {
        return;
    }
    warn!("transmit: timeout");
    ctx.radio.tx_timed_out = true;
    ctx.alarm.reset();
    end_transmission(ctx, board);
    board.announcer().beep(Beep::TripleBeep880Hz);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_scales_with_minutes() {
        assert_eq!(tx_timeout_ticks(0), 0);
        assert_eq!(tx_timeout_ticks(1), 120);
        assert_eq!(tx_timeout_ticks(15), 1800);
    }
}
