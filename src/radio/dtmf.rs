//! DTMF Call State
//!
//! Call progress, the reply queued for the next transmission and the live
//! display of received digits.

use heapless::String;

use crate::config::DTMF_RX_LIVE_10MS;
use crate::scheduler::countdown::CountdownId;
use crate::scheduler::flags::ScheduleFlag;
use crate::scheduler::Context;
use crate::types::{DtmfCallState, DtmfReply};

/// Longest DTMF string kept for replies and the live display
pub const DTMF_MAX_DIGITS: usize = 16;

/// DTMF digits
pub type DtmfDigits = String<DTMF_MAX_DIGITS>;

/// DTMF calling state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DtmfState {
    call_state: DtmfCallState,
    reply: DtmfReply,
    reply_digits: DtmfDigits,
    live: DtmfDigits,
}

impl DtmfState {
    /// No call, nothing queued
    #[must_use]
    pub const fn new() -> Self {
        Self {
            call_state: DtmfCallState::None,
            reply: DtmfReply::None,
            reply_digits: String::new(),
            live: String::new(),
        }
    }

    /// Call progress
    #[must_use]
    pub const fn call_state(&self) -> DtmfCallState {
        self.call_state
    }

    /// Update call progress
    pub fn set_call_state(&mut self, state: DtmfCallState) {
        self.call_state = state;
    }

    /// Reply waiting for the next transmission
    #[must_use]
    pub const fn reply(&self) -> DtmfReply {
        self.reply
    }

    /// Queue `digits` to be sent when the transmitter next keys up
    ///
    /// Returns false if the string does not fit; nothing is queued then.
    pub fn queue_reply(&mut self, reply: DtmfReply, digits: &str) -> bool {
        let mut queued = DtmfDigits::new();
        if queued.push_str(digits).is_err() {
            return false;
        }
        self.reply = reply;
        self.reply_digits = queued;
        true
    }

    /// Remove the queued reply
    pub fn take_reply(&mut self) -> Option<DtmfDigits> {
        if self.reply == DtmfReply::None {
            return None;
        }
        self.reply = DtmfReply::None;
        Some(core::mem::take(&mut self.reply_digits))
    }

    /// Digits received since the live display was last cleared
    #[must_use]
    pub fn live(&self) -> &str {
        &self.live
    }

    /// Append a received digit, dropping the oldest when full
    pub fn push_live(&mut self, digit: char) {
        if self.live.push(digit).is_ok() {
            return;
        }
        let mut shifted = DtmfDigits::new();
        for c in self.live.chars().skip(1) {
            // One character was skipped, so each push fits.
            let _ = shifted.push(c);
        }
        let _ = shifted.push(digit);
        self.live = shifted;
    }

    /// Drop everything
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// A digit was decoded on the receiver
pub fn digit_received(ctx: &mut Context, digit: char) {
    if !ctx.capabilities.dtmf_calling {
        return;
    }
    ctx.dtmf.push_live(digit);
    ctx.countdowns.arm(CountdownId::DtmfRxLive, DTMF_RX_LIVE_10MS);
    ctx.flags.raise(ScheduleFlag::UpdateDisplay);
}

/// Live display timed out
pub fn live_expired(ctx: &mut Context) {
    if ctx.dtmf.live.is_empty() {
        return;
    }
    ctx.dtmf.live.clear();
    ctx.flags.raise(ScheduleFlag::UpdateDisplay);
}

/// Call state auto reset
pub fn auto_reset_expired(ctx: &mut Context) {
    if !ctx.dtmf.call_state.in_progress() {
        return;
    }
    debug!("dtmf: call state {:?} reset", ctx.dtmf.call_state);
    ctx.dtmf.call_state = DtmfCallState::None;
    ctx.flags.raise(ScheduleFlag::UpdateDisplay);
}
