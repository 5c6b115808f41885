//! Audio Boundary
//!
//! Beep/voice playback and the auxiliary FM broadcast receiver.

use crate::types::{Beep, VoicePrompt};

/// Beep and voice prompt playback
pub trait Announcer {
    /// Play a beep pattern
    fn beep(&mut self, beep: Beep);

    /// Speak a voice prompt
    fn announce(&mut self, prompt: VoicePrompt);
}

/// Auxiliary FM broadcast receiver
pub trait FmReceiver {
    /// Reinitialise the receiver with its audio muted
    fn init_muted(&mut self);

    /// Resume playback on the last tuned station
    fn resume(&mut self);
}
