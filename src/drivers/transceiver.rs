//! RF Transceiver Boundary
//!
//! Operations the core needs from the RF chip driver. The driver owns the
//! register map; the core only sequences these calls.

use crate::types::VfoInfo;

/// RF transceiver chip control
pub trait Transceiver {
    /// Power down the receive chain
    fn sleep(&mut self);

    /// Power the receive chain back up and re-enable the auxiliary GPIO output
    fn wake_receiver(&mut self);

    /// Drive the chip's auxiliary GPIO output
    fn set_aux_output(&mut self, enabled: bool);

    /// Enable or disable the voice-operated switch
    fn set_vox(&mut self, enabled: bool);

    /// Program transmit frequency, power and sub-audio for `vfo`
    fn program_transmit(&mut self, vfo: &VfoInfo);

    /// Load the sub-audio settings a pending DTMF reply will be sent with
    fn prepare_css_tx(&mut self);

    /// Play a tone on the local speaker
    fn play_tone(&mut self, hz: u16);

    /// Key a tone onto the transmitted signal
    fn transmit_tone(&mut self, hz: u16);

    /// Retune the tone generator while a tone is playing
    fn set_tone_frequency(&mut self, hz: u16);

    /// Release the transmit audio mute
    fn exit_tx_mute(&mut self);

    /// Enable the voice scrambler with a zero-based type, or disable it
    fn set_scrambler(&mut self, chip_index: Option<u8>);

    /// Send a DTMF string on the open transmitter
    fn send_dtmf(&mut self, digits: &str);

    /// Send the end-of-transmission signalling (roger beep, MDC tail)
    fn send_end_of_transmission(&mut self);
}
