//! Board Wiring
//!
//! Concrete [`Board`] for the STM32G474 handheld. The GPIO lines, the
//! backlight, the battery mailbox and the SysTick delay are owned here.
//! The RF chip, LCD, announcer and FM receiver drivers are attached behind
//! their traits; [`Unattached`] stands in for any that are not fitted and
//! only traces the calls it receives.

use embassy_stm32::gpio::Output;

use crate::drivers::{Announcer, Board, Display, FmReceiver, Transceiver};
use crate::hal::adc::MailboxSensor;
use crate::hal::gpio::BacklightPin;
use crate::hal::timer::SysTickTimer;
use crate::tick::TickSource;
use crate::types::{Beep, Screen, VfoInfo, VoicePrompt};

/// Placeholder for a collaborator that is not fitted
#[derive(Clone, Copy, Debug, Default)]
pub struct Unattached;

impl Transceiver for Unattached {
    fn sleep(&mut self) {
        defmt::trace!("rf: sleep");
    }

    fn wake_receiver(&mut self) {
        defmt::trace!("rf: wake");
    }

    fn set_aux_output(&mut self, enabled: bool) {
        defmt::trace!("rf: aux {}", enabled);
    }

    fn set_vox(&mut self, enabled: bool) {
        defmt::trace!("rf: vox {}", enabled);
    }

    fn program_transmit(&mut self, vfo: &VfoInfo) {
        defmt::trace!("rf: tx {}", vfo.tx_frequency);
    }

    fn prepare_css_tx(&mut self) {
        defmt::trace!("rf: css tx");
    }

    fn play_tone(&mut self, hz: u16) {
        defmt::trace!("rf: local tone {}Hz", hz);
    }

    fn transmit_tone(&mut self, hz: u16) {
        defmt::trace!("rf: tx tone {}Hz", hz);
    }

    fn set_tone_frequency(&mut self, hz: u16) {
        defmt::trace!("rf: tone {}Hz", hz);
    }

    fn exit_tx_mute(&mut self) {
        defmt::trace!("rf: unmute");
    }

    fn set_scrambler(&mut self, chip_index: Option<u8>) {
        defmt::trace!("rf: scrambler {}", chip_index);
    }

    fn send_dtmf(&mut self, digits: &str) {
        defmt::trace!("rf: dtmf {=str}", digits);
    }

    fn send_end_of_transmission(&mut self) {
        defmt::trace!("rf: eot");
    }
}

impl Display for Unattached {
    fn redraw(&mut self) {
        defmt::trace!("lcd: redraw");
    }

    fn show(&mut self, screen: Screen) {
        defmt::trace!("lcd: show {}", screen);
    }

    fn draw_status(&mut self) {
        defmt::trace!("lcd: status");
    }

    fn draw_battery(&mut self, level: u8, blink: bool) {
        defmt::trace!("lcd: battery {} blink={}", level, blink);
    }

    fn hardware_reset(&mut self) {
        defmt::trace!("lcd: reset");
    }
}

impl Announcer for Unattached {
    fn beep(&mut self, beep: Beep) {
        defmt::trace!("beep: {}", beep);
    }

    fn announce(&mut self, prompt: VoicePrompt) {
        defmt::trace!("voice: {}", prompt);
    }
}

impl FmReceiver for Unattached {
    fn init_muted(&mut self) {
        defmt::trace!("fm: init muted");
    }

    fn resume(&mut self) {
        defmt::trace!("fm: resume");
    }
}

/// STM32G474 handheld board
pub struct Stm32Board<R, D, A, F> {
    /// RF transceiver driver
    pub rf: R,
    /// LCD driver
    pub display: D,
    /// Beep and voice driver
    pub announcer: A,
    /// FM broadcast receiver driver
    pub fm: F,
    /// LCD backlight
    pub backlight: BacklightPin<'static>,
    /// Battery readings posted by the sampler task
    pub battery: MailboxSensor,
    /// Audio amplifier path switch
    pub audio_path: Output<'static>,
    /// Transmit indicator LED
    pub tx_indicator: Output<'static>,
    /// SysTick time base, doubles as the blocking delay
    pub delay: TickSource<SysTickTimer>,
}

impl<R, D, A, F> Board for Stm32Board<R, D, A, F>
where
    R: Transceiver,
    D: Display,
    A: Announcer,
    F: FmReceiver,
{
    type Rf = R;
    type Display = D;
    type Backlight = BacklightPin<'static>;
    type Announcer = A;
    type Fm = F;
    type Battery = MailboxSensor;
    type AudioPath = Output<'static>;
    type TxIndicator = Output<'static>;
    type Delay = TickSource<SysTickTimer>;

    fn rf(&mut self) -> &mut R {
        &mut self.rf
    }

    fn display(&mut self) -> &mut D {
        &mut self.display
    }

    fn backlight(&mut self) -> &mut Self::Backlight {
        &mut self.backlight
    }

    fn announcer(&mut self) -> &mut A {
        &mut self.announcer
    }

    fn fm(&mut self) -> &mut F {
        &mut self.fm
    }

    fn battery(&mut self) -> &mut MailboxSensor {
        &mut self.battery
    }

    fn audio_path(&mut self) -> &mut Output<'static> {
        &mut self.audio_path
    }

    fn tx_indicator(&mut self) -> &mut Output<'static> {
        &mut self.tx_indicator
    }

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }
}

/// Board with only the GPIO-level collaborators fitted
pub type BareBoard = Stm32Board<Unattached, Unattached, Unattached, Unattached>;
