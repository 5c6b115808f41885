//! Shared test support
//!
//! A recording board: every collaborator call lands in one ordered event
//! log so tests can check what happened and in which order.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use handheld_firmware::config::{Capabilities, Settings};
use handheld_firmware::drivers::{
    Announcer, Backlight, BatterySample, BatterySensor, Board, Display, FmReceiver, Transceiver,
};
use handheld_firmware::scheduler::dispatch::Dispatcher;
use handheld_firmware::scheduler::flags::TickFlags;
use handheld_firmware::types::{Beep, Screen, VfoInfo, VoicePrompt};

/// One collaborator call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    RfSleep,
    RfWake,
    RfAux(bool),
    RfVox(bool),
    RfProgramTx(u32),
    RfPrepareCss,
    RfPlayTone(u16),
    RfTransmitTone(u16),
    RfToneFrequency(u16),
    RfExitTxMute,
    RfScrambler(Option<u8>),
    RfDtmf(String),
    RfEndOfTx,
    Redraw,
    Show(Screen),
    DrawStatus,
    DrawBattery { level: u8, blink: bool },
    DisplayReset,
    BacklightOn,
    BacklightOff,
    Beep(Beep),
    Announce(VoicePrompt),
    FmInitMuted,
    FmResume,
    AudioPath(bool),
    TxIndicator(bool),
    DelayUs(u32),
}

/// Shared, ordered event log
pub type Log = Rc<RefCell<Vec<Event>>>;

/// Records every trait call into the log
#[derive(Clone)]
pub struct Recorder {
    log: Log,
}

impl Recorder {
    fn push(&self, event: Event) {
        self.log.borrow_mut().push(event);
    }
}

impl Transceiver for Recorder {
    fn sleep(&mut self) {
        self.push(Event::RfSleep);
    }
    fn wake_receiver(&mut self) {
        self.push(Event::RfWake);
    }
    fn set_aux_output(&mut self, enabled: bool) {
        self.push(Event::RfAux(enabled));
    }
    fn set_vox(&mut self, enabled: bool) {
        self.push(Event::RfVox(enabled));
    }
    fn program_transmit(&mut self, vfo: &VfoInfo) {
        self.push(Event::RfProgramTx(vfo.tx_frequency.as_hz()));
    }
    fn prepare_css_tx(&mut self) {
        self.push(Event::RfPrepareCss);
    }
    fn play_tone(&mut self, hz: u16) {
        self.push(Event::RfPlayTone(hz));
    }
    fn transmit_tone(&mut self, hz: u16) {
        self.push(Event::RfTransmitTone(hz));
    }
    fn set_tone_frequency(&mut self, hz: u16) {
        self.push(Event::RfToneFrequency(hz));
    }
    fn exit_tx_mute(&mut self) {
        self.push(Event::RfExitTxMute);
    }
    fn set_scrambler(&mut self, chip_index: Option<u8>) {
        self.push(Event::RfScrambler(chip_index));
    }
    fn send_dtmf(&mut self, digits: &str) {
        self.push(Event::RfDtmf(digits.to_string()));
    }
    fn send_end_of_transmission(&mut self) {
        self.push(Event::RfEndOfTx);
    }
}

impl Display for Recorder {
    fn redraw(&mut self) {
        self.push(Event::Redraw);
    }
    fn show(&mut self, screen: Screen) {
        self.push(Event::Show(screen));
    }
    fn draw_status(&mut self) {
        self.push(Event::DrawStatus);
    }
    fn draw_battery(&mut self, level: u8, blink: bool) {
        self.push(Event::DrawBattery { level, blink });
    }
    fn hardware_reset(&mut self) {
        self.push(Event::DisplayReset);
    }
}

impl Backlight for Recorder {
    fn turn_on(&mut self) {
        self.push(Event::BacklightOn);
    }
    fn turn_off(&mut self) {
        self.push(Event::BacklightOff);
    }
}

impl Announcer for Recorder {
    fn beep(&mut self, beep: Beep) {
        self.push(Event::Beep(beep));
    }
    fn announce(&mut self, prompt: VoicePrompt) {
        self.push(Event::Announce(prompt));
    }
}

impl FmReceiver for Recorder {
    fn init_muted(&mut self) {
        self.push(Event::FmInitMuted);
    }
    fn resume(&mut self) {
        self.push(Event::FmResume);
    }
}

impl DelayNs for Recorder {
    fn delay_ns(&mut self, ns: u32) {
        self.push(Event::DelayUs(ns / 1000));
    }
    fn delay_us(&mut self, us: u32) {
        self.push(Event::DelayUs(us));
    }
}

/// Which GPIO line a [`PinRecorder`] stands for
#[derive(Clone, Copy)]
pub enum Line {
    AudioPath,
    TxIndicator,
}

/// Records pin writes into the log
pub struct PinRecorder {
    log: Log,
    line: Line,
}

impl PinRecorder {
    fn push(&self, high: bool) {
        let event = match self.line {
            Line::AudioPath => Event::AudioPath(high),
            Line::TxIndicator => Event::TxIndicator(high),
        };
        self.log.borrow_mut().push(event);
    }
}

impl ErrorType for PinRecorder {
    type Error = Infallible;
}

impl OutputPin for PinRecorder {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.push(false);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.push(true);
        Ok(())
    }
}

/// Battery sensor returning whatever the test put in
pub struct FakeBattery {
    sample: Rc<Cell<BatterySample>>,
}

impl BatterySensor for FakeBattery {
    fn sample(&mut self) -> BatterySample {
        self.sample.get()
    }
}

/// Board made of recorders
pub struct MockBoard {
    log: Log,
    battery_sample: Rc<Cell<BatterySample>>,
    recorder: Recorder,
    battery: FakeBattery,
    audio_path: PinRecorder,
    tx_indicator: PinRecorder,
}

impl MockBoard {
    pub fn new(sample: BatterySample) -> Self {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let battery_sample = Rc::new(Cell::new(sample));
        Self {
            recorder: Recorder { log: log.clone() },
            battery: FakeBattery {
                sample: battery_sample.clone(),
            },
            audio_path: PinRecorder {
                log: log.clone(),
                line: Line::AudioPath,
            },
            tx_indicator: PinRecorder {
                log: log.clone(),
                line: Line::TxIndicator,
            },
            log,
            battery_sample,
        }
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    /// How often `event` was recorded
    pub fn count(&self, event: &Event) -> usize {
        self.log.borrow().iter().filter(|e| *e == event).count()
    }

    /// Index of the first `event`
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.log.borrow().iter().position(|e| e == event)
    }

    /// Change what the battery sensor reports
    pub fn set_battery(&self, sample: BatterySample) {
        self.battery_sample.set(sample);
    }
}

impl Board for MockBoard {
    type Rf = Recorder;
    type Display = Recorder;
    type Backlight = Recorder;
    type Announcer = Recorder;
    type Fm = Recorder;
    type Battery = FakeBattery;
    type AudioPath = PinRecorder;
    type TxIndicator = PinRecorder;
    type Delay = Recorder;

    fn rf(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
    fn display(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
    fn backlight(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
    fn announcer(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
    fn fm(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
    fn battery(&mut self) -> &mut FakeBattery {
        &mut self.battery
    }
    fn audio_path(&mut self) -> &mut PinRecorder {
        &mut self.audio_path
    }
    fn tx_indicator(&mut self) -> &mut PinRecorder {
        &mut self.tx_indicator
    }
    fn delay(&mut self) -> &mut Recorder {
        &mut self.recorder
    }
}

/// Battery reading well inside the normal range (level 5 on the stock curve)
pub const HEALTHY_BATTERY: BatterySample = BatterySample {
    voltage: 800,
    current: 0,
};

/// Battery reading below the critical threshold
pub const CRITICAL_BATTERY: BatterySample = BatterySample {
    voltage: 600,
    current: 0,
};

/// Settings with a unity battery calibration so raw readings equal scaled voltage
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.battery_calibration[3] = 760;
    settings
}

/// Initialized dispatcher over a fresh mock board
pub fn dispatcher_with(
    settings: Settings,
    capabilities: Capabilities,
    battery: BatterySample,
) -> Dispatcher<MockBoard> {
    let mut dispatcher = Dispatcher::new(settings, capabilities, MockBoard::new(battery));
    dispatcher.init();
    dispatcher.board().clear();
    dispatcher
}

/// Initialized dispatcher with test settings and a healthy battery
pub fn dispatcher() -> Dispatcher<MockBoard> {
    dispatcher_with(test_settings(), Capabilities::FULL, HEALTHY_BATTERY)
}

/// Deliver `count` hardware ticks and service them in one loop pass
pub fn run_ticks(dispatcher: &mut Dispatcher<MockBoard>, ticks: &TickFlags, count: u32) {
    for _ in 0..count {
        ticks.on_tick();
    }
    dispatcher.service_ticks(ticks);
}

/// Deliver `count` hardware ticks, servicing after each one
pub fn step_ticks(dispatcher: &mut Dispatcher<MockBoard>, ticks: &TickFlags, count: u32) {
    for _ in 0..count {
        ticks.on_tick();
        dispatcher.service_ticks(ticks);
    }
}
