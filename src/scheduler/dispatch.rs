//! Dispatch Loop
//!
//! Single-threaded, non-reentrant consumer of everything the interrupts
//! and input tasks hand over. One [`Dispatcher::poll`] pass:
//!
//! 1. drain queued [`InputEvent`]s
//! 2. apply pending fast ticks to the countdowns, run the 10 ms slice
//! 3. for each pending slow tick, tick the countdowns and run the 500 ms slice
//!
//! Expiries are levels: if the loop falls behind, several ticks collapse
//! into one observed expiry.

use heapless::spsc::Consumer;

use crate::config::{Capabilities, Settings, MENU_TIMEOUT_500MS, SERIAL_CONFIG_GUARD_500MS};
use crate::drivers::{Announcer, Backlight, BatterySensor, Board, Display};
use crate::power::{BatteryAction, BatteryActions};
use crate::radio::function::{self, Transition};
use crate::radio::{alarm, dtmf, receive, transmit};
use crate::scheduler::countdown::CountdownId;
use crate::scheduler::flags::{ScheduleFlag, TickFlags};
use crate::scheduler::Context;
use crate::types::{AlarmState, FunctionState, Granularity, Screen};

/// Capacity of the input event queue
pub const INPUT_QUEUE_DEPTH: usize = 16;

/// Queue carrying input events from interrupts and tasks to the loop
pub type InputQueue = heapless::spsc::Queue<InputEvent, INPUT_QUEUE_DEPTH>;

/// Battery is sampled on every n-th slow tick
const BATTERY_SAMPLE_DIVIDER: u32 = 2;

/// Something that happened outside the loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "embedded", derive(defmt::Format))]
pub enum InputEvent {
    /// PTT key down
    PttPressed,
    /// PTT key up
    PttReleased,
    /// Carrier above squelch threshold
    SquelchOpened,
    /// Carrier gone
    SquelchClosed,
    /// Sub-audio or DTMF qualification passed
    CallQualified,
    /// Monitor key
    MonitorToggled,
    /// Serial configuration frame received
    SerialActivity,
    /// Any key press
    UserActivity,
    /// Settings menu opened
    MenuOpened,
    /// Alarm key down
    AlarmPressed,
    /// 1750 Hz key down
    Tone1750Pressed,
    /// Alarm or 1750 key up
    AlarmReleased,
    /// DTMF digit decoded
    DtmfReceived(char),
}

/// Owner of the scheduler context and the board
pub struct Dispatcher<B> {
    ctx: Context,
    board: B,
    slow_ticks: u32,
}

impl<B: Board> Dispatcher<B> {
    /// Create a dispatcher; call [`init`](Self::init) before polling
    pub fn new(settings: Settings, capabilities: Capabilities, board: B) -> Self {
        Self {
            ctx: Context::new(settings, capabilities),
            board,
            slow_ticks: 0,
        }
    }

    /// Boot sequence: reset state, take a first battery reading, start idle behaviors
    pub fn init(&mut self) {
        self.ctx.init();
        self.slow_ticks = 0;

        let sample = self.board.battery().sample();
        self.ctx.battery.prime(sample);
        let actions = self.ctx.battery.get_readings();
        self.apply_battery_actions(&actions);

        function::rearm_idle_countdown(&mut self.ctx);
        receive::start_dual_watch(&mut self.ctx);
        receive::start_noaa(&mut self.ctx);
        info!(
            "dispatch: init, battery level {} ({} x10mV)",
            self.ctx.battery.level(),
            self.ctx.battery.voltage()
        );
    }

    /// Scheduler context
    #[must_use]
    pub const fn ctx(&self) -> &Context {
        &self.ctx
    }

    /// Mutable scheduler context
    pub fn ctx_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Board
    #[must_use]
    pub const fn board(&self) -> &B {
        &self.board
    }

    /// Mutable board
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// Active mode
    #[must_use]
    pub const fn function(&self) -> FunctionState {
        self.ctx.function()
    }

    /// Change mode through the function state machine
    pub fn select(&mut self, next: FunctionState) -> Transition {
        function::select(&mut self.ctx, &mut self.board, next)
    }

    /// One loop pass
    pub fn poll<const N: usize>(
        &mut self,
        ticks: &TickFlags,
        events: &mut Consumer<'_, InputEvent, N>,
    ) {
        while let Some(event) = events.dequeue() {
            self.handle(event);
        }
        self.service_ticks(ticks);
    }

    /// Apply every pending tick and run the matching slices
    pub fn service_ticks(&mut self, ticks: &TickFlags) {
        let fast = ticks.take_fast();
        if fast > 0 {
            for _ in 0..fast {
                self.ctx.countdowns.tick(Granularity::Fast10ms);
            }
            self.time_slice_10ms();
        }

        for _ in 0..ticks.take_slow() {
            self.ctx.countdowns.tick(Granularity::Slow500ms);
            self.time_slice_500ms();
        }
    }

    /// React to one input event
    pub fn handle(&mut self, event: InputEvent) {
        trace!("dispatch: {:?}", event);
        let (ctx, board) = (&mut self.ctx, &mut self.board);
        match event {
            InputEvent::PttPressed => {
                user_activity(ctx, board);
                transmit::request_transmit(ctx, board);
            }
            InputEvent::PttReleased => transmit::end_transmission(ctx, board),
            InputEvent::SquelchOpened => receive::squelch_opened(ctx, board),
            InputEvent::SquelchClosed => receive::squelch_closed(ctx, board),
            InputEvent::CallQualified => receive::call_qualified(ctx, board),
            InputEvent::MonitorToggled => {
                user_activity(ctx, board);
                receive::toggle_monitor(ctx, board);
            }
            InputEvent::SerialActivity => {
                ctx.countdowns
                    .arm(CountdownId::SerialConfigGuard, SERIAL_CONFIG_GUARD_500MS);
            }
            InputEvent::UserActivity => user_activity(ctx, board),
            InputEvent::MenuOpened => {
                ctx.radio.screen = Screen::Menu;
                ctx.flags.request_screen(Screen::Menu);
                user_activity(ctx, board);
            }
            InputEvent::AlarmPressed => alarm::start(ctx, board, AlarmState::TxAlarm),
            InputEvent::Tone1750Pressed => alarm::start(ctx, board, AlarmState::Tx1750),
            InputEvent::AlarmReleased => alarm::stop(ctx, board),
            InputEvent::DtmfReceived(digit) => dtmf::digit_received(ctx, digit),
        }
    }

    /// Consume the 10 ms countdown expiries and run per-tick behaviors
    pub fn time_slice_10ms(&mut self) {
        let (ctx, board) = (&mut self.ctx, &mut self.board);

        if ctx.countdowns.take_expired(CountdownId::BatterySave) {
            ctx.flags.raise(ScheduleFlag::SchedulePowerSave);
        }
        if ctx.flags.take(ScheduleFlag::SchedulePowerSave) {
            function::schedule_power_save(ctx, board);
        }
        if ctx.countdowns.take_expired(CountdownId::PowerSaveCycle) {
            function::power_save_cycle(ctx, board);
        }
        if ctx.countdowns.take_expired(CountdownId::FmRestore) {
            receive::fm_restore_expired(ctx, board);
        }
        if ctx.countdowns.take_expired(CountdownId::DualWatch) {
            receive::dual_watch_expired(ctx);
        }
        if ctx.countdowns.take_expired(CountdownId::ScanPause) {
            receive::scan_pause_expired(ctx);
        }
        if ctx.countdowns.take_expired(CountdownId::NoaaPoll) {
            receive::noaa_poll_expired(ctx);
        }
        if ctx.countdowns.take_expired(CountdownId::TailTone) {
            transmit::tail_tone_expired(ctx, board);
        }
        if ctx.countdowns.take_expired(CountdownId::DtmfRxLive) {
            dtmf::live_expired(ctx);
        }

        alarm::time_slice_10ms(ctx, board);
    }

    /// Consume the 500 ms countdown expiries and run the battery monitor
    pub fn time_slice_500ms(&mut self) {
        {
            let (ctx, board) = (&mut self.ctx, &mut self.board);

            if ctx.countdowns.take_expired(CountdownId::TxTimeout) {
                transmit::tx_timeout_expired(ctx, board);
            }
            if ctx.countdowns.take_expired(CountdownId::MenuTimeout)
                && ctx.radio.screen == Screen::Menu
            {
                debug!("dispatch: menu timeout");
                ctx.radio.screen = Screen::Main;
                ctx.flags.request_screen(Screen::Main);
            }
            if ctx.countdowns.take_expired(CountdownId::VfoResume) {
                receive::vfo_resume_expired(ctx);
            }
            if ctx.countdowns.take_expired(CountdownId::SerialConfigGuard) {
                debug!("dispatch: serial session over");
                ctx.flags.raise(ScheduleFlag::ReconfigureVfos);
            }
            if ctx.countdowns.take_expired(CountdownId::DtmfAutoReset) {
                dtmf::auto_reset_expired(ctx);
            }
        }

        self.slow_ticks = self.slow_ticks.wrapping_add(1);
        if self.slow_ticks % BATTERY_SAMPLE_DIVIDER == 0 {
            let sample = self.board.battery().sample();
            self.ctx.battery.record_sample(sample);
            let actions = self.ctx.battery.get_readings();
            self.apply_battery_actions(&actions);
        }

        let actions = self.ctx.battery.time_slice_500ms(
            self.ctx.function(),
            self.ctx.settings.backlight_always_on(),
        );
        self.apply_battery_actions(&actions);
    }

    fn apply_battery_actions(&mut self, actions: &BatteryActions) {
        for &action in actions {
            match action {
                BatteryAction::RefreshStatus => {
                    self.ctx.flags.raise(ScheduleFlag::UpdateStatus);
                    self.ctx.flags.raise(ScheduleFlag::UpdateDisplay);
                }
                BatteryAction::RefreshDisplay => {
                    self.ctx.flags.raise(ScheduleFlag::UpdateDisplay);
                }
                BatteryAction::BacklightOn => self.board.backlight().turn_on(),
                BatteryAction::DrawIcon { level, blink } => {
                    self.board.display().draw_battery(level, blink);
                }
                BatteryAction::Beep(beep) => self.board.announcer().beep(beep),
                BatteryAction::Announce(prompt) => {
                    if self.ctx.capabilities.voice {
                        self.board.announcer().announce(prompt);
                    }
                }
                BatteryAction::EnterReducedService { backlight_off } => {
                    self.ctx.radio.reduced_service = true;
                    self.select(FunctionState::PowerSave);
                    self.board.display().hardware_reset();
                    if backlight_off {
                        self.board.backlight().turn_off();
                    }
                }
            }
        }
    }
}

fn user_activity<B: Board>(ctx: &mut Context, board: &mut B) {
    function::rearm_idle_countdown(ctx);
    function::wake_on_activity(ctx, board);
    if ctx.radio.screen == Screen::Menu {
        ctx.countdowns
            .arm(CountdownId::MenuTimeout, MENU_TIMEOUT_500MS);
    }
}
