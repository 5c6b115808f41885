//! Function State Machine Tests
//!
//! Tests for mode entry actions, wake ordering and the shared epilogue.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test function_tests

mod common;

use common::{test_settings, Event, MockBoard, HEALTHY_BATTERY};
use handheld_firmware::config::{Capabilities, Settings};
use handheld_firmware::radio::function::{select, Epilogue};
use handheld_firmware::scheduler::countdown::CountdownId;
use handheld_firmware::scheduler::flags::ScheduleFlag;
use handheld_firmware::scheduler::Context;
use handheld_firmware::types::{
    AlarmMode, AlarmState, DtmfCallState, DtmfReply, FunctionState, Granularity, ScrambleType,
    Screen, VfoSlot,
};

fn setup_with(settings: Settings) -> (Context, MockBoard) {
    let mut ctx = Context::new(settings, Capabilities::FULL);
    ctx.init();
    (ctx, MockBoard::new(HEALTHY_BATTERY))
}

fn setup() -> (Context, MockBoard) {
    setup_with(test_settings())
}

// =============================================================================
// Select Basics
// =============================================================================

#[test]
fn init_starts_in_foreground() {
    let (ctx, _) = setup();
    assert_eq!(ctx.function(), FunctionState::Foreground);
    assert_eq!(ctx.function.previous(), FunctionState::Foreground);
}

#[test]
fn select_records_previous_state() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::Incoming);
    let transition = select(&mut ctx, &mut board, FunctionState::Receive);

    assert_eq!(transition.previous, FunctionState::Incoming);
    assert_eq!(transition.next, FunctionState::Receive);
    assert_eq!(ctx.function(), FunctionState::Receive);
    assert_eq!(ctx.function.previous(), FunctionState::Incoming);
}

#[test]
fn exactly_one_state_after_every_transition() {
    let (mut ctx, mut board) = setup();
    for from in FunctionState::ALL {
        for to in FunctionState::ALL {
            select(&mut ctx, &mut board, from);
            select(&mut ctx, &mut board, to);
            assert_eq!(ctx.function(), to);
            assert_eq!(ctx.function.previous(), from);
        }
    }
}

#[test]
fn receive_states_only_run_epilogue() {
    for state in [
        FunctionState::Receive,
        FunctionState::Monitor,
        FunctionState::Incoming,
    ] {
        let (mut ctx, mut board) = setup();
        ctx.flags.raise(ScheduleFlag::SchedulePowerSave);

        let transition = select(&mut ctx, &mut board, state);

        assert_eq!(transition.epilogue, Epilogue::Apply);
        assert!(board.events().is_empty(), "{state:?} touched hardware");
        assert_eq!(ctx.countdowns.remaining(CountdownId::BatterySave), 1000);
        assert!(!ctx.flags.is_raised(ScheduleFlag::SchedulePowerSave));
        assert_eq!(ctx.countdowns.remaining(CountdownId::FmRestore), 0);
    }
}

// =============================================================================
// Power Save
// =============================================================================

#[test]
fn power_save_puts_receiver_to_sleep() {
    let (mut ctx, mut board) = setup();
    let transition = select(&mut ctx, &mut board, FunctionState::PowerSave);

    assert_eq!(transition.epilogue, Epilogue::Skip);
    assert!(ctx.radio.rx_idle);
    assert_eq!(
        board.events(),
        vec![
            Event::RfVox(false),
            Event::RfSleep,
            Event::RfAux(false),
            Event::Show(Screen::Main),
        ]
    );
    assert!(ctx.flags.is_raised(ScheduleFlag::UpdateStatus));
}

#[test]
fn power_save_returns_screen_to_main() {
    let (mut ctx, mut board) = setup();
    ctx.radio.screen = Screen::Menu;

    select(&mut ctx, &mut board, FunctionState::PowerSave);

    assert_eq!(ctx.radio.screen, Screen::Main);
    assert_eq!(board.count(&Event::Show(Screen::Main)), 1);
}

#[test]
fn power_save_owns_its_cycle_countdown() {
    let (mut ctx, mut board) = setup();
    ctx.countdowns.arm(CountdownId::PowerSaveCycle, 1);
    ctx.countdowns.tick(Granularity::Fast10ms);
    assert!(ctx.countdowns.is_expired(CountdownId::PowerSaveCycle));

    select(&mut ctx, &mut board, FunctionState::PowerSave);

    // battery_save 4 -> 40 fast ticks, stale expiry dropped, idle countdown untouched
    assert_eq!(ctx.countdowns.remaining(CountdownId::PowerSaveCycle), 40);
    assert!(!ctx.countdowns.is_expired(CountdownId::PowerSaveCycle));
    assert_eq!(ctx.countdowns.remaining(CountdownId::BatterySave), 0);
}

#[test]
fn leaving_power_save_wakes_receiver_first() {
    for target in [
        FunctionState::Foreground,
        FunctionState::Receive,
        FunctionState::Monitor,
        FunctionState::Incoming,
        FunctionState::Transmit,
    ] {
        let (mut ctx, mut board) = setup();
        select(&mut ctx, &mut board, FunctionState::PowerSave);
        board.clear();

        select(&mut ctx, &mut board, target);

        let events = board.events();
        assert_eq!(events[0], Event::RfWake, "{target:?} did not wake first");
        assert_eq!(events[1], Event::DrawStatus);
        assert!(!ctx.radio.rx_idle);
    }
}

#[test]
fn wake_precedes_transmit_setup() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::PowerSave);
    select(&mut ctx, &mut board, FunctionState::Transmit);

    let wake = board.position(&Event::RfWake).unwrap();
    let redraw = board.position(&Event::Redraw).unwrap();
    let program = board
        .events()
        .iter()
        .position(|e| matches!(e, Event::RfProgramTx(_)))
        .unwrap();
    assert!(wake < redraw);
    assert!(wake < program);
}

#[test]
fn power_save_to_power_save_does_not_wake() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::PowerSave);
    board.clear();
    select(&mut ctx, &mut board, FunctionState::PowerSave);

    assert_eq!(board.count(&Event::RfWake), 0);
    assert!(ctx.radio.rx_idle);
}

#[test]
fn only_power_save_leaves_receiver_idle() {
    let (mut ctx, mut board) = setup();
    for state in FunctionState::ALL {
        select(&mut ctx, &mut board, FunctionState::PowerSave);
        select(&mut ctx, &mut board, state);
        assert_eq!(ctx.radio.rx_idle, state == FunctionState::PowerSave);
    }
}

// =============================================================================
// Foreground
// =============================================================================

#[test]
fn foreground_skips_epilogue() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::Monitor);
    ctx.countdowns.disarm(CountdownId::BatterySave);
    ctx.flags.raise(ScheduleFlag::SchedulePowerSave);

    let transition = select(&mut ctx, &mut board, FunctionState::Foreground);

    assert_eq!(transition.epilogue, Epilogue::Skip);
    assert_eq!(ctx.countdowns.remaining(CountdownId::BatterySave), 0);
    assert!(ctx.flags.is_raised(ScheduleFlag::SchedulePowerSave));
}

#[test]
fn foreground_after_fm_receive_discards_restore_countdown() {
    // The restore delay is computed on this path but the epilogue that would
    // load it is skipped, so FmRestore stays disarmed.
    let (mut ctx, mut board) = setup();
    ctx.radio.fm_mode = true;
    select(&mut ctx, &mut board, FunctionState::Receive);

    let transition = select(&mut ctx, &mut board, FunctionState::Foreground);

    assert_eq!(transition.fm_restore_10ms, 500);
    assert_eq!(transition.epilogue, Epilogue::Skip);
    assert_eq!(ctx.countdowns.remaining(CountdownId::FmRestore), 0);
}

#[test]
fn foreground_after_receive_without_fm_computes_nothing() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::Receive);
    let transition = select(&mut ctx, &mut board, FunctionState::Foreground);
    assert_eq!(transition.fm_restore_10ms, 0);
}

#[test]
fn fm_restore_needs_fm_capability() {
    let mut ctx = Context::new(test_settings(), Capabilities::MINIMAL);
    ctx.init();
    let mut board = MockBoard::new(HEALTHY_BATTERY);
    ctx.radio.fm_mode = true;

    select(&mut ctx, &mut board, FunctionState::Receive);
    let transition = select(&mut ctx, &mut board, FunctionState::Foreground);
    assert_eq!(transition.fm_restore_10ms, 0);
}

#[test]
fn foreground_after_receive_arms_dtmf_auto_reset() {
    let (mut ctx, mut board) = setup();
    ctx.dtmf.set_call_state(DtmfCallState::Received);
    select(&mut ctx, &mut board, FunctionState::Receive);
    select(&mut ctx, &mut board, FunctionState::Foreground);

    // 1 + 5 minutes * 2
    assert_eq!(ctx.countdowns.remaining(CountdownId::DtmfAutoReset), 11);
}

#[test]
fn foreground_after_receive_without_call_leaves_dtmf_reset() {
    let (mut ctx, mut board) = setup();
    select(&mut ctx, &mut board, FunctionState::Receive);
    select(&mut ctx, &mut board, FunctionState::Foreground);
    assert_eq!(ctx.countdowns.remaining(CountdownId::DtmfAutoReset), 0);
}

#[test]
fn foreground_after_transmit_clears_signal_history() {
    let (mut ctx, mut board) = setup();
    ctx.radio.vfo_mut(VfoSlot::A).rssi_level = 5;
    ctx.radio.vfo_mut(VfoSlot::B).rssi_level = 3;
    select(&mut ctx, &mut board, FunctionState::Transmit);
    select(&mut ctx, &mut board, FunctionState::Foreground);

    assert_eq!(ctx.radio.vfo(VfoSlot::A).rssi_level, 0);
    assert_eq!(ctx.radio.vfo(VfoSlot::B).rssi_level, 0);
}

#[test]
fn foreground_refreshes_status_only_after_receive_or_transmit() {
    for (from, refresh) in [
        (FunctionState::Receive, true),
        (FunctionState::Transmit, true),
        (FunctionState::Monitor, false),
        (FunctionState::Incoming, false),
        (FunctionState::Foreground, false),
    ] {
        let (mut ctx, mut board) = setup();
        select(&mut ctx, &mut board, from);
        ctx.flags.take(ScheduleFlag::UpdateStatus);

        select(&mut ctx, &mut board, FunctionState::Foreground);
        assert_eq!(
            ctx.flags.is_raised(ScheduleFlag::UpdateStatus),
            refresh,
            "from {from:?}"
        );
    }
}

#[test]
fn foreground_prepares_pending_dtmf_reply() {
    let (mut ctx, mut board) = setup();
    assert!(ctx.dtmf.queue_reply(DtmfReply::Ack, "123"));
    select(&mut ctx, &mut board, FunctionState::Monitor);
    board.clear();

    select(&mut ctx, &mut board, FunctionState::Foreground);
    assert_eq!(board.events(), vec![Event::RfPrepareCss]);
}

// =============================================================================
// Transmit
// =============================================================================

#[test]
fn transmit_programs_rf_and_keys_indicator() {
    let (mut ctx, mut board) = setup();
    let freq = ctx.radio.tx_vfo().tx_frequency.as_hz();

    let transition = select(&mut ctx, &mut board, FunctionState::Transmit);

    assert_eq!(transition.epilogue, Epilogue::Apply);
    assert_eq!(
        board.events(),
        vec![
            Event::Redraw,
            Event::RfProgramTx(freq),
            Event::TxIndicator(true),
            Event::RfScrambler(None),
        ]
    );
    assert_eq!(ctx.countdowns.remaining(CountdownId::BatterySave), 1000);
}

#[test]
fn transmit_enables_configured_scrambler() {
    let (mut ctx, mut board) = setup();
    let home = ctx.radio.home_vfo;
    ctx.radio.vfo_mut(home).scramble = ScrambleType::new(3).unwrap();

    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.count(&Event::RfScrambler(Some(2))), 1);
}

#[test]
fn scramble_disable_overrides_channel() {
    let mut settings = test_settings();
    settings.scramble_enabled = false;
    let (mut ctx, mut board) = setup_with(settings);
    let home = ctx.radio.home_vfo;
    ctx.radio.vfo_mut(home).scramble = ScrambleType::new(3).unwrap();

    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.count(&Event::RfScrambler(None)), 1);
}

#[test]
fn transmit_sends_queued_dtmf_reply_once() {
    let (mut ctx, mut board) = setup();
    assert!(ctx.dtmf.queue_reply(DtmfReply::Ani, "101"));

    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.count(&Event::RfDtmf("101".to_string())), 1);
    assert_eq!(ctx.dtmf.reply(), DtmfReply::None);

    select(&mut ctx, &mut board, FunctionState::Foreground);
    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.count(&Event::RfDtmf("101".to_string())), 1);
}

#[test]
fn transmit_reinitialises_fm_receiver_muted() {
    let (mut ctx, mut board) = setup();
    ctx.radio.fm_mode = true;
    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.events()[0], Event::FmInitMuted);
}

#[test]
fn transmit_1750_burst_skips_scrambler() {
    let (mut ctx, mut board) = setup();
    ctx.alarm.set_state(AlarmState::Tx1750);

    let transition = select(&mut ctx, &mut board, FunctionState::Transmit);

    let events = board.events();
    let tone = board.position(&Event::RfTransmitTone(1750)).unwrap();
    assert_eq!(events[tone + 1], Event::DelayUs(2_000));
    assert_eq!(events[tone + 2], Event::AudioPath(true));
    assert!(!events.iter().any(|e| matches!(e, Event::RfScrambler(_))));
    assert!(ctx.radio.speaker_enabled);
    assert_eq!(ctx.alarm.tone_counter(), 0);
    assert_eq!(transition.epilogue, Epilogue::Apply);
}

#[test]
fn transmit_site_alarm_sends_base_tone() {
    let (mut ctx, mut board) = setup();
    ctx.alarm.set_state(AlarmState::TxAlarm);

    select(&mut ctx, &mut board, FunctionState::Transmit);
    assert_eq!(board.count(&Event::RfTransmitTone(500)), 1);
    assert_eq!(ctx.alarm.state(), AlarmState::TxAlarm);
}

#[test]
fn tone_only_alarm_sounds_locally() {
    let mut settings = test_settings();
    settings.alarm_mode = AlarmMode::Tone;
    let (mut ctx, mut board) = setup_with(settings);
    ctx.alarm.set_state(AlarmState::TxAlarm);
    ctx.flags.raise(ScheduleFlag::SchedulePowerSave);

    let transition = select(&mut ctx, &mut board, FunctionState::Transmit);

    assert_eq!(
        board.events(),
        vec![
            Event::Redraw,
            Event::AudioPath(false),
            Event::DelayUs(20_000),
            Event::RfPlayTone(500),
            Event::DelayUs(2_000),
            Event::AudioPath(true),
            Event::DelayUs(60_000),
            Event::RfExitTxMute,
        ]
    );
    assert_eq!(ctx.alarm.state(), AlarmState::Alarm);
    assert!(ctx.radio.speaker_enabled);
    assert_eq!(transition.epilogue, Epilogue::Apply);
    assert_eq!(ctx.countdowns.remaining(CountdownId::BatterySave), 1000);
    assert!(!ctx.flags.is_raised(ScheduleFlag::SchedulePowerSave));
}
