//! Handheld Radio Main Application
//!
//! Entry point for the STM32G474-based handheld firmware.
//! Initializes hardware, starts the SysTick scheduler tick and spawns the
//! dispatch, PTT and battery sampling tasks.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;
use heapless::spsc::{Consumer, Producer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use handheld_firmware::hal::adc::{BatteryAdc, BatteryMailbox, MailboxSensor};
use handheld_firmware::hal::board::{BareBoard, Unattached};
use handheld_firmware::hal::gpio::{BacklightPin, PttInput};
use handheld_firmware::hal::timer::SysTickTimer;
use handheld_firmware::prelude::*;
use handheld_firmware::scheduler::dispatch::{InputQueue, INPUT_QUEUE_DEPTH};
use handheld_firmware::tick::TickSource;

/// Tick deliveries from the SysTick exception
static TICKS: TickFlags = TickFlags::new();

/// Wakes the dispatch task after each tick
static TICK_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Latest battery reading
static BATTERY: BatteryMailbox = BatteryMailbox::new();

static INPUT_QUEUE: StaticCell<InputQueue> = StaticCell::new();

/// Scheduler tick, every 10 ms
#[cortex_m_rt::exception]
fn SysTick() {
    TICKS.on_tick();
    TICK_SIGNAL.signal(());
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Handheld Radio Firmware v{}", env!("CARGO_PKG_VERSION"));

    // HSI 16 MHz / 4 * 85 / 2 = 170 MHz
    let mut config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::{Pll, PllMul, PllPreDiv, PllRDiv, PllSource, Sysclk};
        config.rcc.pll = Some(Pll {
            source: PllSource::HSI,
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL85,
            divp: None,
            divq: None,
            divr: Some(PllRDiv::DIV2),
        });
        config.rcc.sys = Sysclk::PLL1_R;
        config.rcc.boost = true;
    }
    let p = embassy_stm32::init(config);
    let core = cortex_m::Peripherals::take().unwrap();

    info!("Peripherals initialized");

    let audio_path = Output::new(p.PC4, Level::Low, Speed::Low);
    let tx_indicator = Output::new(p.PB0, Level::Low, Speed::Low);
    let backlight = BacklightPin::new(Output::new(p.PB6, Level::Low, Speed::Low));
    let ptt = PttInput::new(Input::new(p.PA3, Pull::Up));

    let mut adc = BatteryAdc::new(p.ADC1, p.PA0, p.PA1);
    BATTERY.post(adc.read());

    let ticks = TickSource::init(SysTickTimer::new(core.SYST), SYSTEM_CLOCK_HZ, TICK_PERIOD_US);
    info!("SysTick running, {} ticks/us", ticks.ticks_per_us());

    let board = BareBoard {
        rf: Unattached,
        display: Unattached,
        announcer: Unattached,
        fm: Unattached,
        backlight,
        battery: MailboxSensor::new(&BATTERY),
        audio_path,
        tx_indicator,
        delay: ticks,
    };

    let mut dispatcher = Dispatcher::new(Settings::default(), Capabilities::default(), board);
    dispatcher.init();

    let (producer, consumer) = INPUT_QUEUE.init(InputQueue::new()).split();

    spawner.spawn(dispatch_task(dispatcher, consumer)).unwrap();
    spawner.spawn(ptt_task(ptt, producer)).unwrap();
    spawner.spawn(battery_task(adc)).unwrap();

    info!("Tasks spawned");
}

/// Dispatch loop - one pass per tick
#[embassy_executor::task]
async fn dispatch_task(
    mut dispatcher: Dispatcher<BareBoard>,
    mut events: Consumer<'static, InputEvent, INPUT_QUEUE_DEPTH>,
) {
    loop {
        TICK_SIGNAL.wait().await;
        dispatcher.poll(&TICKS, &mut events);
    }
}

/// PTT polling task - debounced key edges into the input queue
#[embassy_executor::task]
async fn ptt_task(
    mut ptt: PttInput<'static>,
    mut events: Producer<'static, InputEvent, INPUT_QUEUE_DEPTH>,
) {
    loop {
        Timer::after(Duration::from_millis(10)).await;
        if let Some(event) = ptt.update() {
            if events.enqueue(event).is_err() {
                warn!("input queue full, dropped {}", event);
            }
        }
    }
}

/// Battery sampling task - keeps the mailbox fresh
#[embassy_executor::task]
async fn battery_task(mut adc: BatteryAdc<'static>) {
    loop {
        BATTERY.post(adc.read());
        Timer::after(Duration::from_millis(250)).await;
    }
}
