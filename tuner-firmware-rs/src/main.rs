//! tuner-firmware
//!
//! Display-board firmware for the Raspberry Pi Pico 2. Measures the pitch
//! square wave from the instrument board and shows it on the 5-panel
//! HT1635 LED display:
//!
//! 1. PWM slice 0 free-runs as a 16-bit timebase at 2 MHz. Its wrap
//!    interrupt advances the software high word of the capture channel.
//! 2. A task on a high-priority interrupt executor waits for each edge on
//!    the measurement pin, latches the timebase and publishes the extended
//!    timestamp.
//! 3. The tuner display task polls the frequency meter every 2 ms and
//!    renders a frame every 100 ms.
//!
//! The menu layer, the cross-board status link and persistent storage of
//! the settings are not part of this firmware; settings start at their
//! defaults.

#![no_std]
#![no_main]

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Flex, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::pac;
use embassy_rp::peripherals::I2C0;
use embassy_rp::pwm::{self, Pwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use freq_capture::{
    CaptureChannel, CaptureConfig, CaptureEdge, CaptureSample, CaptureSource, FrequencyMeter,
    MeterConfig,
};
use ht1635_driver::{Ht1635, DEFAULT_ADDRESS};
use tuner_display::{tuner_display_task, RendererConfig, TaskConfig, TunerRenderer};
use tuner_pitch::TunerSettings;

// ---------------------------------------------------------------------------
// Boot block and interrupt binding
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

// ---------------------------------------------------------------------------
// Timebase
// ---------------------------------------------------------------------------

/// PWM slice used as the capture timebase.
const TIMEBASE_SLICE: usize = 0;

/// 150 MHz system clock / 75.
const TIMEBASE_HZ: u32 = 2_000_000;
const TIMEBASE_DIVIDER: u8 = 75;

/// Capture state shared with the wrap interrupt and the capture task.
static CHANNEL: CaptureChannel = CaptureChannel::new();

static CAPTURE_ARMED: AtomicBool = AtomicBool::new(false);
static CAPTURE_FALLING: AtomicBool = AtomicBool::new(false);
static CAPTURE_FILTER: AtomicBool = AtomicBool::new(true);

/// Executor for the capture task, preempting the display task.
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

#[interrupt]
fn PWM_IRQ_WRAP_0() {
    pac::PWM.intr().write(|w| w.set_ch(TIMEBASE_SLICE, true));
    CHANNEL.on_overflow();
}

/// Current counter and whether a wrap is pending. Read in this order, a
/// wrap in between shows up as a high-half counter with the flag set,
/// which `extend_timestamp` keeps in the old epoch.
fn read_timebase() -> (u16, bool) {
    let counter = pac::PWM.ch(TIMEBASE_SLICE).ctr().read().ctr();
    let pending = pac::PWM.intr().read().ch(TIMEBASE_SLICE);
    (counter, pending)
}

/// [`CaptureSource`] over the PWM timebase and the capture task.
struct RpCaptureSource;

impl CaptureSource for RpCaptureSource {
    fn clock_hz(&self) -> u32 {
        TIMEBASE_HZ
    }

    fn configure(&mut self, config: &CaptureConfig) {
        CAPTURE_FALLING.store(config.edge == CaptureEdge::Falling, Ordering::Relaxed);
        CAPTURE_FILTER.store(config.noise_filter, Ordering::Relaxed);
    }

    fn arm(&mut self) {
        critical_section::with(|_| {
            pac::PWM.ch(TIMEBASE_SLICE).ctr().write(|w| w.set_ctr(0));
            pac::PWM.intr().write(|w| w.set_ch(TIMEBASE_SLICE, true));
            CHANNEL.reset();
        });
        CAPTURE_ARMED.store(true, Ordering::Release);
    }

    fn take_sample(&mut self) -> Option<CaptureSample> {
        CHANNEL.try_take()
    }
}

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// View mode and concert A, written by the menu layer, read by the
/// display task.
static SETTINGS: StaticCell<Mutex<CriticalSectionRawMutex, TunerSettings>> = StaticCell::new();

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

type DisplayI2c = I2c<'static, I2C0, i2c::Async>;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Edge capture. Runs on [`EXECUTOR_HIGH`] so the timebase is latched
/// within a few microseconds of the edge.
#[embassy_executor::task]
async fn capture_task(mut pin: Flex<'static>) {
    info!("Capture task started");
    loop {
        pin.set_schmitt(CAPTURE_FILTER.load(Ordering::Relaxed));
        if CAPTURE_FALLING.load(Ordering::Relaxed) {
            pin.wait_for_falling_edge().await;
        } else {
            pin.wait_for_rising_edge().await;
        }

        let (latched, pending) = read_timebase();
        if CAPTURE_ARMED.load(Ordering::Acquire) {
            CHANNEL.on_capture(latched, pending);
        }
    }
}

/// Thin wrapper that monomorphises the generic `tuner_display_task` so it
/// can be spawned as a concrete Embassy task.
#[embassy_executor::task]
async fn tuner_task(
    meter: FrequencyMeter<RpCaptureSource>,
    display: Ht1635<DisplayI2c, Delay>,
    settings: &'static Mutex<CriticalSectionRawMutex, TunerSettings>,
    config: TaskConfig,
) {
    let renderer = TunerRenderer::new(RendererConfig::default());
    tuner_display_task(meter, display, renderer, settings, config).await;
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("tuner-firmware starting");

    // --- Pin assignments ---
    // I2C_SDA  = GP20  (p.PIN_20)
    // I2C_SCL  = GP21  (p.PIN_21)
    // FREQ_IN  = GP15  (p.PIN_15)  square wave from the instrument board

    // HT1635 on I2C0, sole device on the bus.
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = 400_000;
    let i2c = I2c::new_async(p.I2C0, p.PIN_21, p.PIN_20, Irqs, i2c_config);
    let display = Ht1635::new(i2c, Delay, DEFAULT_ADDRESS);

    // --- Timebase ---

    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = TIMEBASE_DIVIDER.into();
    pwm_config.top = u16::MAX;
    // Keep the slice alive for the whole program.
    let timebase = Pwm::new_free(p.PWM_SLICE0, pwm_config);
    core::mem::forget(timebase);

    pac::PWM.irq0_inte().modify(|w| w.set_ch(TIMEBASE_SLICE, true));
    interrupt::PWM_IRQ_WRAP_0.set_priority(Priority::P1);
    // SAFETY: the handler only touches the critical-section capture channel.
    unsafe { interrupt::PWM_IRQ_WRAP_0.enable() };

    // --- Capture ---

    let mut freq_pin = Flex::new(p.PIN_15);
    freq_pin.set_as_input();
    freq_pin.set_pull(Pull::None);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let high_spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    high_spawner.spawn(unwrap!(capture_task(freq_pin)));

    let meter = FrequencyMeter::new(RpCaptureSource, MeterConfig::default());

    // --- Settings ---

    let settings = SETTINGS.init(Mutex::new(TunerSettings::new()));

    // --- Spawn tasks ---

    spawner.spawn(unwrap!(tuner_task(
        meter,
        display,
        settings,
        TaskConfig::default()
    )));

    info!("All tasks spawned");
}
