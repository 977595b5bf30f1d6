//! Pitch sweep demo
//!
//! Standalone hardware demonstration that drives [`TunerRenderer`] with a
//! synthetic pitch instead of the frequency meter. The pitch glides up two
//! octaves from A2 and back, and the view mode advances after every pass,
//! so all three views can be checked on the LED panels without an
//! instrument attached.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes              |
//! |-----------|------------|--------------------|
//! | I2C0 SDA  | GP20       |                    |
//! | I2C0 SCL  | GP21       |                    |
//! | LED VCC   | 5V         | via level shifter  |
//! | LED GND   | GND        |                    |
//!
//! # Sweep
//!
//! | Property      | Value                        |
//! |---------------|------------------------------|
//! | Start note    | A2 (MIDI 45)                 |
//! | Range         | 24 semitones                 |
//! | Step          | 5 cents                      |
//! | Frame period  | 20 ms                        |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use ht1635_driver::{Ht1635, DEFAULT_ADDRESS};
use tuner_display::{RendererConfig, TunerRenderer};
use tuner_pitch::{frequency_of_midi, ViewMode, DEFAULT_CONCERT_A};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

const START_MIDI: i16 = 45;
const RANGE_CENTS: i32 = 2400;
const STEP_CENTS: i32 = 5;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Sweep demo starting");

    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        config,
    );

    let mut display = Ht1635::new(i2c, Delay, DEFAULT_ADDRESS);
    display.reinitialize().await.expect("HT1635 init failed");
    info!("HT1635 initialised");

    let mut renderer = TunerRenderer::new(RendererConfig::default());
    renderer.show_splash(&mut display).await.ok();

    let base = frequency_of_midi(START_MIDI, DEFAULT_CONCERT_A);
    let mut mode = ViewMode::default();
    let mut offset: i32 = 0;
    let mut step = STEP_CENTS;

    loop {
        let freq = base * libm::exp2f(offset as f32 / 1200.0);
        if let Err(e) = renderer.render(&mut display, freq, DEFAULT_CONCERT_A).await {
            warn!("render failed: {}", e);
        }

        offset += step;
        if offset >= RANGE_CENTS || offset <= 0 {
            step = -step;
            if offset <= 0 {
                mode = mode.next();
                renderer.set_mode(mode);
                info!("view mode: {}", mode.as_str());
            }
        }

        Timer::after(Duration::from_millis(20)).await;
    }
}

