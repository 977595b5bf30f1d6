//! Periodic tuner display task.
//!
//! Polls the [`FrequencyMeter`] at a short fixed period and renders a frame
//! at a longer one, picking up view-mode and concert-A changes from the
//! shared [`TunerSettings`] between frames.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use freq_capture::{CaptureSource, FrequencyMeter};
use ht1635_driver::Ht1635;
use tuner_pitch::{Log2, TunerSettings};

use crate::config::TaskConfig;
use crate::renderer::TunerRenderer;

// ── Display task ─────────────────────────────────────────────────────────

/// Tuner foreground loop.
///
/// This is a regular `async fn`, not an Embassy `#[task]`. Embassy tasks
/// cannot be generic, so callers wrap it in a concrete task:
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn tuner_task(
///     meter: FrequencyMeter<RpCaptureSource>,
///     display: Ht1635<I2c<'static, I2C0, Async>, Delay>,
///     settings: &'static Mutex<CriticalSectionRawMutex, TunerSettings>,
/// ) {
///     let renderer = TunerRenderer::new(RendererConfig::default());
///     tuner_display_task(meter, display, renderer, settings, TaskConfig::default()).await;
/// }
/// ```
///
/// # Control flow
///
/// 1. Re-initialise the HT1635 and optionally fade in the splash.
/// 2. Apply the stored view mode and arm the meter.
/// 3. Every `poll_period_ms`: poll the meter.
/// 4. Every `render_period_ms`:
///    - Lock `settings`, take a pending view-mode change and read
///      concert A. Release the mutex.
///    - Render the latest frequency (no mutex held during I2C).
///
/// # Errors
///
/// * Display initialisation failure: logs the error and **returns**.
/// * Splash or frame failure: logs the error and continues.
pub async fn tuner_display_task<S, I2C, D, L>(
    mut meter: FrequencyMeter<S>,
    mut display: Ht1635<I2C, D>,
    mut renderer: TunerRenderer<L>,
    settings: &'static Mutex<CriticalSectionRawMutex, TunerSettings>,
    config: TaskConfig,
) where
    S: CaptureSource,
    I2C: I2c,
    D: DelayNs,
    L: Log2,
{
    // ── Initialisation ───────────────────────────────────────────────
    if let Err(_e) = display.reinitialize().await {
        #[cfg(feature = "defmt")]
        defmt::error!("HT1635 init failed: {}", defmt::Debug2Format(&_e));
        return;
    }

    #[cfg(feature = "defmt")]
    defmt::info!("HT1635 initialised");

    if config.splash {
        if let Err(_e) = renderer.show_splash(&mut display).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("splash failed: {}", defmt::Debug2Format(&_e));
        }
    }

    {
        let mut settings = settings.lock().await;
        let _ = settings.take_display_change();
        renderer.set_mode(settings.view_mode());
    }

    meter.initialize(Instant::now().as_millis());

    let mut ticker = Ticker::every(Duration::from_millis(config.poll_period_ms.max(1)));
    let polls_per_frame = config.polls_per_frame();
    let mut polls = 0u64;

    // ── Main loop ────────────────────────────────────────────────────
    loop {
        ticker.next().await;

        let hz = meter.poll(Instant::now().as_millis());
        polls += 1;
        if polls < polls_per_frame {
            continue;
        }
        polls = 0;

        // ── Settings (mutex held briefly) ────────────────────────────
        let (mode_change, concert_a) = {
            let mut settings = settings.lock().await;
            (settings.take_display_change(), settings.concert_a())
        };
        if let Some(mode) = mode_change {
            renderer.set_mode(mode);
        }

        // ── Frame (no mutex held) ────────────────────────────────────
        if let Err(_e) = renderer.render(&mut display, hz, concert_a).await {
            #[cfg(feature = "defmt")]
            defmt::error!("frame failed: {}", defmt::Debug2Format(&_e));
        }
    }
}
