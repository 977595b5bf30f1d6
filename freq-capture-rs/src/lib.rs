//! Period capture and frequency measurement for the tuner display.
//!
//! A square wave whose frequency equals the played pitch is fed to a
//! hardware timer that latches its counter on every rising edge. This
//! crate turns those latched values into a smoothed frequency in Hz.
//!
//! # Architecture
//!
//! ```text
//!  capture IRQ ─┐                      ┌─ FrequencyMeter::poll(now_ms)
//!  overflow IRQ ┴─► CaptureChannel ────┤   (foreground, bounded time)
//!                   (critical section) └─ via a CaptureSource impl
//! ```
//!
//! - [`CaptureChannel`] is the only state shared with interrupt context.
//!   The interrupt side extends the 16-bit latched value to 32 bits with a
//!   software overflow counter and publishes it; the foreground side takes
//!   it with an atomic read-and-clear.
//! - [`CaptureSource`] is the hardware capability consumed by the meter.
//!   Firmware implements it over a real timer; [`sim::SimulatedTimer`]
//!   implements it for host tests.
//! - [`FrequencyMeter`] validates each period against the configured band,
//!   smooths with an exponential moving average and reports
//!   [`NO_SIGNAL`] after a timeout.
//!
//! # Quick start
//!
//! ```
//! use freq_capture::sim::SimulatedTimer;
//! use freq_capture::{FrequencyMeter, MeterConfig, NO_SIGNAL};
//!
//! let mut meter = FrequencyMeter::new(SimulatedTimer::new(2_000_000), MeterConfig::default());
//! meter.initialize(0);
//!
//! // 440 Hz at a 2 MHz tick is a period of ~4545 ticks.
//! for n in 1..=3u64 {
//!     meter.source_mut().edge(n * 4545);
//!     meter.poll(n * 4545 / 2000);
//! }
//! let hz = meter.poll(7);
//! assert!((hz - 440.04).abs() < 0.01);
//! assert_eq!(meter.poll(500), NO_SIGNAL);
//! ```
//!
//! # Crate features
//!
//! - **`defmt`** — [`defmt::Format`] implementations and logging.

#![no_std]

mod capture;
mod meter;
mod source;

pub mod sim;

pub use capture::{extend_timestamp, CaptureChannel, CaptureSample};
pub use meter::{FrequencyEstimate, FrequencyMeter, MeterConfig, NO_SIGNAL};
pub use source::{CaptureConfig, CaptureEdge, CaptureSource};
