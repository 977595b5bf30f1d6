//! Tuner views for the 5-panel HT1635 LED display.
//!
//! Turns a measured frequency into display writes in one of three views:
//!
//! - **Numeric**: note name and octave, then the signed drift in cents.
//! - **Bar graph**: note name and octave, then an 11-segment drift bar.
//! - **Piano**: a keyboard with a cursor sliding between the keys and a
//!   compact note label. Only the bytes that changed are sent.
//!
//! # Architecture
//!
//! - **[`fonts`]**: glyph tables for the 8×8 panels.
//! - **[`layout`]**: pure frame composition per view.
//! - **[`TunerRenderer`]**: view selection, the redraw cache and the
//!   writes to [`Ht1635`](ht1635_driver::Ht1635).
//! - **`tuner_display_task`** (feature `task`): the periodic poll and
//!   render loop for Embassy firmware.
//!
//! # Crate features
//!
//! - **`defmt`**: [`defmt::Format`] implementations and logging.
//! - **`task`**: the Embassy display task (pulls in `embassy-sync`,
//!   `embassy-time` and `freq-capture`).

#![no_std]

pub mod fonts;
pub mod layout;

mod config;
mod renderer;

#[cfg(feature = "task")]
mod display_task;

pub use config::{RendererConfig, TaskConfig};
pub use renderer::{RenderState, TunerRenderer};

#[cfg(feature = "task")]
pub use display_task::tuner_display_task;
