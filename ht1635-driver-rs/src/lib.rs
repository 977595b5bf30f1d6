//! Async driver for the Holtek HT1635 LED matrix controller.
//!
//! The tuner display is five 8×8 LED panels side by side (40×8 pixels)
//! behind one HT1635 on I2C. This crate provides the controller's command
//! set and a RAM write path sized for that layout.
//!
//! # Architecture
//!
//! - **`driver`** (crate-private): framing of command and RAM-write
//!   transactions and the mandatory inter-transaction delay.
//! - **[`Ht1635`]**: register mirror, configuration commands, bulk and
//!   single-byte RAM writes, re-initialisation and the fade-in effect.
//! - **[`Bitmap`]**: the 40-byte frame. Byte `panel · 8 + row` holds one
//!   panel row with the leftmost column in the MSB. Implements
//!   [`DrawTarget`](embedded_graphics::draw_target::DrawTarget) so frames can
//!   be composed with `embedded-graphics`.
//!
//! # Quick start
//!
//! ```no_run
//! use ht1635_driver::{Bitmap, Ht1635, DEFAULT_ADDRESS};
//!
//! # async fn example<I: embedded_hal_async::i2c::I2c, D: embedded_hal_async::delay::DelayNs>(i2c: I, delay: D) -> Result<(), ht1635_driver::Ht1635Error<I::Error>> {
//! let mut display = Ht1635::new(i2c, delay, DEFAULT_ADDRESS);
//! display.reinitialize().await?;
//!
//! let mut frame = Bitmap::new();
//! frame.set_pixel(0, 0, true);
//! display.write_bitmap(&frame, 0).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: [`defmt::Format`] implementations and logging.
//! - **`mock`**: [`mock::MockI2c`] and [`mock::MockDelay`] for host tests.

#![no_std]

pub use bitmap::{Bitmap, BITMAP_HEIGHT, BITMAP_WIDTH};
pub use error::Ht1635Error;
pub use ht1635::Ht1635;
pub use registers::{
    BlinkRate, CascadeMode, ComPins, DeviceRegisters, PowerMode, BITMAP_LEN, DEFAULT_ADDRESS,
    PANEL_COUNT, PANEL_ROWS, PWM_MAX, RAM_BYTES,
};

mod bitmap;
mod driver;
mod error;
mod ht1635;
mod registers;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
