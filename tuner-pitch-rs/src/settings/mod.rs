//! User-facing tuner settings with change tracking.
//!
//! [`TunerSettings`] holds the active [`ViewMode`] and the concert-pitch
//! reference. It is shared between the menu layer (which edits it), the
//! display task (which applies view changes between frames) and the
//! persistent-storage layer.
//!
//! # Change tracking
//!
//! Every edit raises two independent flags:
//!
//! - **display**: the renderer must switch mode and redraw in full.
//! - **store**: the new values must be written to persistent storage.
//!
//! Consumers call [`TunerSettings::take_display_change()`] or
//! [`TunerSettings::take_store_change()`] to read and clear their own
//! flag. Values restored with [`TunerSettings::from_stored()`] raise only
//! the display flag, so they are never written straight back.

mod error;
mod store;
mod view_mode;

pub use error::SettingsError;
pub use store::{StoredSettings, TunerSettings};
pub use view_mode::ViewMode;

/// Lowest accepted concert-A reference in Hz (inclusive).
pub const CONCERT_A_MIN: f32 = 300.0;

/// Highest accepted concert-A reference in Hz (inclusive).
pub const CONCERT_A_MAX: f32 = 600.0;

/// Concert-A presets offered by the menu, in cycling order.
pub const CONCERT_A_PRESETS: [f32; 4] = [440.0, 445.0, 430.0, 432.0];

/// `true` if `hz` is finite and within `[CONCERT_A_MIN, CONCERT_A_MAX]`.
pub fn is_valid_concert_a(hz: f32) -> bool {
    (CONCERT_A_MIN..=CONCERT_A_MAX).contains(&hz)
}
