//! Pitch mapping and tuner settings for the LED tuner display.
//!
//! - [`pitch`] maps a measured frequency and a concert-pitch reference to
//!   the nearest equal-tempered note, its octave, MIDI number and cents
//!   drift. The mapping is generic over a [`Log2`] implementation so the
//!   full-precision and the cheap approximate logarithm can be swapped.
//! - [`settings`] holds the two user-facing settings (view mode and concert
//!   A) with change tracking for the display and for persistent storage.
//!
//! # Quick start
//!
//! ```
//! use tuner_pitch::{map_frequency, NoteName};
//!
//! let reading = map_frequency(440.0, 440.0).unwrap();
//! assert_eq!(reading.note, NoteName::A);
//! assert_eq!(reading.octave, 4);
//! assert_eq!(reading.midi, 69);
//! ```
//!
//! # Crate features
//!
//! - **`defmt`** — [`defmt::Format`] implementations and logging.

#![no_std]

pub mod pitch;
pub mod settings;

pub use pitch::{
    frequency_of_midi, map_frequency, ApproxLog2, ExactLog2, Log2, NoteName, PitchMapper,
    PitchReading, DEFAULT_CONCERT_A, LABEL_LEN,
};
pub use settings::{SettingsError, StoredSettings, TunerSettings, ViewMode};
