//! Frequency → 12-TET note mapping.
//!
//! The mapping is pure and stateless: given a frequency and the reference
//! pitch of A4 it yields a [`PitchReading`] holding the nearest note, its
//! octave, the MIDI number and the drift in cents.
//!
//! ```text
//! s     = 12 · log2(freq / concert_a)     semitones from A4
//! midi  = round(69 + s)                   half away from zero
//! note  = NOTE_NAMES[midi mod 12]         C C# D D# E F F# G G# A A# B
//! oct   = floor(midi / 12) − 1           MIDI 69 → A4, MIDI −1 → B−2
//! cents = (69 + s − midi) · 100           clamped to ±49.99
//! ```
//!
//! # Logarithm implementations
//!
//! [`PitchMapper`] is generic over [`Log2`]. [`ExactLog2`] uses `libm`;
//! [`ApproxLog2`] is a branch-light approximation with a documented error
//! bound for targets where `log2f` is expensive. Both satisfy the same
//! monotonicity and error-bound tests.

mod log2;
mod mapper;
mod note;

pub use log2::{ApproxLog2, ExactLog2, Log2, APPROX_LOG2_MAX_ERROR};
pub use mapper::{frequency_of_midi, map_frequency, PitchMapper, PitchReading, LABEL_LEN};
pub use note::NoteName;

/// Reference pitch substituted when the caller supplies an unusable one.
pub const DEFAULT_CONCERT_A: f32 = 440.0;

/// MIDI number of A4.
pub const MIDI_A4: i16 = 69;

/// Lowest frequency the mapper accepts. Anything below maps to `None`.
pub const MIN_MAPPABLE_HZ: f32 = 1.0;

/// Largest reported drift magnitude. Exactly ±50 cents is never reported
/// so a reading sitting on a half-semitone does not flicker between notes.
pub const MAX_CENTS_DRIFT: f32 = 49.99;
