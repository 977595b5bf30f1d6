use core::fmt::Write;

use heapless::String;

use super::log2::{ExactLog2, Log2};
use super::note::NoteName;
use super::{DEFAULT_CONCERT_A, MAX_CENTS_DRIFT, MIDI_A4, MIN_MAPPABLE_HZ};

/// Longest [`PitchReading::label`]: a two-byte note name and an `i8`
/// octave such as `-128`.
pub const LABEL_LEN: usize = 6;

/// A frequency mapped onto the equal-tempered scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PitchReading {
    /// Nearest pitch class.
    pub note: NoteName,
    /// Scientific octave number (MIDI 60 = C4), `floor(midi / 12) − 1`.
    /// Flooring keeps every octave twelve notes wide below MIDI 0, so
    /// MIDI −1 is B−2.
    pub octave: i8,
    /// Nearest MIDI note number.
    pub midi: i16,
    /// Drift from the nearest note in cents, within `[-49.99, 49.99]`.
    /// Positive is sharp.
    pub cents: f32,
}

impl PitchReading {
    /// Note name and octave, e.g. `"A#4"` or `"C-1"`.
    pub fn label(&self) -> String<LABEL_LEN> {
        let mut label = String::new();
        let written = write!(label, "{}{}", self.note.as_str(), self.octave);
        debug_assert!(written.is_ok(), "label overflow");
        label
    }
}

/// Frequency → note mapper parameterised over the logarithm used.
///
/// # Example
///
/// ```
/// use tuner_pitch::{ApproxLog2, NoteName, PitchMapper};
///
/// let mapper = PitchMapper::new(ApproxLog2);
/// let reading = mapper.map(220.0, 440.0).unwrap();
/// assert_eq!((reading.note, reading.octave, reading.midi), (NoteName::A, 3, 57));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchMapper<L = ExactLog2> {
    log2: L,
}

impl<L: Log2> PitchMapper<L> {
    pub const fn new(log2: L) -> Self {
        Self { log2 }
    }

    /// Semitones of `freq` above `reference` (negative below).
    ///
    /// Returns `None` if the ratio or its logarithm is not finite.
    pub fn semitones_from(&self, freq: f32, reference: f32) -> Option<f32> {
        let semitones = 12.0 * self.log2.log2(freq / reference);
        semitones.is_finite().then_some(semitones)
    }

    /// Map `freq` against the reference pitch `concert_a` (A4).
    ///
    /// Returns `None` for a non-finite `freq` or one below 1 Hz. A
    /// non-finite or non-positive `concert_a` is replaced by
    /// [`DEFAULT_CONCERT_A`].
    pub fn map(&self, freq: f32, concert_a: f32) -> Option<PitchReading> {
        if !freq.is_finite() || freq < MIN_MAPPABLE_HZ {
            return None;
        }
        let concert_a = sanitize_concert_a(concert_a);

        let midi_f = MIDI_A4 as f32 + self.semitones_from(freq, concert_a)?;
        // libm::roundf rounds half away from zero.
        let midi_rounded = libm::roundf(midi_f);
        if !(i16::MIN as f32..=i16::MAX as f32).contains(&midi_rounded) {
            return None;
        }
        let midi = midi_rounded as i16;
        let octave = midi.div_euclid(12) - 1;

        let cents = ((midi_f - midi_rounded) * 100.0).clamp(-MAX_CENTS_DRIFT, MAX_CENTS_DRIFT);

        Some(PitchReading {
            note: NoteName::from_index(midi.rem_euclid(12) as u8),
            octave: i8::try_from(octave).unwrap_or(if octave < 0 { i8::MIN } else { i8::MAX }),
            midi,
            cents,
        })
    }
}

/// Map with the full-precision logarithm.
///
/// Shorthand for `PitchMapper::new(ExactLog2).map(freq, concert_a)`.
pub fn map_frequency(freq: f32, concert_a: f32) -> Option<PitchReading> {
    PitchMapper::new(ExactLog2).map(freq, concert_a)
}

/// Equal-tempered frequency of a MIDI note for the given reference pitch.
pub fn frequency_of_midi(midi: i16, concert_a: f32) -> f32 {
    let concert_a = sanitize_concert_a(concert_a);
    concert_a * libm::exp2f((midi - MIDI_A4) as f32 / 12.0)
}

pub(crate) fn sanitize_concert_a(concert_a: f32) -> f32 {
    if concert_a.is_finite() && concert_a > 0.0 {
        concert_a
    } else {
        DEFAULT_CONCERT_A
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::ApproxLog2;

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} ± {}, got {}",
            expected,
            tolerance,
            actual
        );
    }

    // ── Concrete cases ───────────────────────────────────────────────

    #[test]
    fn concert_a_maps_to_a4() {
        let r = map_frequency(440.0, 440.0).unwrap();
        assert_eq!(r.note, NoteName::A);
        assert_eq!(r.octave, 4);
        assert_eq!(r.midi, 69);
        assert_eq!(r.cents, 0.0);
        assert_eq!(r.label().as_str(), "A4");
    }

    #[test]
    fn octave_below_concert_a() {
        let r = map_frequency(220.0, 440.0).unwrap();
        assert_eq!((r.note, r.octave, r.midi), (NoteName::A, 3, 57));
        assert_close(r.cents, 0.0, 1e-3);
    }

    #[test]
    fn a_sharp_4() {
        let r = map_frequency(466.16, 440.0).unwrap();
        assert_eq!((r.note, r.octave, r.midi), (NoteName::ASharp, 4, 70));
        assert_close(r.cents, 0.0, 0.05);
        assert_eq!(r.label().as_str(), "A#4");
    }

    #[test]
    fn middle_c() {
        let r = map_frequency(261.63, 440.0).unwrap();
        assert_eq!((r.note, r.octave, r.midi), (NoteName::C, 4, 60));
    }

    #[test]
    fn sharp_and_flat_drift_sign() {
        // 10 cents sharp and flat of A4.
        let sharp = map_frequency(440.0 * libm::exp2f(10.0 / 1200.0), 440.0).unwrap();
        assert_close(sharp.cents, 10.0, 0.01);
        let flat = map_frequency(440.0 * libm::exp2f(-10.0 / 1200.0), 440.0).unwrap();
        assert_close(flat.cents, -10.0, 0.01);
        assert_eq!(sharp.midi, 69);
        assert_eq!(flat.midi, 69);
    }

    // ── Invalid input ────────────────────────────────────────────────

    #[test]
    fn rejects_unmappable_frequencies() {
        assert!(map_frequency(0.0, 440.0).is_none());
        assert!(map_frequency(0.999, 440.0).is_none());
        assert!(map_frequency(-440.0, 440.0).is_none());
        assert!(map_frequency(f32::NAN, 440.0).is_none());
        assert!(map_frequency(f32::INFINITY, 440.0).is_none());
    }

    #[test]
    fn one_hz_is_mappable() {
        let r = map_frequency(1.0, 440.0).unwrap();
        assert_eq!(r.midi, -36);
        assert_eq!(r.note, NoteName::C);
        assert_eq!(r.octave, -4);
    }

    #[test]
    fn invalid_concert_a_falls_back_to_default() {
        let expected = map_frequency(523.25, DEFAULT_CONCERT_A).unwrap();
        for bad in [0.0, -440.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert_eq!(map_frequency(523.25, bad).unwrap(), expected);
        }
    }

    #[test]
    fn custom_concert_a_shifts_reference() {
        let r = map_frequency(432.0, 432.0).unwrap();
        assert_eq!((r.note, r.octave, r.midi), (NoteName::A, 4, 69));
        assert_eq!(r.cents, 0.0);

        // 440 Hz is about 31.8 cents sharp of A4 at A = 432.
        let r = map_frequency(440.0, 432.0).unwrap();
        assert_eq!(r.midi, 69);
        assert_close(r.cents, 31.77, 0.05);
    }

    // ── Properties ───────────────────────────────────────────────────

    #[test]
    fn doubling_frequency_adds_one_octave() {
        for &a in &[430.0f32, 440.0, 445.0] {
            let mut f = 31.0f32;
            while f < 5000.0 {
                let x = f;
                f *= 1.013;
                let low = map_frequency(x, a).unwrap();
                if low.cents.abs() > 49.0 {
                    // Rounding may go either way this close to a half step.
                    continue;
                }
                let high = map_frequency(2.0 * x, a).unwrap();
                assert_eq!(low.note, high.note, "f = {}", x);
                assert_eq!(low.octave + 1, high.octave, "f = {}", x);
                assert_eq!(low.midi + 12, high.midi, "f = {}", x);
                assert_close(low.cents, high.cents, 1e-2);
            }
        }
    }

    #[test]
    fn cents_never_reach_half_semitone() {
        let mut f = 1.0f32;
        while f < 20_000.0 {
            let r = map_frequency(f, 440.0).unwrap();
            assert!(r.cents > -50.0 && r.cents < 50.0, "f = {}", f);
            assert!(r.cents.abs() <= MAX_CENTS_DRIFT);
            f *= 1.0011;
        }
    }

    #[test]
    fn exact_half_semitone_is_clamped() {
        // Exactly between A4 and A#4.
        let r = map_frequency(440.0 * libm::exp2f(0.5 / 12.0), 440.0).unwrap();
        assert!(r.cents.abs() <= MAX_CENTS_DRIFT);
        assert!(r.midi == 69 || r.midi == 70);
    }

    #[test]
    fn midi_round_trip() {
        for midi in 12i16..=120 {
            let f = frequency_of_midi(midi, 440.0);
            let r = map_frequency(f, 440.0).unwrap();
            assert_eq!(r.midi, midi);
            assert_eq!(r.note, NoteName::from_index(midi.rem_euclid(12) as u8));
            assert_eq!(r.octave as i16, midi / 12 - 1);
            assert_close(r.cents, 0.0, 0.01);
        }
    }

    #[test]
    fn approx_mapper_agrees_with_exact() {
        let approx = PitchMapper::new(ApproxLog2);
        for midi in 24i16..=108 {
            // Stay clear of the rounding boundary so both agree on the note.
            let f = frequency_of_midi(midi, 440.0) * libm::exp2f(17.0 / 1200.0);
            let exact = map_frequency(f, 440.0).unwrap();
            let cheap = approx.map(f, 440.0).unwrap();
            assert_eq!(exact.midi, cheap.midi);
            assert_close(cheap.cents, exact.cents, 0.05);
        }
    }

    #[test]
    fn semitones_from_reference() {
        let mapper = PitchMapper::new(ExactLog2);
        assert_close(mapper.semitones_from(880.0, 440.0).unwrap(), 12.0, 1e-4);
        assert!(mapper.semitones_from(0.0, 440.0).is_none());
    }

    #[test]
    fn octaves_below_midi_zero_floor() {
        let r = map_frequency(frequency_of_midi(0, 440.0), 440.0).unwrap();
        assert_eq!((r.note, r.octave), (NoteName::C, -1));
        let r = map_frequency(frequency_of_midi(-1, 440.0), 440.0).unwrap();
        assert_eq!((r.note, r.octave), (NoteName::B, -2));
        let r = map_frequency(frequency_of_midi(-12, 440.0), 440.0).unwrap();
        assert_eq!((r.note, r.octave), (NoteName::C, -2));
        assert_eq!(r.label().as_str(), "C-2");
    }

    #[test]
    fn largest_frequency_keeps_octave_in_range() {
        let r = map_frequency(f32::MAX, 440.0).unwrap();
        assert_eq!(r.octave as i16, r.midi.div_euclid(12) - 1);
        assert!(r.octave > 100);
    }

    #[test]
    fn widest_label_fits() {
        let r = PitchReading {
            note: NoteName::CSharp,
            octave: i8::MIN,
            midi: 0,
            cents: 0.0,
        };
        assert_eq!(r.label().as_str(), "C#-128");
    }

    #[test]
    fn negative_octave_label() {
        let r = map_frequency(frequency_of_midi(1, 440.0), 440.0).unwrap();
        assert_eq!(r.octave, -1);
        assert_eq!(r.label().as_str(), "C#-1");
    }
}
