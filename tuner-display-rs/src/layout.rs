//! Frame composition for the tuner views.
//!
//! Everything here is pure: functions take a pitch reading (or a piano
//! position) and fill a [`Bitmap`] or return panel rows. No bus traffic.
//!
//! ```text
//!  panel 0   panel 1   panel 2   panel 3   panel 4
//! ┌────────┬────────┬────────┬────────┬────────┐
//! │ letter │ #/blank│ octave │  sign  │ cents  │  numeric
//! │ letter │ #/blank│ octave │ ···bar │ bar··· │  bar graph
//! │        keyboard, cursor on row 6   │ label  │  piano
//! └────────┴────────┴────────┴────────┴────────┘
//! ```

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
};
use ht1635_driver::{Bitmap, PANEL_COUNT, PANEL_ROWS};
use tuner_pitch::{Log2, PitchMapper, PitchReading, DEFAULT_CONCERT_A};

use crate::fonts::{
    tall_letter, text_panel, FLAT_GLYPH, MICRO_DIGITS, NATURALS, SHARP_GLYPH, SMALL_DIGITS,
    SMALL_MINUS, SMALL_PLUS,
};

/// Panel holding the piano-view label.
pub const LABEL_PANEL: usize = 4;

/// Row of the piano-view cursor.
pub const CURSOR_ROW: usize = 6;

/// Cursor positions across the keyboard (panels 0–3, minus the margin).
pub const PIANO_COLUMNS: u8 = 28;

/// Cursor column of each semitone from C to the next C. E–F and B–C have
/// no black key between them, so those steps are twice as wide.
const NOTE_PIXEL_CENTRES: [f32; 13] = [
    2.0, 4.0, 6.0, 8.0, 10.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0, 26.0, 30.0,
];

/// 2^(−9/12): C4 relative to A4.
const C4_FROM_A4: f32 = 0.594_603_56;

/// Bit of the bar-graph centre tick.
const BAR_CENTRE: u32 = 5;

/// Most bar segments on either side of the centre.
const BAR_SIDE: u32 = 5;

// ── Text ─────────────────────────────────────────────────────────────────

/// Fill the frame with up to five characters, one per panel. Missing
/// characters leave their panel blank.
pub fn compose_text(frame: &mut Bitmap, text: &str) {
    let mut chars = text.chars();
    for panel in 0..PANEL_COUNT {
        frame.set_panel(panel, &text_panel(chars.next().unwrap_or(' ')));
    }
}

// ── Numeric and bar graph ────────────────────────────────────────────────

/// Note letter, `#` or blank, and the octave digit (clamped to 0–9) in
/// panels 0–2.
pub fn compose_note_label(frame: &mut Bitmap, reading: &PitchReading) {
    let accidental = if reading.note.is_sharp() { '#' } else { ' ' };
    let octave = char::from(b'0' + reading.octave.clamp(0, 9) as u8);
    frame.set_panel(0, &text_panel(char::from(reading.note.letter())));
    frame.set_panel(1, &text_panel(accidental));
    frame.set_panel(2, &text_panel(octave));
}

/// Sign panel and two-digit panel for a cents drift.
///
/// The sign is `−` only when the rounded drift is negative, so a drift
/// that rounds to zero reads `+00`.
pub fn cents_panels(cents: f32) -> ([u8; PANEL_ROWS], [u8; PANEL_ROWS]) {
    let rounded = libm::roundf(cents);
    let sign = if rounded < 0.0 { SMALL_MINUS } else { SMALL_PLUS };
    let magnitude = libm::fabsf(rounded).min(99.0) as usize;
    let (tens, units) = (magnitude / 10, magnitude % 10);

    let mut sign_rows = [0u8; PANEL_ROWS];
    let mut digit_rows = [0u8; PANEL_ROWS];
    for row in 0..5 {
        sign_rows[row] = SMALL_DIGITS[sign][row];
        digit_rows[row] = (SMALL_DIGITS[tens][row] << 4) | SMALL_DIGITS[units][row];
    }
    (sign_rows, digit_rows)
}

/// Full numeric frame: note label, then signed cents in panels 3–4.
pub fn compose_numeric(frame: &mut Bitmap, reading: &PitchReading) {
    compose_note_label(frame, reading);
    let (sign, digits) = cents_panels(reading.cents);
    frame.set_panel(3, &sign);
    frame.set_panel(4, &digits);
}

/// 11-bit drift bar, bit 10 leftmost.
///
/// Bit 5 is the centre tick and always set. `n = min(5, round(|cents| / 10))`
/// segments extend left of it for a flat drift (bits 6..=5+n) or right of
/// it for a sharp one (bits 5−n..=4), like a needle leaning towards the
/// high side. Drift halfway between segments rounds away from zero.
///
/// ```
/// use tuner_display::layout::bar_mask;
///
/// assert_eq!(bar_mask(0.0), 0b000_0010_0000);
/// assert_eq!(bar_mask(21.0), 0b000_0011_1000);
/// assert_eq!(bar_mask(-21.0), 0b000_1110_0000);
/// ```
pub fn bar_mask(cents: f32) -> u16 {
    let centre = 1u16 << BAR_CENTRE;
    if !cents.is_finite() {
        return centre;
    }
    let n = (libm::roundf(libm::fabsf(cents) / 10.0) as u32).min(BAR_SIDE);
    let segments = (1u16 << n) - 1;
    if cents < 0.0 {
        centre | segments << (BAR_CENTRE + 1)
    } else {
        centre | segments << (BAR_CENTRE - n)
    }
}

/// Full bar-graph frame: note label, then the drift bar on rows 3–4 of
/// panels 3–4 with the centre tick on every row.
pub fn compose_bar(frame: &mut Bitmap, reading: &PitchReading) {
    compose_note_label(frame, reading);
    let mask = bar_mask(reading.cents);
    let centre_tick = (1u16 << BAR_CENTRE) as u8;

    let mut left = [0u8; PANEL_ROWS];
    let mut right = [centre_tick; PANEL_ROWS];
    for row in 3..=4 {
        left[row] = (mask >> 8) as u8;
        right[row] = mask as u8;
    }
    frame.set_panel(3, &left);
    frame.set_panel(4, &right);
}

// ── Piano ────────────────────────────────────────────────────────────────

/// Accidental shown next to the piano-view letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alteration {
    Flat,
    Natural,
    Sharp,
}

/// Piano-view label: natural letter, alteration and octave digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PianoLabel {
    /// Index into [`NATURALS`].
    pub letter: u8,
    pub alteration: Alteration,
    /// 0–9.
    pub octave: u8,
}

impl PianoLabel {
    /// Label for a cursor column and octave (clamped to 0–9).
    ///
    /// Each natural owns four columns; within them the columns read flat,
    /// natural, sharp, sharp. Column 0 is the sharp end of the previous B.
    pub fn for_column(column: u8, octave: i16) -> Self {
        let column = column.min(PIANO_COLUMNS - 1);
        let alteration = match column % 4 {
            1 => Alteration::Flat,
            2 => Alteration::Natural,
            _ => Alteration::Sharp,
        };
        Self {
            letter: ((column + 3) / 4 + 6) % 7,
            alteration,
            octave: octave.clamp(0, 9) as u8,
        }
    }

    pub fn letter_char(&self) -> char {
        NATURALS[self.letter as usize % NATURALS.len()]
    }

    /// Label panel rows: tall letter in the left columns, the alteration
    /// top right and the octave bottom right.
    pub fn rows(&self) -> [u8; PANEL_ROWS] {
        let letter = tall_letter(self.letter as usize);
        let alteration = match self.alteration {
            Alteration::Flat => Some(&FLAT_GLYPH),
            Alteration::Natural => None,
            Alteration::Sharp => Some(&SHARP_GLYPH),
        };
        let octave = &MICRO_DIGITS[self.octave.min(9) as usize];

        let mut rows = [0u8; PANEL_ROWS];
        for (i, row) in rows.iter_mut().enumerate() {
            if (1..=6).contains(&i) {
                *row |= letter[i - 1] << 5;
            }
            if let Some(glyph) = alteration.filter(|_| i < 3) {
                *row |= glyph[i];
            }
            if i > 3 {
                *row |= octave[i - 4];
            }
        }
        rows
    }
}

/// Cursor column and label for a frequency in the piano view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PianoPosition {
    /// 0..[`PIANO_COLUMNS`].
    pub column: u8,
    pub label: PianoLabel,
}

/// Place `freq` on the keyboard.
///
/// The semitone offset from C4 is split into a whole semitone (which fixes
/// the octave, so B♯ does not jump early) and a fraction used to
/// interpolate between the two neighbouring pixel centres. Returns `None`
/// if the offset is not finite.
pub fn piano_position<L: Log2>(
    mapper: &PitchMapper<L>,
    freq: f32,
    concert_a: f32,
) -> Option<PianoPosition> {
    let concert_a = if concert_a.is_finite() && concert_a > 0.0 {
        concert_a
    } else {
        DEFAULT_CONCERT_A
    };
    let semitones = mapper.semitones_from(freq, concert_a * C4_FROM_A4)?;

    let base = libm::floorf(semitones);
    let frac = (semitones - base).clamp(0.0, 1.0);
    let base = base as i32;
    let idx = base.rem_euclid(12) as usize;
    let column_f = NOTE_PIXEL_CENTRES[idx] * (1.0 - frac) + NOTE_PIXEL_CENTRES[idx + 1] * frac;
    let column = (libm::floorf(column_f + 0.5) as i32).clamp(0, PIANO_COLUMNS as i32 - 1) as u8;

    let octave = (base.saturating_add(60).div_euclid(12) - 1).clamp(0, 9) as i16;
    Some(PianoPosition {
        column,
        label: PianoLabel::for_column(column, octave),
    })
}

/// Frame byte index and bit mask of the cursor at `column`.
pub fn cursor_byte(column: u8) -> (usize, u8) {
    let column = column.min(PIANO_COLUMNS - 1) as usize;
    ((column / 8) * PANEL_ROWS + CURSOR_ROW, 0x80 >> (column % 8))
}

/// Keyboard outline on panels 0–3: black keys on rows 0–3, key
/// separators below them, row 6 left free for the cursor.
pub fn keyboard_background() -> Bitmap {
    let mut frame = Bitmap::new();
    let on = PrimitiveStyle::with_fill(BinaryColor::On);
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

    // C♯ D♯ F♯ G♯ A♯
    for x in [3, 7, 15, 19, 23] {
        let _ = Rectangle::new(Point::new(x, 0), Size::new(2, 4))
            .into_styled(on)
            .draw(&mut frame);
    }
    // B|C and E|F have no black key: full-height separator.
    for x in [0, 12] {
        let _ = Line::new(Point::new(x, 0), Point::new(x, 5))
            .into_styled(stroke)
            .draw(&mut frame);
    }
    for x in [4, 8, 16, 20, 24] {
        let _ = Line::new(Point::new(x, 4), Point::new(x, 5))
            .into_styled(stroke)
            .draw(&mut frame);
    }
    frame
}
