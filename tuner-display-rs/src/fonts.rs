//! Bitmap glyph tables for the 8×8 panels.
//!
//! Text is drawn with the embedded-graphics `FONT_5X7`, one character
//! per panel. The smaller glyphs have no embedded-graphics counterpart and
//! are stored as row bit patterns with the glyph's leftmost column in the
//! highest used bit:
//!
//! | Font | Cell | Use |
//! |---|---|---|
//! | [`text_panel`] | 5×7 | status text and the numeric note label |
//! | [`SMALL_DIGITS`] | 3×5 | numeric cents, two per panel (one per nibble) |
//! | [`tall_letter`] | 3×6 | piano-view note letter |
//! | [`MICRO_DIGITS`] | 3×4 | piano-view octave |

use embedded_graphics::{
    mono_font::{ascii::FONT_5X7, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use ht1635_driver::{Bitmap, PANEL_ROWS};

// ── 5×7 text ─────────────────────────────────────────────────────────────

const PANEL_WIDTH: i32 = 8;

/// Column of the glyph's left edge within its panel.
const TEXT_LEFT: i32 = 1;

/// Draw `c` into `panel` of `frame`, columns 1–5 and rows 0–6. Pixels
/// already set are left alone.
pub fn draw_char(frame: &mut Bitmap, panel: usize, c: char) {
    let mut utf8 = [0u8; 4];
    let style = MonoTextStyle::new(&FONT_5X7, BinaryColor::On);
    let origin = Point::new(panel as i32 * PANEL_WIDTH + TEXT_LEFT, 0);
    Text::with_baseline(c.encode_utf8(&mut utf8), origin, style, Baseline::Top)
        .draw(frame)
        .ok();
}

/// One panel showing `c`.
pub fn text_panel(c: char) -> [u8; PANEL_ROWS] {
    let mut scratch = Bitmap::new();
    draw_char(&mut scratch, 0, c);
    scratch.panel(0).copied().unwrap_or([0; PANEL_ROWS])
}

// ── 3×5 small digits ─────────────────────────────────────────────────────

/// 3×5 digits `0`–`9`, then `+` and `−`; bit 2 is the leftmost column.
pub const SMALL_DIGITS: [[u8; 5]; 12] = [
    [7, 5, 5, 5, 7],
    [2, 6, 2, 2, 7],
    [7, 1, 7, 4, 7],
    [7, 1, 3, 1, 7],
    [5, 5, 7, 1, 1],
    [7, 4, 7, 1, 7],
    [7, 4, 7, 5, 7],
    [7, 1, 1, 2, 2],
    [7, 5, 7, 5, 7],
    [7, 5, 7, 1, 7],
    [0, 2, 7, 2, 0],
    [0, 0, 7, 0, 0],
];

pub const SMALL_PLUS: usize = 10;
pub const SMALL_MINUS: usize = 11;

// ── 3×6 tall note letters ────────────────────────────────────────────────

/// Natural note letters in keyboard order.
pub const NATURALS: [char; 7] = ['C', 'D', 'E', 'F', 'G', 'A', 'B'];

const TALL_LETTERS: [[u8; 6]; 7] = [
    [7, 4, 4, 4, 4, 7],
    [6, 5, 5, 5, 5, 6],
    [7, 4, 6, 4, 4, 7],
    [7, 4, 6, 4, 4, 4],
    [7, 4, 4, 5, 5, 7],
    [2, 5, 5, 7, 5, 5],
    [6, 5, 6, 5, 5, 6],
];

/// 3×6 glyph of the natural note at `index` into [`NATURALS`]; wraps.
pub fn tall_letter(index: usize) -> &'static [u8; 6] {
    &TALL_LETTERS[index % TALL_LETTERS.len()]
}

// ── 3×3 alterations ──────────────────────────────────────────────────────

pub const SHARP_GLYPH: [u8; 3] = [5, 7, 5];
pub const FLAT_GLYPH: [u8; 3] = [4, 6, 6];

// ── 3×4 micro digits ─────────────────────────────────────────────────────

/// 3×4 digits `0`–`9` for the piano-view octave.
pub const MICRO_DIGITS: [[u8; 4]; 10] = [
    [7, 5, 5, 7],
    [6, 2, 2, 7],
    [6, 1, 2, 7],
    [7, 3, 1, 7],
    [5, 5, 7, 1],
    [7, 6, 1, 6],
    [4, 7, 5, 7],
    [7, 1, 2, 2],
    [7, 7, 5, 7],
    [7, 5, 7, 1],
];
