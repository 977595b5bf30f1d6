//! The 40×8 frame buffer.

use core::convert::Infallible;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};

use crate::registers::{BITMAP_LEN, PANEL_COUNT, PANEL_ROWS};

/// Frame width in pixels.
pub const BITMAP_WIDTH: u32 = (PANEL_COUNT * 8) as u32;

/// Frame height in pixels.
pub const BITMAP_HEIGHT: u32 = PANEL_ROWS as u32;

/// One full display frame.
///
/// Byte `panel · 8 + row` holds one row of one panel; bit 7 is the panel's
/// leftmost column. Panel 0 is on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bitmap([u8; BITMAP_LEN]);

impl Default for Bitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl Bitmap {
    /// All pixels off.
    pub const fn new() -> Self {
        Self([0; BITMAP_LEN])
    }

    pub const fn from_bytes(bytes: [u8; BITMAP_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; BITMAP_LEN] {
        &self.0
    }

    pub fn bytes_mut(&mut self) -> &mut [u8; BITMAP_LEN] {
        &mut self.0
    }

    pub fn clear(&mut self) {
        self.0 = [0; BITMAP_LEN];
    }

    /// Byte at `index`, or `None` past the end of the frame.
    pub fn byte(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied()
    }

    /// Set the byte at `index`. Out-of-range indices are ignored.
    pub fn set_byte(&mut self, index: usize, value: u8) {
        if let Some(b) = self.0.get_mut(index) {
            *b = value;
        }
    }

    /// The eight row bytes of `panel`, top row first.
    pub fn panel(&self, panel: usize) -> Option<&[u8; PANEL_ROWS]> {
        let start = panel.checked_mul(PANEL_ROWS)?;
        let end = start.checked_add(PANEL_ROWS)?;
        self.0.get(start..end)?.try_into().ok()
    }

    /// Replace the rows of `panel`. Ignored if `panel >= PANEL_COUNT`.
    pub fn set_panel(&mut self, panel: usize, rows: &[u8; PANEL_ROWS]) {
        if panel < PANEL_COUNT {
            let start = panel * PANEL_ROWS;
            self.0[start..start + PANEL_ROWS].copy_from_slice(rows);
        }
    }

    /// Byte index and bit mask of pixel `(x, y)`.
    fn locate(x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= BITMAP_WIDTH || y >= BITMAP_HEIGHT {
            return None;
        }
        let index = (x as usize / 8) * PANEL_ROWS + y as usize;
        Some((index, 0x80 >> (x % 8)))
    }

    /// Whether pixel `(x, y)` is lit. Out-of-bounds pixels read as off.
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        Self::locate(x, y).is_some_and(|(i, mask)| self.0[i] & mask != 0)
    }

    /// Light or clear pixel `(x, y)`. Out-of-bounds pixels are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if let Some((i, mask)) = Self::locate(x, y) {
            if on {
                self.0[i] |= mask;
            } else {
                self.0[i] &= !mask;
            }
        }
    }
}

impl OriginDimensions for Bitmap {
    fn size(&self) -> Size {
        Size::new(BITMAP_WIDTH, BITMAP_HEIGHT)
    }
}

impl DrawTarget for Bitmap {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.0 = [if color.is_on() { 0xFF } else { 0x00 }; BITMAP_LEN];
        Ok(())
    }
}
