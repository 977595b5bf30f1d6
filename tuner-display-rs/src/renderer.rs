//! The mode-switchable tuner renderer.
//!
//! [`TunerRenderer`] turns a measured frequency into display writes. It
//! keeps a mirror of the 40-byte frame and a small [`RenderState`] cache
//! so the piano view only sends the bytes that changed. Numeric and bar
//! views rewrite the whole frame every call.

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use ht1635_driver::{Bitmap, Ht1635, Ht1635Error, BITMAP_WIDTH, PANEL_ROWS};
use tuner_pitch::{ExactLog2, Log2, PitchMapper, ViewMode};

use crate::config::RendererConfig;
use crate::layout::{
    compose_bar, compose_numeric, compose_text, cursor_byte, keyboard_background,
    piano_position, PianoLabel, PianoPosition, LABEL_PANEL,
};

// ── RenderState ──────────────────────────────────────────────────────────

/// What the renderer believes is on screen.
///
/// A cache only: [`invalidate`](Self::invalidate) at any time just costs
/// a full redraw on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderState {
    prev_column: Option<u8>,
    prev_label: Option<PianoLabel>,
    background_drawn: bool,
    placeholder_shown: bool,
}

impl RenderState {
    pub const fn new() -> Self {
        Self {
            prev_column: None,
            prev_label: None,
            background_drawn: false,
            placeholder_shown: false,
        }
    }

    pub fn invalidate(&mut self) {
        *self = Self::new();
    }

    /// Piano cursor column currently lit.
    pub fn prev_column(&self) -> Option<u8> {
        self.prev_column
    }

    /// Piano label currently shown.
    pub fn prev_label(&self) -> Option<PianoLabel> {
        self.prev_label
    }

    /// Whether the keyboard background is on screen.
    pub fn background_drawn(&self) -> bool {
        self.background_drawn
    }

    /// Whether the no-signal placeholder is on screen.
    pub fn placeholder_shown(&self) -> bool {
        self.placeholder_shown
    }

    /// `true` when the next frame will be a full redraw.
    pub fn is_invalidated(&self) -> bool {
        *self == Self::new()
    }
}

// ── TunerRenderer ────────────────────────────────────────────────────────

/// Renders tuner frames onto an [`Ht1635`].
///
/// # Example
///
/// ```no_run
/// use tuner_display::{RendererConfig, TunerRenderer};
/// use tuner_pitch::ViewMode;
///
/// # async fn example<I: embedded_hal_async::i2c::I2c, D: embedded_hal_async::delay::DelayNs>(display: &mut ht1635_driver::Ht1635<I, D>) -> Result<(), ht1635_driver::Ht1635Error<I::Error>> {
/// let mut renderer = TunerRenderer::new(RendererConfig::default());
/// renderer.set_mode(ViewMode::BarGraph);
/// renderer.render(display, 441.0, 440.0).await?;
/// # Ok(())
/// # }
/// ```
pub struct TunerRenderer<L = ExactLog2> {
    mapper: PitchMapper<L>,
    config: RendererConfig,
    mode: ViewMode,
    state: RenderState,
    frame: Bitmap,
}

impl TunerRenderer<ExactLog2> {
    /// Renderer with the full-precision logarithm, starting in
    /// [`ViewMode::Piano`].
    pub fn new(config: RendererConfig) -> Self {
        Self::with_log2(ExactLog2, config)
    }
}

impl<L: Log2> TunerRenderer<L> {
    pub fn with_log2(log2: L, config: RendererConfig) -> Self {
        Self {
            mapper: PitchMapper::new(log2),
            config,
            mode: ViewMode::default(),
            state: RenderState::new(),
            frame: Bitmap::new(),
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Select a view. Always invalidates the cache, so the next frame is
    /// a full redraw even when the mode is unchanged.
    pub fn set_mode(&mut self, mode: ViewMode) {
        #[cfg(feature = "defmt")]
        defmt::info!("tuner view: {}", mode.as_str());
        self.mode = mode;
        self.invalidate();
    }

    /// Forget what is on screen.
    pub fn invalidate(&mut self) {
        self.state.invalidate();
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Frame mirror: what the display shows after the last successful
    /// write.
    pub fn frame(&self) -> &Bitmap {
        &self.frame
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    // ── Frames ───────────────────────────────────────────────────────

    /// Render one frame for `freq` against the reference `concert_a`.
    ///
    /// A non-finite `freq` or one below `min_valid_hz` shows the
    /// placeholder, sent once until a valid frequency arrives. A frequency
    /// that cannot be mapped skips the frame.
    ///
    /// # Errors
    /// Returns the first bus error. The cache is only advanced for writes
    /// that succeeded, so the next call repairs the screen.
    pub async fn render<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
        freq: f32,
        concert_a: f32,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        if !freq.is_finite() || freq < self.config.min_valid_hz {
            return self.render_placeholder(display).await;
        }

        match self.mode {
            ViewMode::Numeric | ViewMode::BarGraph => {
                let Some(reading) = self.mapper.map(freq, concert_a) else {
                    return Ok(());
                };
                if self.mode == ViewMode::Numeric {
                    compose_numeric(&mut self.frame, &reading);
                } else {
                    compose_bar(&mut self.frame, &reading);
                }
                self.state.placeholder_shown = false;
                display.write_bitmap(&self.frame, 0).await
            }
            ViewMode::Piano => {
                let Some(position) = piano_position(&self.mapper, freq, concert_a) else {
                    return Ok(());
                };
                self.render_piano(display, position).await
            }
        }
    }

    async fn render_placeholder<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        if self.state.placeholder_shown {
            return Ok(());
        }
        self.write_text(display, self.config.placeholder).await?;
        self.state.placeholder_shown = true;
        Ok(())
    }

    async fn render_piano<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
        position: PianoPosition,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let label = position.label.rows();

        if !self.state.background_drawn {
            self.frame = keyboard_background();
            let (index, mask) = cursor_byte(position.column);
            self.frame.set_byte(index, mask);
            self.frame.set_panel(LABEL_PANEL, &label);
            display.write_bitmap(&self.frame, 0).await?;

            self.state = RenderState {
                prev_column: Some(position.column),
                prev_label: Some(position.label),
                background_drawn: true,
                placeholder_shown: false,
            };
            return Ok(());
        }

        if self.state.prev_column != Some(position.column) {
            if let Some(prev) = self.state.prev_column {
                self.set_cursor_pixel(display, prev, false).await?;
            }
            self.set_cursor_pixel(display, position.column, true).await?;
            self.state.prev_column = Some(position.column);
        }

        if self.state.prev_label != Some(position.label) {
            display.write_region(LABEL_PANEL * PANEL_ROWS, &label).await?;
            self.frame.set_panel(LABEL_PANEL, &label);
            self.state.prev_label = Some(position.label);
        }
        Ok(())
    }

    /// Clear or set one cursor pixel and send its byte. The frame mirror
    /// changes only once the device has the byte.
    async fn set_cursor_pixel<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
        column: u8,
        on: bool,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let (index, mask) = cursor_byte(column);
        let current = self.frame.byte(index).unwrap_or(0);
        let value = if on { current | mask } else { current & !mask };
        display.write_byte(index, value).await?;
        self.frame.set_byte(index, value);
        Ok(())
    }

    // ── Status screens ───────────────────────────────────────────────

    /// Show up to five characters of status text, one per panel, e.g.
    /// `"MUTED"`. The next [`render`](Self::render) redraws in full.
    pub async fn show_text<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
        text: &str,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        self.write_text(display, text).await
    }

    /// Fade in the splash text. The next [`render`](Self::render) redraws
    /// in full.
    pub async fn show_splash<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        self.invalidate();
        self.frame = splash_frame(self.config.splash_text);
        display.fade_in(&self.frame, self.config.splash_step_ms).await
    }

    async fn write_text<I2C, D>(
        &mut self,
        display: &mut Ht1635<I2C, D>,
        text: &str,
    ) -> Result<(), Ht1635Error<I2C::Error>>
    where
        I2C: I2c,
        D: DelayNs,
    {
        self.invalidate();
        compose_text(&mut self.frame, text);
        display.write_bitmap(&self.frame, 0).await
    }
}

/// `text` centred in the built-in 5×8 font.
fn splash_frame(text: &str) -> Bitmap {
    let mut frame = Bitmap::new();
    let character_style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let text_style = TextStyleBuilder::new()
        .alignment(Alignment::Center)
        .baseline(Baseline::Top)
        .build();
    let _ = Text::with_text_style(
        text,
        Point::new(BITMAP_WIDTH as i32 / 2, 0),
        character_style,
        text_style,
    )
    .draw(&mut frame);
    frame
}
