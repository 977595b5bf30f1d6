use crate::pitch::DEFAULT_CONCERT_A;

use super::view_mode::ViewMode;
use super::{is_valid_concert_a, CONCERT_A_PRESETS};

/// Snapshot of the persisted settings, returned by
/// [`TunerSettings::take_store_change()`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoredSettings {
    /// [`ViewMode`] discriminant.
    pub view_mode: u8,
    /// Concert-A reference in Hz.
    pub concert_a: f32,
}

/// View mode and concert-A reference with display and storage change flags.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TunerSettings {
    view_mode: ViewMode,
    concert_a: f32,
    changed_display: bool,
    changed_store: bool,
}

impl Default for TunerSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl TunerSettings {
    /// Piano view at 440 Hz, no changes pending.
    pub const fn new() -> Self {
        Self {
            view_mode: ViewMode::Piano,
            concert_a: DEFAULT_CONCERT_A,
            changed_display: false,
            changed_store: false,
        }
    }

    /// Restore settings read back from persistent storage.
    ///
    /// An unknown mode byte falls back to [`ViewMode::Piano`] and a concert
    /// A outside 300–600 Hz (or non-finite) falls back to 440 Hz. Only the
    /// display flag is raised.
    pub fn from_stored(mode_byte: u8, concert_a: f32) -> Self {
        let view_mode = match ViewMode::try_from(mode_byte) {
            Ok(mode) => mode,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("stored settings: {}, using Piano", _e);
                ViewMode::Piano
            }
        };
        let concert_a = if is_valid_concert_a(concert_a) {
            concert_a
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("stored concert A {} out of range, using 440", concert_a);
            DEFAULT_CONCERT_A
        };

        Self {
            view_mode,
            concert_a,
            changed_display: true,
            changed_store: false,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Concert-A reference in Hz, always within 300–600.
    pub fn concert_a(&self) -> f32 {
        self.concert_a
    }

    // ── Menu-driven updates ──────────────────────────────────────────

    /// Select a view. Raises both change flags.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.mark_changed();
    }

    /// Advance to the next view and return it.
    pub fn cycle_view_mode(&mut self) -> ViewMode {
        self.set_view_mode(self.view_mode.next());
        self.view_mode
    }

    /// Set the concert-A reference. Values outside 300–600 Hz are replaced
    /// by 440 Hz. Raises both change flags.
    pub fn set_concert_a(&mut self, hz: f32) {
        self.concert_a = if is_valid_concert_a(hz) {
            hz
        } else {
            #[cfg(feature = "defmt")]
            defmt::warn!("concert A {} out of range, using 440", hz);
            DEFAULT_CONCERT_A
        };
        self.mark_changed();
    }

    /// Step to the next entry of [`CONCERT_A_PRESETS`] and return it.
    ///
    /// A reference that is not a preset steps to the first preset.
    pub fn cycle_concert_a(&mut self) -> f32 {
        let next = CONCERT_A_PRESETS
            .iter()
            .position(|&preset| preset == self.concert_a)
            .map_or(0, |i| (i + 1) % CONCERT_A_PRESETS.len());
        self.set_concert_a(CONCERT_A_PRESETS[next]);
        self.concert_a
    }

    /// Restore the defaults and raise both change flags.
    pub fn reset(&mut self) {
        self.view_mode = ViewMode::Piano;
        self.concert_a = DEFAULT_CONCERT_A;
        self.mark_changed();
    }

    // ── Change consumption ───────────────────────────────────────────

    /// Return the current view mode if the display flag was set, clearing
    /// it. The storage flag is left intact.
    pub fn take_display_change(&mut self) -> Option<ViewMode> {
        core::mem::take(&mut self.changed_display).then_some(self.view_mode)
    }

    /// Return a snapshot to persist if the storage flag was set, clearing
    /// it. The display flag is left intact.
    pub fn take_store_change(&mut self) -> Option<StoredSettings> {
        core::mem::take(&mut self.changed_store).then(|| self.snapshot())
    }

    /// Current values in their persisted form.
    pub fn snapshot(&self) -> StoredSettings {
        StoredSettings {
            view_mode: self.view_mode.into(),
            concert_a: self.concert_a,
        }
    }

    fn mark_changed(&mut self) {
        self.changed_display = true;
        self.changed_store = true;
    }
}
