use core::fmt;

/// Errors that can occur when decoding or changing tuner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Stored view-mode byte does not name a [`ViewMode`](super::ViewMode).
    InvalidViewMode(u8),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidViewMode(byte) => write!(f, "invalid view mode byte {}", byte),
        }
    }
}
