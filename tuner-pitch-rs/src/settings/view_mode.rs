use super::error::SettingsError;

/// The three tuner views.
///
/// The discriminant is the byte written to persistent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ViewMode {
    /// Note label plus signed two-digit cents readout.
    Numeric = 0,
    /// Note label plus an 11-column drift bar.
    BarGraph = 1,
    /// One-octave keyboard with a moving cursor.
    #[default]
    Piano = 2,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Numeric, ViewMode::BarGraph, ViewMode::Piano];

    /// The mode after this one, wrapping back to [`ViewMode::Numeric`].
    pub const fn next(self) -> Self {
        match self {
            ViewMode::Numeric => ViewMode::BarGraph,
            ViewMode::BarGraph => ViewMode::Piano,
            ViewMode::Piano => ViewMode::Numeric,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ViewMode::Numeric => "Numeric",
            ViewMode::BarGraph => "Bar",
            ViewMode::Piano => "Piano",
        }
    }
}

impl TryFrom<u8> for ViewMode {
    type Error = SettingsError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(ViewMode::Numeric),
            1 => Ok(ViewMode::BarGraph),
            2 => Ok(ViewMode::Piano),
            other => Err(SettingsError::InvalidViewMode(other)),
        }
    }
}

impl From<ViewMode> for u8 {
    fn from(mode: ViewMode) -> Self {
        mode as u8
    }
}
