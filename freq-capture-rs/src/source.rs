use crate::capture::CaptureSample;

/// Which input transition latches the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEdge {
    #[default]
    Rising,
    Falling,
}

/// Input-capture settings applied by [`CaptureSource::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureConfig {
    /// Edge that latches the timer.
    pub edge: CaptureEdge,
    /// Qualify edges against short glitches (noise canceller, input
    /// hysteresis or similar, whatever the hardware offers).
    pub noise_filter: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            edge: CaptureEdge::Rising,
            noise_filter: true,
        }
    }
}

/// A free-running timer with edge capture, as seen by the frequency meter.
///
/// Implementations publish 32-bit extended timestamps, typically by feeding
/// a [`CaptureChannel`](crate::CaptureChannel) from their interrupt
/// handlers and draining it in [`take_sample`](Self::take_sample).
pub trait CaptureSource {
    /// Timer tick rate in Hz.
    fn clock_hz(&self) -> u32;

    /// Apply edge selection and filtering. Called before [`arm`](Self::arm).
    fn configure(&mut self, config: &CaptureConfig);

    /// Start (or restart) capturing and drop any stale sample.
    fn arm(&mut self);

    /// Latest capture not yet taken, if any.
    fn take_sample(&mut self) -> Option<CaptureSample>;
}

impl<S: CaptureSource + ?Sized> CaptureSource for &mut S {
    fn clock_hz(&self) -> u32 {
        (**self).clock_hz()
    }

    fn configure(&mut self, config: &CaptureConfig) {
        (**self).configure(config)
    }

    fn arm(&mut self) {
        (**self).arm()
    }

    fn take_sample(&mut self) -> Option<CaptureSample> {
        (**self).take_sample()
    }
}
