//! Renderer and display-task tunables.

// ── RendererConfig ───────────────────────────────────────────────────────

/// Configuration for [`TunerRenderer`](crate::TunerRenderer).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RendererConfig {
    /// Frequencies below this (and non-finite ones) show the placeholder.
    pub min_valid_hz: f32,
    /// Placeholder text shown without a usable signal.
    pub placeholder: &'static str,
    /// Splash text.
    pub splash_text: &'static str,
    /// Hold time of each brightness step of the splash fade-in.
    pub splash_step_ms: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            min_valid_hz: 10.0,
            placeholder: "-    ",
            splash_text: "TUNER",
            splash_step_ms: 200,
        }
    }
}

// ── TaskConfig ───────────────────────────────────────────────────────────

/// Timing of the periodic display task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskConfig {
    /// Period of frequency-meter polls. Must be short against the meter
    /// timeout.
    pub poll_period_ms: u64,
    /// Period of frames sent to the display.
    pub render_period_ms: u64,
    /// Show the splash before the first frame.
    pub splash: bool,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            poll_period_ms: 2,
            render_period_ms: 100,
            splash: true,
        }
    }
}

impl TaskConfig {
    /// Meter polls per rendered frame, at least one.
    pub fn polls_per_frame(&self) -> u64 {
        (self.render_period_ms / self.poll_period_ms.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_renderer_config() {
        let c = RendererConfig::default();
        assert_eq!(c.min_valid_hz, 10.0);
        assert_eq!(c.placeholder.len(), 5);
        assert_eq!(c.splash_text.len(), 5);
    }

    #[test]
    fn default_task_timing() {
        let c = TaskConfig::default();
        assert_eq!(c.poll_period_ms, 2);
        assert_eq!(c.render_period_ms, 100);
        assert_eq!(c.polls_per_frame(), 50);
    }

    #[test]
    fn polls_per_frame_never_zero() {
        let c = TaskConfig {
            poll_period_ms: 0,
            render_period_ms: 0,
            splash: false,
        };
        assert_eq!(c.polls_per_frame(), 1);
        let c = TaskConfig {
            poll_period_ms: 50,
            render_period_ms: 20,
            splash: false,
        };
        assert_eq!(c.polls_per_frame(), 1);
    }
}
