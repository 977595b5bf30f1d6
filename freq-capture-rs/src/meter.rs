//! Validity-bounded, smoothed frequency meter.

use crate::source::{CaptureConfig, CaptureSource};

/// Returned by [`FrequencyMeter::poll`] when there is no usable signal.
pub const NO_SIGNAL: f32 = 0.0;

/// Frequency meter tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterConfig {
    /// Lowest accepted frequency in Hz. Default: 30.
    pub min_hz: f32,
    /// Highest accepted frequency in Hz. Default: 10 000.
    pub max_hz: f32,
    /// Time without an accepted period after which [`NO_SIGNAL`] is
    /// reported. Default: 120 ms.
    pub timeout_ms: u64,
    /// EMA weight of each new sample, in `(0, 1]`. Default: 0.25.
    pub ema_weight: f32,
    /// Edge selection and filtering. Default: rising edge, filtered.
    pub capture: CaptureConfig,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            min_hz: 30.0,
            max_hz: 10_000.0,
            timeout_ms: 120,
            ema_weight: 0.25,
            capture: CaptureConfig::default(),
        }
    }
}

impl MeterConfig {
    /// Accepted period range in ticks for a timer running at `clock_hz`:
    /// `(floor(clock / max_hz), floor(clock / min_hz))`.
    ///
    /// ```
    /// use freq_capture::MeterConfig;
    ///
    /// assert_eq!(MeterConfig::default().tick_bounds(2_000_000), (200, 66_666));
    /// ```
    pub fn tick_bounds(&self, clock_hz: u32) -> (u32, u32) {
        let clock = clock_hz as f32;
        // Float-to-int casts truncate and saturate (NaN → 0).
        ((clock / self.max_hz) as u32, (clock / self.min_hz) as u32)
    }
}

/// Estimator state, updated only by [`FrequencyMeter::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyEstimate {
    /// Most recent accepted, unsmoothed frequency.
    pub raw_hz: Option<f32>,
    /// Smoothed frequency. `None` until the first period is accepted.
    pub ema_hz: Option<f32>,
    /// Time of the last accepted period (or of initialisation).
    pub last_valid_ms: u64,
}

/// Turns capture timestamps into a smoothed frequency.
///
/// Each pair of consecutive captures yields one period. Periods outside
/// the configured band are dropped but still advance the baseline, so a
/// glitch costs at most two periods. Accepted frequencies feed an
/// exponential moving average seeded by the first accepted value.
///
/// [`poll`](Self::poll) never blocks and does a constant amount of work,
/// so it can run every few milliseconds from the foreground loop.
///
/// # Example
///
/// ```
/// use freq_capture::sim::SimulatedTimer;
/// use freq_capture::{FrequencyMeter, MeterConfig};
///
/// let mut meter = FrequencyMeter::new(SimulatedTimer::new(2_000_000), MeterConfig::default());
/// meter.initialize(0);
///
/// meter.source_mut().edge(10_000);
/// meter.poll(5);
/// meter.source_mut().edge(20_000); // 10 000 ticks → 200 Hz
/// assert_eq!(meter.poll(10), 200.0);
/// ```
pub struct FrequencyMeter<S> {
    source: S,
    config: MeterConfig,
    estimate: FrequencyEstimate,
    baseline: Option<u32>,
    min_ticks: u32,
    max_ticks: u32,
}

impl<S> FrequencyMeter<S>
where
    S: CaptureSource,
{
    /// Wrap `source`. Nothing is configured until
    /// [`initialize`](Self::initialize).
    pub fn new(source: S, config: MeterConfig) -> Self {
        let (min_ticks, max_ticks) = config.tick_bounds(source.clock_hz());
        Self {
            source,
            config,
            estimate: FrequencyEstimate::default(),
            baseline: None,
            min_ticks,
            max_ticks,
        }
    }

    /// Configure and arm the source, clear all estimator state and start
    /// the timeout window at `now_ms`.
    pub fn initialize(&mut self, now_ms: u64) {
        self.source.configure(&self.config.capture);
        self.source.arm();

        (self.min_ticks, self.max_ticks) = self.config.tick_bounds(self.source.clock_hz());
        self.baseline = None;
        self.estimate = FrequencyEstimate {
            raw_hz: None,
            ema_hz: None,
            last_valid_ms: now_ms,
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "frequency meter armed: {} Hz clock, periods {}..={} ticks",
            self.source.clock_hz(),
            self.min_ticks,
            self.max_ticks
        );
    }

    /// Consume at most one capture and return the current frequency.
    ///
    /// Returns the smoothed frequency, or [`NO_SIGNAL`] if no period has
    /// been accepted yet or the last one is older than the timeout.
    pub fn poll(&mut self, now_ms: u64) -> f32 {
        if let Some(sample) = self.source.take_sample() {
            if let Some(previous) = self.baseline.replace(sample.timestamp) {
                self.accept_period(sample.timestamp.wrapping_sub(previous), now_ms);
            }
        }
        self.current(now_ms)
    }

    fn accept_period(&mut self, ticks: u32, now_ms: u64) {
        if ticks < self.min_ticks || ticks > self.max_ticks {
            #[cfg(feature = "defmt")]
            defmt::trace!("period of {} ticks out of band", ticks);
            return;
        }

        let hz = self.source.clock_hz() as f32 / ticks as f32;
        if !hz.is_finite() {
            return;
        }

        self.estimate.raw_hz = Some(hz);
        self.estimate.ema_hz = Some(match self.estimate.ema_hz {
            Some(ema) => ema + (hz - ema) * self.config.ema_weight,
            None => hz,
        });
        self.estimate.last_valid_ms = now_ms;
    }

    fn current(&self, now_ms: u64) -> f32 {
        if now_ms.saturating_sub(self.estimate.last_valid_ms) > self.config.timeout_ms {
            return NO_SIGNAL;
        }
        self.estimate.ema_hz.unwrap_or(NO_SIGNAL)
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn estimate(&self) -> &FrequencyEstimate {
        &self.estimate
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    /// Accepted period range in ticks.
    pub fn tick_bounds(&self) -> (u32, u32) {
        (self.min_ticks, self.max_ticks)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureSample;
    use crate::sim::SimulatedTimer;

    const CLOCK_HZ: u32 = 2_000_000;
    const TICKS_PER_MS: u64 = (CLOCK_HZ / 1000) as u64;

    fn meter() -> FrequencyMeter<SimulatedTimer> {
        let mut m = FrequencyMeter::new(SimulatedTimer::new(CLOCK_HZ), MeterConfig::default());
        m.initialize(0);
        m
    }

    /// Feed an edge at `tick` and poll at the matching wall time.
    fn edge(m: &mut FrequencyMeter<SimulatedTimer>, tick: u64) -> f32 {
        m.source_mut().edge(tick);
        m.poll(tick / TICKS_PER_MS)
    }

    /// Feed `count` edges spaced `period` ticks apart, starting one period
    /// after `start`. Returns the tick of the last edge and every output.
    fn feed(
        m: &mut FrequencyMeter<SimulatedTimer>,
        start: u64,
        period: u64,
        count: usize,
    ) -> (u64, [f32; 64]) {
        let mut out = [0.0; 64];
        let mut tick = start;
        for slot in out.iter_mut().take(count) {
            tick += period;
            *slot = edge(m, tick);
        }
        (tick, out)
    }

    /// Source replaying a fixed list of timestamps.
    struct Scripted {
        timestamps: [u32; 8],
        len: usize,
        next: usize,
    }

    impl Scripted {
        fn new(ts: &[u32]) -> Self {
            let mut timestamps = [0; 8];
            timestamps[..ts.len()].copy_from_slice(ts);
            Self {
                timestamps,
                len: ts.len(),
                next: 0,
            }
        }
    }

    impl CaptureSource for Scripted {
        fn clock_hz(&self) -> u32 {
            CLOCK_HZ
        }
        fn configure(&mut self, _config: &CaptureConfig) {}
        fn arm(&mut self) {}
        fn take_sample(&mut self) -> Option<CaptureSample> {
            (self.next < self.len).then(|| {
                self.next += 1;
                CaptureSample {
                    timestamp: self.timestamps[self.next - 1],
                }
            })
        }
    }

    // ── Configuration ────────────────────────────────────────────────

    #[test]
    fn default_config() {
        let c = MeterConfig::default();
        assert_eq!(c.min_hz, 30.0);
        assert_eq!(c.max_hz, 10_000.0);
        assert_eq!(c.timeout_ms, 120);
        assert_eq!(c.ema_weight, 0.25);
        assert!(c.capture.noise_filter);
    }

    #[test]
    fn initialize_configures_and_arms_source() {
        let m = meter();
        assert!(m.source().is_armed());
        assert_eq!(m.source().config(), Some(&CaptureConfig::default()));
        assert_eq!(m.tick_bounds(), (200, 66_666));
        assert_eq!(m.estimate().last_valid_ms, 0);
    }

    // ── Startup ──────────────────────────────────────────────────────

    #[test]
    fn no_signal_before_any_capture() {
        let mut m = meter();
        assert_eq!(m.poll(0), NO_SIGNAL);
        assert_eq!(m.poll(50), NO_SIGNAL);
    }

    #[test]
    fn first_capture_only_sets_baseline() {
        let mut m = meter();
        assert_eq!(edge(&mut m, 4545), NO_SIGNAL);
        assert_eq!(m.estimate().ema_hz, None);
        assert_eq!(m.estimate().raw_hz, None);
    }

    #[test]
    fn first_accepted_period_seeds_ema() {
        let mut m = meter();
        edge(&mut m, 10_000);
        assert_eq!(edge(&mut m, 20_000), 200.0);
        assert_eq!(m.estimate().raw_hz, Some(200.0));
        assert_eq!(m.estimate().ema_hz, Some(200.0));
        assert_eq!(m.estimate().last_valid_ms, 10);
    }

    #[test]
    fn poll_without_new_capture_repeats_estimate() {
        let mut m = meter();
        edge(&mut m, 10_000);
        edge(&mut m, 20_000);
        assert_eq!(m.poll(11), 200.0);
        assert_eq!(m.poll(12), 200.0);
    }

    // ── Smoothing ────────────────────────────────────────────────────

    #[test]
    fn ema_converges_geometrically() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2); // 200 Hz
        let e0 = 400.0f32 - 200.0;

        let (_, out) = feed(&mut m, tick, 5_000, 20); // 400 Hz
        let mut bound = e0;
        for (n, &hz) in out.iter().take(20).enumerate() {
            bound *= 0.75;
            let err = (400.0 - hz).abs();
            assert!(err <= bound + 1e-3, "sample {}: error {} > {}", n, err, bound);
            assert!(hz <= 400.0 && hz >= 200.0);
        }
    }

    #[test]
    fn steady_input_stays_put() {
        let mut m = meter();
        let (_, out) = feed(&mut m, 0, 4545, 30);
        let expected = CLOCK_HZ as f32 / 4545.0;
        for &hz in &out[1..30] {
            assert!((hz - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn custom_ema_weight() {
        let config = MeterConfig {
            ema_weight: 0.5,
            ..MeterConfig::default()
        };
        let mut m = FrequencyMeter::new(SimulatedTimer::new(CLOCK_HZ), config);
        m.initialize(0);
        let (tick, _) = feed(&mut m, 0, 10_000, 2); // 200 Hz
        let (_, out) = feed(&mut m, tick, 5_000, 1); // 400 Hz
        assert_eq!(out[0], 300.0);
    }

    // ── Band limits ──────────────────────────────────────────────────

    #[test]
    fn rejects_too_short_period() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2);
        // 150 ticks → 13.3 kHz, above the band.
        assert_eq!(edge(&mut m, tick + 150), 200.0);
        assert_eq!(m.estimate().raw_hz, Some(200.0));
    }

    #[test]
    fn rejects_too_long_period() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2);
        // 70 000 ticks → 28.6 Hz, below the band.
        assert_eq!(edge(&mut m, tick + 70_000), 200.0);
        assert_eq!(m.estimate().raw_hz, Some(200.0));
        assert_eq!(m.estimate().last_valid_ms, 10);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let mut m = meter();
        edge(&mut m, 1000);
        // 200 ticks → exactly 10 kHz.
        assert_eq!(edge(&mut m, 1200), 10_000.0);

        let mut m = meter();
        edge(&mut m, 1000);
        // 66 666 ticks → 30.0003 Hz.
        let hz = edge(&mut m, 67_666);
        assert!((hz - 30.0003).abs() < 1e-3);
    }

    #[test]
    fn rejected_period_still_moves_baseline() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2); // 200 Hz
        // Glitch 100 ticks in, then the next real edge.
        edge(&mut m, tick + 100);
        // Period measured from the glitch: 9 900 ticks → 202.02 Hz.
        let hz = edge(&mut m, tick + 10_000);
        assert_eq!(m.estimate().raw_hz, Some(CLOCK_HZ as f32 / 9_900.0));
        assert!(hz > 200.0 && hz < 202.1);
    }

    #[test]
    fn noise_filter_hides_glitches() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2);
        m.source_mut().glitch(tick + 100);
        assert_eq!(edge(&mut m, tick + 10_000), 200.0);
        assert_eq!(m.estimate().raw_hz, Some(200.0));
    }

    // ── Timeout ──────────────────────────────────────────────────────

    #[test]
    fn reports_no_signal_after_timeout() {
        let mut m = meter();
        edge(&mut m, 10_000);
        edge(&mut m, 20_000); // accepted at 10 ms
        assert_eq!(m.poll(130), 200.0);
        assert_eq!(m.poll(131), NO_SIGNAL);
        assert_eq!(m.poll(10_000), NO_SIGNAL);
    }

    #[test]
    fn out_of_band_input_times_out() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2);
        // 20 kHz input: every period rejected.
        let (_, out) = feed(&mut m, tick, 100, 60);
        assert_eq!(out[59], 200.0); // 3 ms of rejects, still within timeout

        let mut last = 0.0;
        let mut t = tick + 6000;
        while t < tick + 6000 + 300 * TICKS_PER_MS {
            t += 100;
            last = edge(&mut m, t);
        }
        assert_eq!(last, NO_SIGNAL);
    }

    #[test]
    fn recovers_after_timeout() {
        let mut m = meter();
        let (tick, _) = feed(&mut m, 0, 10_000, 2);
        assert_eq!(m.poll(500), NO_SIGNAL);

        // Signal returns at 1 s; the EMA picks up where it left off.
        let start = 1_000 * TICKS_PER_MS;
        assert!(start > tick);
        let (_, out) = feed(&mut m, start, 10_000, 2);
        assert_eq!(out[1], 200.0);
    }

    #[test]
    fn initialize_clears_estimate() {
        let mut m = meter();
        feed(&mut m, 0, 10_000, 3);
        m.initialize(1_000);
        assert_eq!(m.estimate(), &FrequencyEstimate {
            raw_hz: None,
            ema_hz: None,
            last_valid_ms: 1_000,
        });
        assert_eq!(m.poll(1_001), NO_SIGNAL);
    }

    // ── Timer wrap ───────────────────────────────────────────────────

    #[test]
    fn period_across_u32_wrap() {
        let mut m = FrequencyMeter::new(
            Scripted::new(&[0xFFFF_F000, 0xFFFF_F000u32.wrapping_add(5_000)]),
            MeterConfig::default(),
        );
        m.initialize(0);
        m.poll(1);
        assert_eq!(m.poll(2), 400.0);
    }

    #[test]
    fn periods_across_16_bit_wraps() {
        let mut m = meter();
        let mut tick = 0u64;
        let mut hz = NO_SIGNAL;
        for i in 0..100 {
            tick += 4_000; // 500 Hz
            if tick % (1 << 16) < 4_000 && i % 2 == 0 {
                m.source_mut().edge_after_overflow(tick);
            } else {
                m.source_mut().edge(tick);
            }
            hz = m.poll(tick / TICKS_PER_MS);
            if i > 0 {
                assert_eq!(m.estimate().raw_hz, Some(500.0), "edge {}", i);
            }
        }
        assert_eq!(hz, 500.0);
    }

    #[test]
    fn zero_tick_period_is_discarded() {
        let config = MeterConfig {
            max_hz: f32::INFINITY,
            ..MeterConfig::default()
        };
        let mut m = FrequencyMeter::new(Scripted::new(&[100, 100]), config);
        m.initialize(0);
        assert_eq!(m.tick_bounds().0, 0);
        m.poll(1);
        assert_eq!(m.poll(2), NO_SIGNAL);
        assert_eq!(m.estimate().raw_hz, None);
    }

    #[test]
    fn works_through_mutable_reference() {
        let mut timer = SimulatedTimer::new(CLOCK_HZ);
        {
            let mut m = FrequencyMeter::new(&mut timer, MeterConfig::default());
            m.initialize(0);
            m.source_mut().edge(10_000);
            m.poll(5);
            m.source_mut().edge(20_000);
            assert_eq!(m.poll(10), 200.0);
        }
        assert!(timer.is_armed());
    }
}
