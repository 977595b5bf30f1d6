//! Host-side model of a 16-bit capture timer.
//!
//! [`SimulatedTimer`] keeps an absolute tick count and drives a
//! [`CaptureChannel`] exactly the way the overflow and capture interrupt
//! handlers do on hardware, including the window in which the counter has
//! wrapped but the overflow handler has not run yet.
//!
//! Because [`arm`](CaptureSource::arm) restarts the counter at zero, the
//! timestamp published for an edge at absolute tick `t` is `t as u32`.

use crate::capture::{CaptureChannel, CaptureSample};
use crate::source::{CaptureConfig, CaptureSource};

const WRAP: u64 = 1 << 16;

/// A simulated free-running 16-bit timer with overflow and capture
/// interrupts.
///
/// Edges are only captured while armed. Times are absolute ticks since the
/// last [`arm`](CaptureSource::arm) and must not go backwards.
///
/// # Example
///
/// ```
/// use freq_capture::sim::SimulatedTimer;
/// use freq_capture::CaptureSource;
///
/// let mut timer = SimulatedTimer::new(2_000_000);
/// timer.arm();
///
/// // Edge three ticks after the first wrap, captured before the
/// // overflow handler ran.
/// timer.edge_after_overflow(0x1_0003);
/// assert_eq!(timer.take_sample().unwrap().timestamp, 0x1_0003);
/// ```
#[derive(Default)]
pub struct SimulatedTimer {
    clock_hz: u32,
    channel: CaptureChannel,
    /// Absolute tick count.
    now: u64,
    /// Overflows delivered to the channel.
    serviced: u64,
    armed: bool,
    config: Option<CaptureConfig>,
}

impl SimulatedTimer {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            ..Self::default()
        }
    }

    /// Current absolute tick count.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Current 16-bit hardware counter value.
    pub fn counter(&self) -> u16 {
        self.now as u16
    }

    /// Configuration last applied with [`configure`](CaptureSource::configure).
    pub fn config(&self) -> Option<&CaptureConfig> {
        self.config.as_ref()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn channel(&self) -> &CaptureChannel {
        &self.channel
    }

    /// Advance to `tick`, running the overflow handler for every wrap.
    pub fn run_until(&mut self, tick: u64) {
        self.advance_to(tick);
        self.service_overflows();
    }

    /// Rising edge at `tick`, captured with no overflow pending.
    pub fn edge(&mut self, tick: u64) {
        self.run_until(tick);
        self.capture(false);
    }

    /// Edge at `tick` with the most recent wrap still unserviced.
    ///
    /// Models a wrap that happened shortly before the edge while the
    /// overflow handler was held off. If no wrap lies between the current
    /// time and `tick` this is a plain [`edge`](Self::edge).
    pub fn edge_after_overflow(&mut self, tick: u64) {
        self.advance_to(tick);
        let wraps = self.now / WRAP;
        if wraps == self.serviced {
            self.capture(false);
            return;
        }
        while self.serviced + 1 < wraps {
            self.overflow_isr();
        }
        self.capture(true);
        self.overflow_isr();
    }

    /// Edge latched at `tick`, with the next wrap occurring before the
    /// capture handler runs.
    ///
    /// Leaves the timer at that wrap, so later edges must come after it.
    pub fn edge_before_overflow(&mut self, tick: u64) {
        self.run_until(tick);
        let latched = self.counter();
        self.now = (tick / WRAP + 1) * WRAP;
        self.capture_latched(latched, true);
        self.overflow_isr();
    }

    /// A runt pulse at `tick`. Suppressed when the noise filter is enabled,
    /// otherwise captured like a real edge.
    pub fn glitch(&mut self, tick: u64) {
        self.run_until(tick);
        if self.config.is_some_and(|c| c.noise_filter) {
            return;
        }
        self.capture(false);
    }

    fn advance_to(&mut self, tick: u64) {
        if tick > self.now {
            self.now = tick;
        }
    }

    fn service_overflows(&mut self) {
        let wraps = self.now / WRAP;
        while self.serviced < wraps {
            self.overflow_isr();
        }
    }

    fn overflow_isr(&mut self) {
        self.serviced += 1;
        self.channel.on_overflow();
    }

    fn capture(&mut self, overflow_pending: bool) {
        self.capture_latched(self.counter(), overflow_pending);
    }

    fn capture_latched(&mut self, latched: u16, overflow_pending: bool) {
        if self.armed {
            self.channel.on_capture(latched, overflow_pending);
        }
    }
}

impl CaptureSource for SimulatedTimer {
    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    fn configure(&mut self, config: &CaptureConfig) {
        self.config = Some(*config);
    }

    fn arm(&mut self) {
        self.now = 0;
        self.serviced = 0;
        self.channel.reset();
        self.armed = true;
    }

    fn take_sample(&mut self) -> Option<CaptureSample> {
        self.channel.try_take()
    }
}
