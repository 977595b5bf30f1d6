//! Capture state shared between interrupt handlers and the foreground.

use core::cell::Cell;

use critical_section::Mutex;

/// Timer value in the "low" half of the 16-bit range. A latched value below
/// this, read while an overflow is pending, was taken after the wrap.
const LOW_HALF_END: u16 = 0x8000;

/// A 32-bit extended capture timestamp in timer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureSample {
    pub timestamp: u32,
}

/// Extend a latched 16-bit timer value to 32 bits.
///
/// `overflows` is the software high word maintained by the overflow
/// interrupt. If an overflow is pending but not yet serviced and the
/// latched value lies in the low half of the range, the edge happened
/// after the wrap and belongs to the next epoch.
///
/// ```
/// use freq_capture::extend_timestamp;
///
/// assert_eq!(extend_timestamp(0x1234, 5, false), 0x0005_1234);
/// // Wrapped, overflow interrupt not yet run.
/// assert_eq!(extend_timestamp(0x0010, 5, true), 0x0006_0010);
/// // Latched just before the wrap.
/// assert_eq!(extend_timestamp(0xFFF0, 5, true), 0x0005_FFF0);
/// ```
#[inline]
pub const fn extend_timestamp(latched: u16, overflows: u16, overflow_pending: bool) -> u32 {
    let high = if overflow_pending && latched < LOW_HALF_END {
        overflows.wrapping_add(1)
    } else {
        overflows
    };
    ((high as u32) << 16) | latched as u32
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    overflows: u16,
    timestamp: u32,
    fresh: bool,
}

impl ChannelState {
    const EMPTY: Self = Self {
        overflows: 0,
        timestamp: 0,
        fresh: false,
    };
}

/// Single-slot mailbox between the capture interrupt and the foreground.
///
/// Every access runs inside a critical section, so the channel can live in
/// a `static` and be touched from interrupt handlers and tasks alike. The
/// slot holds only the latest capture: an unconsumed sample is overwritten.
///
/// # Example
///
/// ```
/// use freq_capture::CaptureChannel;
///
/// static CHANNEL: CaptureChannel = CaptureChannel::new();
///
/// // Interrupt side.
/// CHANNEL.on_overflow();
/// CHANNEL.on_capture(0x0100, false);
///
/// // Foreground side.
/// let sample = CHANNEL.try_take().unwrap();
/// assert_eq!(sample.timestamp, 0x0001_0100);
/// assert!(CHANNEL.try_take().is_none());
/// ```
pub struct CaptureChannel {
    state: Mutex<Cell<ChannelState>>,
}

impl Default for CaptureChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureChannel {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(ChannelState::EMPTY)),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChannelState) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut state = cell.get();
            let result = f(&mut state);
            cell.set(state);
            result
        })
    }

    // ── Interrupt side ───────────────────────────────────────────────

    /// Timer overflow handler: advance the software high word.
    pub fn on_overflow(&self) {
        self.update(|s| s.overflows = s.overflows.wrapping_add(1));
    }

    /// Capture handler: extend `latched` with the current high word and
    /// publish it. Returns the extended timestamp.
    ///
    /// `overflow_pending` is the timer's overflow flag as read inside the
    /// capture handler, before the overflow handler has run.
    pub fn on_capture(&self, latched: u16, overflow_pending: bool) -> u32 {
        self.update(|s| {
            s.timestamp = extend_timestamp(latched, s.overflows, overflow_pending);
            s.fresh = true;
            s.timestamp
        })
    }

    /// Publish a timestamp that is already 32 bits wide.
    pub fn publish(&self, timestamp: u32) {
        self.update(|s| {
            s.timestamp = timestamp;
            s.fresh = true;
        });
    }

    // ── Foreground side ──────────────────────────────────────────────

    /// Take the latest unconsumed sample, clearing the new flag.
    pub fn try_take(&self) -> Option<CaptureSample> {
        self.update(|s| {
            core::mem::take(&mut s.fresh).then_some(CaptureSample {
                timestamp: s.timestamp,
            })
        })
    }

    /// Current software high word.
    pub fn overflows(&self) -> u16 {
        self.update(|s| s.overflows)
    }

    /// Clear the high word and drop any unconsumed sample.
    pub fn reset(&self) {
        self.update(|s| *s = ChannelState::EMPTY);
    }
}
