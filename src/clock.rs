use std::cell::Cell;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// A monotonic microsecond counter.
///
/// Readings must never decrease over the lifetime of the clock and must not
/// wrap within a single measurement.
pub trait MonotonicClock {
    fn now_us(&self) -> u64;
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

static PROCESS_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Host monotonic clock. Every instance counts microseconds from the same
/// process-wide origin, so readings from different clocks share a timeline.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: *PROCESS_ORIGIN.get_or_init(Instant::now),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    #[inline]
    fn now_us(&self) -> u64 {
        let us = self.origin.elapsed().as_micros();
        u64::try_from(us).unwrap_or(u64::MAX)
    }
}

/// Clock that only moves when told to. Single-threaded by construction.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_us: u64) -> Self {
        Self {
            now: Cell::new(start_us),
        }
    }

    pub fn advance(&self, us: u64) {
        self.now.set(self.now.get().saturating_add(us));
    }

    pub fn advance_by(&self, d: Duration) {
        self.advance(u64::try_from(d.as_micros()).unwrap_or(u64::MAX));
    }

    /// Moves the clock to an arbitrary reading, including backwards. Only
    /// useful for simulating a clock-domain anomaly.
    pub fn set(&self, us: u64) {
        self.now.set(us);
    }
}

impl MonotonicClock for ManualClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}
