use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::clock::MonotonicClock;
use crate::error::{BenchError, HarnessError, NotifierError};
use crate::harness::{elapsed_us, is_valid_name};
use crate::schema::MeasurementResult;

/// A recurring event source that counts how often it fired.
pub trait PeriodicNotifier {
    /// Starts firing every `period`, resetting the event count to zero.
    fn arm(&mut self, period: Duration) -> Result<(), NotifierError>;
    fn disarm(&mut self) -> Result<(), NotifierError>;
    /// Events observed since the last `arm`.
    fn count(&self) -> u32;
}

/// Host notifier: a named background thread bumps an atomic counter once per
/// period.
#[derive(Debug, Default)]
pub struct ThreadNotifier {
    count: Arc<AtomicU32>,
    running: Option<Running>,
}

#[derive(Debug)]
struct Running {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ThreadNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.running.is_some()
    }
}

impl PeriodicNotifier for ThreadNotifier {
    fn arm(&mut self, period: Duration) -> Result<(), NotifierError> {
        if self.running.is_some() {
            return Err(NotifierError::AlreadyArmed);
        }
        if period.is_zero() {
            return Err(NotifierError::InvalidPeriod);
        }

        self.count.store(0, Ordering::SeqCst);
        let stop = Arc::new(AtomicBool::new(false));
        let count = Arc::clone(&self.count);
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("periodic-notifier".to_string())
            .spawn(move || {
                let mut next = Instant::now() + period;
                while !thread_stop.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now >= next {
                        count.fetch_add(1, Ordering::Release);
                        next += period;
                    } else {
                        thread::park_timeout(next - now);
                    }
                }
            })
            .map_err(|e| NotifierError::Spawn(e.to_string()))?;

        debug!("notifier armed, period {} us", period.as_micros());
        self.running = Some(Running { stop, handle });
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), NotifierError> {
        let running = self.running.take().ok_or(NotifierError::NotArmed)?;
        running.stop.store(true, Ordering::Release);
        running.handle.thread().unpark();
        running
            .handle
            .join()
            .map_err(|_| NotifierError::Spawn("notifier thread panicked".to_string()))?;
        debug!("notifier disarmed after {} events", self.count());
        Ok(())
    }

    fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}

impl Drop for ThreadNotifier {
    fn drop(&mut self) {
        if self.running.is_some() {
            let _ = self.disarm();
        }
    }
}

/// Arms `notifier` for `window`, waiting it out with `wait`, and reports the
/// events counted as the iterations of a result.
///
/// The elapsed time is read from `clock` around the wait, so it reflects the
/// real window length rather than the requested one. A window with no events
/// at all is reported as [`NotifierError::NoEvents`].
pub fn measure_notifier<N, C, W>(
    name: &str,
    notifier: &mut N,
    clock: &C,
    period: Duration,
    window: Duration,
    wait: W,
) -> Result<MeasurementResult, BenchError>
where
    N: PeriodicNotifier + ?Sized,
    C: MonotonicClock + ?Sized,
    W: FnOnce(Duration),
{
    if !is_valid_name(name) {
        return Err(HarnessError::InvalidName {
            name: name.to_string(),
        }
        .into());
    }

    let start = clock.now_us();
    notifier.arm(period)?;
    wait(window);
    let end = clock.now_us();
    let events = notifier.count();
    notifier.disarm()?;

    if events == 0 {
        return Err(NotifierError::NoEvents.into());
    }

    let total_time_us = elapsed_us(name, start, end);
    Ok(MeasurementResult::from_elapsed(
        name,
        u64::from(events),
        total_time_us,
        end,
    )?)
}
