use std::thread;
use std::time::Duration;

use crate::clock::MonotonicClock;
use crate::error::{BenchError, HarnessError};
use crate::harness::{elapsed_us, is_valid_name};
use crate::schema::MeasurementResult;

/// Ways the calling context can be suspended.
pub trait SleepController {
    /// Suspends the caller but keeps the system running.
    fn active_wait(&mut self, duration: Duration) -> Result<(), String>;
    /// Enters a low-power sleep, waking on a timer after `duration`.
    fn light_sleep(&mut self, duration: Duration) -> Result<(), String>;
}

/// Host stand-in: both modes are an OS thread sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl SleepController for ThreadSleep {
    fn active_wait(&mut self, duration: Duration) -> Result<(), String> {
        thread::sleep(duration);
        Ok(())
    }

    fn light_sleep(&mut self, duration: Duration) -> Result<(), String> {
        thread::sleep(duration);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SleepMode {
    Active,
    Light,
}

/// Times one transition into `mode` and back.
pub fn measure_sleep<S, C>(
    name: &str,
    sleeper: &mut S,
    clock: &C,
    mode: SleepMode,
    duration: Duration,
) -> Result<MeasurementResult, BenchError>
where
    S: SleepController + ?Sized,
    C: MonotonicClock + ?Sized,
{
    if !is_valid_name(name) {
        return Err(HarnessError::InvalidName {
            name: name.to_string(),
        }
        .into());
    }

    let start = clock.now_us();
    match mode {
        SleepMode::Active => sleeper.active_wait(duration),
        SleepMode::Light => sleeper.light_sleep(duration),
    }
    .map_err(BenchError::Sleep)?;
    let end = clock.now_us();

    Ok(MeasurementResult::from_elapsed(
        name,
        1,
        elapsed_us(name, start, end),
        end,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, SystemClock};

    struct ManualSleep<'a> {
        clock: &'a ManualClock,
        overshoot_us: u64,
        refuse_light: bool,
    }

    impl SleepController for ManualSleep<'_> {
        fn active_wait(&mut self, duration: Duration) -> Result<(), String> {
            self.clock.advance_by(duration);
            Ok(())
        }

        fn light_sleep(&mut self, duration: Duration) -> Result<(), String> {
            if self.refuse_light {
                return Err("wakeup source not configured".to_string());
            }
            self.clock.advance_by(duration);
            self.clock.advance(self.overshoot_us);
            Ok(())
        }
    }

    #[test]
    fn light_sleep_reports_actual_duration() {
        let clock = ManualClock::new(100);
        let mut sleeper = ManualSleep {
            clock: &clock,
            overshoot_us: 137,
            refuse_light: false,
        };

        let r = measure_sleep(
            "light_sleep",
            &mut sleeper,
            &clock,
            SleepMode::Light,
            Duration::from_millis(500),
        )
        .unwrap();

        assert_eq!(r.iterations(), 1);
        assert_eq!(r.total_time_us(), 500_137);
        assert_eq!(r.time_per_op_us(), 500_137.0);
        assert_eq!(r.timestamp(), 500_237);
    }

    #[test]
    fn sleep_failure_is_reported() {
        let clock = ManualClock::new(0);
        let mut sleeper = ManualSleep {
            clock: &clock,
            overshoot_us: 0,
            refuse_light: true,
        };

        let err = measure_sleep(
            "light_sleep",
            &mut sleeper,
            &clock,
            SleepMode::Light,
            Duration::from_millis(500),
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::Sleep(_)));
    }

    #[test]
    fn host_sleep_lasts_at_least_requested() {
        let clock = SystemClock::new();
        let r = measure_sleep(
            "active_wait",
            &mut ThreadSleep,
            &clock,
            SleepMode::Active,
            Duration::from_millis(5),
        )
        .unwrap();
        assert!(r.total_time_us() >= 5_000);
    }
}
