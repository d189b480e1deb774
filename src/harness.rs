use std::hint::black_box;
use std::time::Duration;

use log::{debug, warn};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::clock::{MonotonicClock, SystemClock};
use crate::error::HarnessError;
use crate::schema::{check_measurement, MeasurementResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }

    fn scale(&self, full: u64) -> u64 {
        match self {
            Profile::Quick => (full / 10).max(1),
            Profile::Full => full,
        }
    }
}

/// Kind of workload, used to pick an iteration count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workload {
    EmptyLoop,
    IntegerArithmetic,
    FloatArithmetic,
    Memory,
    FunctionCall,
    /// An inline instruction sequence that already loops internally.
    InstructionBlock,
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
    /// Overrides the profile's warm-up count when set.
    pub warmup_override: Option<u64>,
}

impl BenchConfig {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            seed: 0,
            warmup_override: None,
        }
    }

    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn warmup_iters(&self) -> u64 {
        self.warmup_override
            .unwrap_or_else(|| self.profile.scale(1_000))
    }

    pub fn iters(&self, workload: Workload) -> u64 {
        let full = match workload {
            Workload::EmptyLoop => 1_000_000,
            Workload::IntegerArithmetic => 100_000,
            Workload::FloatArithmetic => 50_000,
            Workload::Memory => 10_000,
            Workload::FunctionCall => 100_000,
            Workload::InstructionBlock => 1_000,
        };
        self.profile.scale(full)
    }

    /// Observation window for the periodic timer benchmark.
    pub fn timer_window(&self) -> Duration {
        Duration::from_micros(self.profile.scale(1_000_000))
    }

    pub fn timer_period(&self) -> Duration {
        Duration::from_micros(self.profile.scale(100_000))
    }

    pub fn light_sleep(&self) -> Duration {
        Duration::from_micros(self.profile.scale(500_000))
    }

    pub fn active_wait(&self) -> Duration {
        Duration::from_micros(self.profile.scale(1_000_000))
    }
}

/// Everything needed for one timed run.
///
/// `operation` is invoked `warmup_iterations + iterations` times. Its return
/// value is passed through [`black_box`] so an unused result cannot be
/// optimized out of the loop.
pub struct MeasurementSpec<F> {
    pub name: String,
    pub iterations: u64,
    pub warmup_iterations: u64,
    pub operation: F,
}

impl<F, T> MeasurementSpec<F>
where
    F: FnMut() -> T,
{
    pub fn new(name: impl Into<String>, iterations: u64, operation: F) -> Self {
        Self {
            name: name.into(),
            iterations,
            warmup_iterations: 0,
            operation,
        }
    }

    pub fn with_warmup(mut self, warmup_iterations: u64) -> Self {
        self.warmup_iterations = warmup_iterations;
        self
    }

    fn validate(&self) -> Result<(), HarnessError> {
        check_measurement(&self.name, self.iterations)
    }
}

/// Names end up verbatim in CSV rows.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains([',', '\r', '\n'])
}

/// Runs timed repetition loops against a clock. Holds no state between runs.
#[derive(Clone, Debug, Default)]
pub struct Harness<C> {
    clock: C,
}

impl<C: MonotonicClock> Harness<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn run<F, T>(&self, spec: MeasurementSpec<F>) -> Result<MeasurementResult, HarnessError>
    where
        F: FnMut() -> T,
    {
        spec.validate()?;
        let MeasurementSpec {
            name,
            iterations,
            warmup_iterations,
            mut operation,
        } = spec;

        for _ in 0..warmup_iterations {
            black_box(operation());
        }

        let start = self.clock.now_us();
        for _ in 0..iterations {
            black_box(operation());
        }
        let end = self.clock.now_us();

        let total_time_us = elapsed_us(&name, start, end);
        let result = MeasurementResult::from_elapsed(name, iterations, total_time_us, end)?;
        debug!(
            "{}: {} iters (+{} warmup) in {} us",
            result.name(),
            iterations,
            warmup_iterations,
            total_time_us
        );
        Ok(result)
    }
}

/// `end - start`, clamped to zero on a backwards clock.
pub(crate) fn elapsed_us(name: &str, start: u64, end: u64) -> u64 {
    if end < start {
        warn!("{name}: clock went backwards ({start} -> {end} us), clamping elapsed to 0");
        return 0;
    }
    end - start
}

/// Runs `spec` once against the host monotonic clock.
pub fn run<F, T>(spec: MeasurementSpec<F>) -> Result<MeasurementResult, HarnessError>
where
    F: FnMut() -> T,
{
    Harness::new(SystemClock::new()).run(spec)
}
