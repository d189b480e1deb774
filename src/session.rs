use std::io;
use std::time::Duration;

use log::{info, warn};

use crate::benches::{self, BenchOutcome};
use crate::clock::MonotonicClock;
use crate::console;
use crate::harness::{BenchConfig, Harness};
use crate::notifier::PeriodicNotifier;
use crate::schema::MeasurementResult;
use crate::sleep::SleepController;
use crate::BenchGroup;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub cycles: u32,
    pub completed: usize,
    pub skipped: usize,
}

pub struct Session<C, N, S> {
    cfg: BenchConfig,
    harness: Harness<C>,
    notifier: N,
    sleeper: S,
}

impl<C, N, S> Session<C, N, S>
where
    C: MonotonicClock,
    N: PeriodicNotifier,
    S: SleepController,
{
    pub fn new(cfg: BenchConfig, clock: C, notifier: N, sleeper: S) -> Self {
        Self {
            cfg,
            harness: Harness::new(clock),
            notifier,
            sleeper,
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.cfg
    }

    /// One pass over `group`, outcomes in run order.
    pub fn run_cycle(&mut self, group: BenchGroup) -> Vec<BenchOutcome> {
        let mut out = Vec::new();
        for g in BenchGroup::SUITE_ORDER {
            if !group.includes(g) {
                continue;
            }
            out.extend(match g {
                BenchGroup::Cpu => benches::cpu::run(&self.cfg, &self.harness),
                BenchGroup::Memory => benches::memory::run(&self.cfg, &self.harness),
                BenchGroup::Float => benches::float::run(&self.cfg, &self.harness),
                BenchGroup::Timer => benches::timer::run(
                    &self.cfg,
                    self.harness.clock(),
                    &mut self.notifier,
                    &mut self.sleeper,
                ),
                BenchGroup::Sleep => {
                    benches::sleep::run(&self.cfg, self.harness.clock(), &mut self.sleeper)
                }
                BenchGroup::All => Vec::new(),
            });
        }
        out
    }

    /// Runs `cycles` passes, waiting `cycle_delay` between them. `emit` sees
    /// every successful result in call order; an error from `emit` (the
    /// output transport) is the only thing that stops the session early.
    pub fn run<F>(
        &mut self,
        group: BenchGroup,
        cycles: u32,
        cycle_delay: Duration,
        mut emit: F,
    ) -> io::Result<SessionSummary>
    where
        F: FnMut(&MeasurementResult) -> io::Result<()>,
    {
        let mut summary = SessionSummary::default();
        info!("BEGIN_BENCHMARK_SUITE profile={}", self.cfg.profile.as_str());

        for cycle in 0..cycles {
            if cycle > 0 {
                info!("CYCLE_RESTART_{cycle}");
                if !cycle_delay.is_zero() {
                    if let Err(e) = self.sleeper.active_wait(cycle_delay) {
                        warn!("inter-cycle wait failed: {e}");
                    }
                }
            }

            for outcome in self.run_cycle(group) {
                match outcome.result {
                    Ok(result) => {
                        info!("{}", console::render(&result));
                        emit(&result)?;
                        summary.completed += 1;
                    }
                    Err(e) => {
                        warn!("{}: skipped: {e}", outcome.name);
                        summary.skipped += 1;
                    }
                }
            }
            summary.cycles += 1;
        }

        info!(
            "END_BENCHMARK_SUITE completed={} skipped={}",
            summary.completed, summary.skipped
        );
        Ok(summary)
    }
}
