
use crate::clock::MonotonicClock;
use crate::error::BenchError;
use crate::harness::{Harness, MeasurementSpec};
use crate::schema::MeasurementResult;
use crate::BenchGroup;

/// Result of one catalogue entry. Failures carry the name so a session can
/// report them and move on.
#[derive(Debug)]
pub struct BenchOutcome {
    pub name: &'static str,
    pub result: Result<MeasurementResult, BenchError>,
}

impl BenchOutcome {
    pub fn new(name: &'static str, result: Result<MeasurementResult, impl Into<BenchError>>) -> Self {
        Self {
            name,
            result: result.map_err(Into::into),
        }
    }
}

/// Times `operation` under `name` on `harness`, after `warmup` untimed calls.
pub(crate) fn timed<C, F, T>(
    harness: &Harness<C>,
    name: &'static str,
    iterations: u64,
    warmup: u64,
    operation: F,
) -> BenchOutcome
where
    C: MonotonicClock,
    F: FnMut() -> T,
{
    let spec = MeasurementSpec::new(name, iterations, operation).with_warmup(warmup);
    BenchOutcome::new(name, harness.run(spec))
}

/// Names a session would run for `group`, in run order.
pub fn names(group: BenchGroup) -> Vec<&'static str> {
    let mut out = Vec::new();
    for g in BenchGroup::SUITE_ORDER {
        if !group.includes(g) {
            continue;
        }
        out.extend_from_slice(match g {
            BenchGroup::Cpu => cpu::NAMES,
            BenchGroup::Memory => memory::NAMES,
            BenchGroup::Float => float::NAMES,
            BenchGroup::Timer => timer::NAMES,
            BenchGroup::Sleep => sleep::NAMES,
            BenchGroup::All => &[],
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::HarnessError;

    #[test]
    fn timed_outcome_carries_its_name_into_the_result() {
        let clock = ManualClock::new(0);
        let o = timed(&Harness::new(&clock), "addition", 10, 2, || clock.advance(3));

        assert_eq!(o.name, "addition");
        let r = o.result.unwrap();
        assert_eq!(r.name(), "addition");
        assert_eq!(r.iterations(), 10);
        assert_eq!(r.total_time_us(), 30);
    }

    #[test]
    fn timed_failure_keeps_the_catalogue_name() {
        let clock = ManualClock::new(0);
        let o = timed(&Harness::new(&clock), "division", 0, 0, || ());

        assert_eq!(o.name, "division");
        assert!(matches!(
            o.result,
            Err(BenchError::Harness(HarnessError::InvalidIterations { .. }))
        ));
    }

    #[test]
    fn suite_lists_groups_in_order() {
        let all = names(BenchGroup::All);
        assert_eq!(all.first(), Some(&"empty_loop"));
        assert_eq!(all.last(), Some(&"light_sleep"));

        let pos = |n: &str| all.iter().position(|x| *x == n).unwrap();
        assert!(pos("division") < pos("sequential_access"));
        assert!(pos("sequential_access") < pos("float_addition"));
        assert!(pos("float_multiplication") < pos("timer_performance"));
    }

    #[test]
    fn single_group_lists_only_its_names() {
        assert_eq!(names(BenchGroup::Float), float::NAMES);
        assert_eq!(names(BenchGroup::Timer), vec!["timer_performance"]);
    }

    #[test]
    fn names_are_unique_and_csv_safe() {
        let all = names(BenchGroup::All);
        let mut sorted = all.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), all.len());
        assert!(all.iter().all(|n| crate::harness::is_valid_name(n)));
    }
}
