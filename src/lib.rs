use clap::ValueEnum;

pub mod benches;
pub mod clock;
pub mod console;
pub mod error;
pub mod harness;
pub mod logging;
pub mod notifier;
pub mod schema;
pub mod session;
pub mod sleep;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use error::{BenchError, HarnessError, NotifierError};
pub use harness::{run, Harness, MeasurementSpec};
pub use schema::{format_csv_header, format_csv_row, MeasurementResult};

/// Benchmark group(s) to run.
#[derive(Clone, Copy, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum BenchGroup {
    /// Every group, in suite order.
    #[default]
    All,
    /// Empty loop, integer arithmetic, clock-read call overhead, instruction blocks.
    Cpu,
    /// Array access patterns.
    Memory,
    /// Single-precision float arithmetic.
    Float,
    /// Periodic timer callback rate.
    Timer,
    /// Active wait and light-sleep transitions.
    Sleep,
}

impl BenchGroup {
    /// Concrete groups in the order a full suite runs them.
    pub const SUITE_ORDER: [BenchGroup; 5] = [
        BenchGroup::Cpu,
        BenchGroup::Memory,
        BenchGroup::Float,
        BenchGroup::Timer,
        BenchGroup::Sleep,
    ];

    pub fn includes(&self, other: BenchGroup) -> bool {
        *self == BenchGroup::All || *self == other
    }
}
