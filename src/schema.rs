use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;
use crate::harness::is_valid_name;

/// Column names of the CSV export, in order.
pub const CSV_COLUMNS: [&str; 6] = [
    "timestamp",
    "test_name",
    "iterations",
    "total_time_us",
    "time_per_op_us",
    "ops_per_second",
];

/// How an undefined `ops_per_second` is written in a CSV row.
pub const UNDEFINED_RATE: &str = "inf";

/// Outcome of one timed run. Built once, never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    name: String,
    iterations: u64,
    total_time_us: u64,
    time_per_op_us: f64,
    /// `None` when no time elapsed, i.e. the rate is undefined.
    ops_per_second: Option<f64>,
    timestamp: u64,
}

impl MeasurementResult {
    /// Derives the per-op statistics from a raw count and elapsed time.
    ///
    /// Rejects a name that would break a CSV row and a count below 1. A zero
    /// `total_time_us` yields `time_per_op_us == 0.0` and an undefined rate.
    pub fn from_elapsed(
        name: impl Into<String>,
        iterations: u64,
        total_time_us: u64,
        timestamp: u64,
    ) -> Result<Self, HarnessError> {
        let name = name.into();
        check_measurement(&name, iterations)?;

        let (time_per_op_us, ops_per_second) = if total_time_us == 0 {
            (0.0, None)
        } else {
            let total = total_time_us as f64;
            let iters = iterations as f64;
            (total / iters, Some(iters * 1_000_000.0 / total))
        };

        Ok(Self {
            name,
            iterations,
            total_time_us,
            time_per_op_us,
            ops_per_second,
            timestamp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn total_time_us(&self) -> u64 {
        self.total_time_us
    }

    pub fn time_per_op_us(&self) -> f64 {
        self.time_per_op_us
    }

    pub fn ops_per_second(&self) -> Option<f64> {
        self.ops_per_second
    }

    /// Monotonic clock reading at completion.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// The checks every result must pass: a CSV-safe name and at least one
/// iteration.
pub(crate) fn check_measurement(name: &str, iterations: u64) -> Result<(), HarnessError> {
    if !is_valid_name(name) {
        return Err(HarnessError::InvalidName {
            name: name.to_string(),
        });
    }
    if iterations < 1 {
        return Err(HarnessError::InvalidIterations {
            name: name.to_string(),
            iterations,
        });
    }
    Ok(())
}

/// The CSV header line, newline-terminated.
pub fn format_csv_header() -> String {
    let mut line = CSV_COLUMNS.join(",");
    line.push('\n');
    line
}

/// One CSV data line for `result`, newline-terminated.
pub fn format_csv_row(result: &MeasurementResult) -> String {
    let rate = match result.ops_per_second {
        Some(ops) => format!("{ops:.0}"),
        None => UNDEFINED_RATE.to_string(),
    };
    format!(
        "{},{},{},{},{:.3},{}\n",
        result.timestamp,
        result.name,
        result.iterations,
        result.total_time_us,
        result.time_per_op_us,
        rate
    )
}

/// Streams a session's results as one CSV table: header first, rows in the
/// order they are written.
pub struct CsvSink<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut out: W) -> io::Result<Self> {
        out.write_all(format_csv_header().as_bytes())?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write_result(&mut self, result: &MeasurementResult) -> io::Result<()> {
        self.out.write_all(format_csv_row(result).as_bytes())?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub cycles: u32,
    pub target_arch: String,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub run: RunMeta,
    pub measurements: Vec<MeasurementResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_stats_follow_definitions() {
        let r = MeasurementResult::from_elapsed("addition", 100_000, 1_000, 7).unwrap();
        assert_eq!(r.total_time_us(), 1_000);
        assert!((r.time_per_op_us() - 0.01).abs() < 1e-12);
        assert_eq!(r.ops_per_second(), Some(100_000_000.0));
        assert_eq!(r.timestamp(), 7);
    }

    #[test]
    fn zero_elapsed_yields_undefined_rate() {
        let r = MeasurementResult::from_elapsed("fast", 5_000, 0, 1).unwrap();
        assert_eq!(r.time_per_op_us(), 0.0);
        assert_eq!(r.ops_per_second(), None);
        assert_eq!(format_csv_row(&r), "1,fast,5000,0,0.000,inf\n");
    }

    #[test]
    fn csv_row_matches_fixed_format() {
        let r = MeasurementResult::from_elapsed("addition", 100_000, 1_000, 123_456).unwrap();
        assert_eq!(
            format_csv_row(&r),
            "123456,addition,100000,1000,0.010,100000000\n"
        );
    }

    #[test]
    fn header_lists_columns_in_order() {
        assert_eq!(
            format_csv_header(),
            "timestamp,test_name,iterations,total_time_us,time_per_op_us,ops_per_second\n"
        );
    }

    #[test]
    fn sink_writes_header_then_rows_in_order() {
        let results = [
            MeasurementResult::from_elapsed("empty_loop", 1_000_000, 6_251, 10).unwrap(),
            MeasurementResult::from_elapsed("division", 100_000, 0, 20).unwrap(),
            MeasurementResult::from_elapsed("light_sleep", 1, 500_123, 30).unwrap(),
        ];

        let mut sink = CsvSink::new(Vec::new()).unwrap();
        for r in &results {
            sink.write_result(r).unwrap();
        }
        assert_eq!(sink.rows(), 3);
        let text = String::from_utf8(sink.finish().unwrap()).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), results.len() + 1);
        assert_eq!(lines[0].split(',').collect::<Vec<_>>(), CSV_COLUMNS);
        for (line, r) in lines[1..].iter().zip(&results) {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), CSV_COLUMNS.len());
            assert_eq!(fields[1], r.name());
        }
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn empty_session_still_has_header() {
        let sink = CsvSink::new(Vec::new()).unwrap();
        let text = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(text, format_csv_header());
    }

    #[test]
    fn zero_iterations_cannot_become_a_result() {
        let err = MeasurementResult::from_elapsed("timer_performance", 0, 10, 1).unwrap_err();
        assert_eq!(
            err,
            HarnessError::InvalidIterations {
                name: "timer_performance".to_string(),
                iterations: 0
            }
        );
    }

    #[test]
    fn names_that_would_split_a_row_are_rejected() {
        for bad in ["a,b", "", "two\nlines", "cr\r"] {
            let err = MeasurementResult::from_elapsed(bad, 1, 10, 1).unwrap_err();
            assert!(matches!(err, HarnessError::InvalidName { .. }), "{bad:?}");
        }
    }

    #[test]
    fn undefined_rate_serializes_as_null() {
        let r = MeasurementResult::from_elapsed("fast", 10, 0, 0).unwrap();
        let v = serde_json::to_value(&r).unwrap();
        assert!(v["ops_per_second"].is_null());
        assert_eq!(v["iterations"], 10);
    }
}
