use clap::{Parser, Subcommand, ValueEnum};
use log::{info, LevelFilter};
use mcu_microbench::benches;
use mcu_microbench::clock::SystemClock;
use mcu_microbench::harness::{BenchConfig, Profile};
use mcu_microbench::logging;
use mcu_microbench::notifier::ThreadNotifier;
use mcu_microbench::schema::{CsvSink, RunMeta, SessionReport};
use mcu_microbench::session::Session;
use mcu_microbench::sleep::ThreadSleep;
use mcu_microbench::BenchGroup;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(v: LogLevel) -> Self {
        match v {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a benchmark session.
    Run {
        /// Which benchmark group(s) to run.
        #[arg(long, value_enum, default_value_t = BenchGroup::All)]
        group: BenchGroup,

        /// Number of passes over the selected groups.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        cycles: u32,

        /// Pause between passes, in milliseconds.
        #[arg(long, default_value_t = 30_000)]
        cycle_delay_ms: u64,

        /// Untimed repetitions before each timed loop; defaults to the profile's count.
        #[arg(long)]
        warmup: Option<u64>,
    },

    /// Print the benchmark names a `run` would execute, one per line.
    List {
        #[arg(long, value_enum, default_value_t = BenchGroup::All)]
        group: BenchGroup,
    },
}

#[derive(Parser, Debug)]
#[command(name = "mcu-microbench")]
#[command(about = "Timed-loop microbenchmark runner (CSV or JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    /// Seed for randomized access patterns.
    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = Format::Csv, global = true)]
    format: Format,

    /// Where to write results. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc_unix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn open_output(out: Option<&PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    })
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    logging::init(args.log_level.into()).map_err(io::Error::other)?;

    let (group, cycles, cycle_delay_ms, warmup) = match args.cmd {
        Command::List { group } => {
            let mut out = open_output(args.out.as_ref())?;
            for name in benches::names(group) {
                writeln!(out, "{name}")?;
            }
            return out.flush();
        }
        Command::Run {
            group,
            cycles,
            cycle_delay_ms,
            warmup,
        } => (group, cycles, cycle_delay_ms, warmup),
    };

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
        warmup_override: warmup,
    };
    info!(
        "mcu-microbench {} on {} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    );

    let mut session = Session::new(cfg.clone(), SystemClock::new(), ThreadNotifier::new(), ThreadSleep);
    let delay = Duration::from_millis(cycle_delay_ms);
    let out = open_output(args.out.as_ref())?;

    match args.format {
        Format::Csv => {
            let mut sink = CsvSink::new(out)?;
            session.run(group, cycles, delay, |r| sink.write_result(r))?;
            sink.finish()?;
        }
        Format::Json => {
            let mut measurements = Vec::new();
            session.run(group, cycles, delay, |r| {
                measurements.push(r.clone());
                Ok(())
            })?;

            let report = SessionReport {
                run: RunMeta {
                    schema_version: 1,
                    bench_version: env!("CARGO_PKG_VERSION").to_string(),
                    profile: cfg.profile.as_str().to_string(),
                    seed: cfg.seed,
                    cycles,
                    target_arch: std::env::consts::ARCH.to_string(),
                    timestamp_utc: now_utc_unix(),
                    git_sha: git_sha_short(),
                },
                measurements,
            };

            let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
            let mut out = out;
            writeln!(out, "{json}")?;
            out.flush()?;
        }
    }

    Ok(())
}
