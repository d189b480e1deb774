use std::fmt;

/// Rejected measurement specs. Caller programming errors; never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// `iterations` was below 1.
    InvalidIterations { name: String, iterations: u64 },
    /// Empty name, or a name that would break a CSV row.
    InvalidName { name: String },
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::InvalidIterations { name, iterations } => write!(
                f,
                "measurement '{name}': iterations must be >= 1 (got {iterations})"
            ),
            HarnessError::InvalidName { name } => write!(
                f,
                "invalid measurement name {name:?}: must be non-empty and contain no ',', CR or LF"
            ),
        }
    }
}

impl std::error::Error for HarnessError {}

/// Failures of an external periodic notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    AlreadyArmed,
    NotArmed,
    /// Period of zero microseconds.
    InvalidPeriod,
    /// The notifier's event source could not be started.
    Spawn(String),
    /// The observation window closed without a single event.
    NoEvents,
}

impl fmt::Display for NotifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierError::AlreadyArmed => write!(f, "notifier is already armed"),
            NotifierError::NotArmed => write!(f, "notifier is not armed"),
            NotifierError::InvalidPeriod => write!(f, "notifier period must be non-zero"),
            NotifierError::Spawn(msg) => write!(f, "failed to arm notifier: {msg}"),
            NotifierError::NoEvents => write!(f, "no notifier events observed in window"),
        }
    }
}

impl std::error::Error for NotifierError {}

/// Any failure of a single benchmark in a session.
#[derive(Debug)]
pub enum BenchError {
    Harness(HarnessError),
    Notifier(NotifierError),
    Sleep(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::Harness(e) => write!(f, "{e}"),
            BenchError::Notifier(e) => write!(f, "{e}"),
            BenchError::Sleep(msg) => write!(f, "sleep transition failed: {msg}"),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Harness(e) => Some(e),
            BenchError::Notifier(e) => Some(e),
            BenchError::Sleep(_) => None,
        }
    }
}

impl From<HarnessError> for BenchError {
    fn from(e: HarnessError) -> Self {
        BenchError::Harness(e)
    }
}

impl From<NotifierError> for BenchError {
    fn from(e: NotifierError) -> Self {
        BenchError::Notifier(e)
    }
}
