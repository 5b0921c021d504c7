//! Log file setup
//!
//! Configured once at process start from explicit [`LogSettings`]. Lines
//! are appended to the log file as
//!
//! ```text
//! 2024-05-01 10:00:00  INFO stream_type_change::migration:142: Processing streams...
//! ```
//!
//! Record-keeping events (every create/update) are `INFO`; prompts and
//! request detail are `DEBUG`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

/// Default log file, appended to across runs
pub const DEFAULT_LOG_FILE: &str = "logfile.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Record of every change (default)
    #[default]
    Info,
    /// Troubleshooting detail
    Debug,
    /// Everything, including dependencies' detail
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Where and how much to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Log file, opened in append mode
    pub file: PathBuf,
    /// Verbosity
    pub level: LogLevel,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_LOG_FILE),
            level: LogLevel::default(),
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, overrides the level.
pub fn init(settings: &LogSettings) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .map_err(|e| anyhow::anyhow!("could not open log file {}: {e}", settings.file.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install logger: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_match_levels() {
        assert_eq!(LogLevel::default().as_filter(), "info");
        assert_eq!(LogLevel::Debug.as_filter(), "debug");
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            file: dir.path().join("missing").join("logfile.txt"),
            level: LogLevel::Info,
        };

        let err = init(&settings).unwrap_err();
        assert!(err.to_string().contains("could not open log file"));
    }
}
