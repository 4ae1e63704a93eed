/// Structured logging for the severity engine
///
/// Provides context-rich logging tagged with the pipeline stage and an
/// optional location identifier. Supports console output and file-based
/// logging for long-running hosts. Logging is a no-op until `init_logger`
/// has been called.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::alert::thresholds::{Actionability, ConcernLevel};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name as written in config files ("debug", "WARN", ...).
    pub fn parse(name: &str) -> Option<LogLevel> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Weight,
    Distribution,
    Classify,
    Config,
    Ingest,
    Engine,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "EXTRACT"),
            Stage::Weight => write!(f, "WEIGHT"),
            Stage::Distribution => write!(f, "DIST"),
            Stage::Classify => write!(f, "CLASSIFY"),
            Stage::Config => write!(f, "CONFIG"),
            Stage::Ingest => write!(f, "INGEST"),
            Stage::Engine => write!(f, "ENGINE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, stage: Stage, location: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format_entry(level, stage, location, message);

        if self.console_timestamps {
            match level {
                LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", stage, location_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", stage, location_part, message),
                LogLevel::Info => println!("   {}", message),
                LogLevel::Debug => println!("   [DEBUG] {}{}: {}", stage, location_part, message),
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Formats a full log line: `<timestamp> <LEVEL> <STAGE> [location]: message`.
fn format_entry(level: LogLevel, stage: Stage, location: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, stage, location_part, message)
}

fn dispatch(level: LogLevel, stage: Stage, location: Option<&str>, message: &str) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, stage, location, message);
        }
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

pub fn info(stage: Stage, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, stage, location, message);
}

pub fn warn(stage: Stage, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, stage, location, message);
}

pub fn error(stage: Stage, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, stage, location, message);
}

pub fn debug(stage: Stage, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, stage, location, message);
}

// ---------------------------------------------------------------------------
// Analysis Summary Logging
// ---------------------------------------------------------------------------

/// Log the outcome of one engine invocation.
pub fn log_analysis_summary(
    location: Option<&str>,
    report_count: usize,
    wbsi_consensus: f64,
    concern: ConcernLevel,
    actionability: Actionability,
) {
    let message = format!(
        "WBSI {:.1} from {} report(s): {} / {}",
        wbsi_consensus, report_count, concern, actionability
    );
    dispatch(summary_level(concern, actionability), Stage::Engine, location, &message);
}

/// Actionable verdicts log at Info. A non-actionable verdict with a real
/// concern level logs at Warning so it stands out; everything else is Debug.
pub fn summary_level(concern: ConcernLevel, actionability: Actionability) -> LogLevel {
    match (actionability, concern) {
        (Actionability::NotActionable, ConcernLevel::LowPriority) => LogLevel::Debug,
        (Actionability::NotActionable, _) => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}
