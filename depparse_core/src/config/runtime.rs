// RUNTIME PREFERENCES (environment driven)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Emit JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Route events through the `log` facade (binaries with a log backend)
    pub forward_to_log_crate: bool,

    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("DEPPARSE_STRUCTURED_LOGGING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            forward_to_log_crate: env::var("DEPPARSE_FORWARD_TO_LOG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("DEPPARSE_LOG_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginePreferences {
    /// Overrides the thread count from the options file
    pub threads: Option<usize>,

    /// Log a line per finished worker
    pub progress_reporting: bool,
}

impl Default for EnginePreferences {
    fn default() -> Self {
        Self {
            threads: env::var("DEPPARSE_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0),
            progress_reporting: env::var("DEPPARSE_PROGRESS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPreferences {
    /// Re-check that each oracle derivation reproduces its gold tree
    pub verify_oracle: bool,

    /// Skip sentences outside the algorithm's structural class instead of failing
    pub skip_inexpressible: bool,
}

impl Default for TrainingPreferences {
    fn default() -> Self {
        Self {
            verify_oracle: env::var("DEPPARSE_VERIFY_ORACLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            skip_inexpressible: env::var("DEPPARSE_SKIP_INEXPRESSIBLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" | "trace" => Some(LogLevel::Debug),
        _ => None,
    }
}
