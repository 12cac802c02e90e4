//! Logging configuration: compile-time limits plus runtime preferences

use crate::config::constants::logging::{EVENT_BUFFER_SIZE, MAX_MESSAGE_LENGTH};
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call wins
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn forward_to_log_crate() -> bool {
    get_runtime_preferences().forward_to_log_crate
}

pub fn get_event_buffer_size() -> usize {
    EVENT_BUFFER_SIZE
}

pub fn get_max_message_length() -> usize {
    MAX_MESSAGE_LENGTH
}

/// Sanity-check compile-time limits
pub fn validate_config() -> Result<(), String> {
    if EVENT_BUFFER_SIZE < 16 {
        return Err(format!("Event buffer size too small: {}", EVENT_BUFFER_SIZE));
    }
    if MAX_MESSAGE_LENGTH == 0 {
        return Err("Maximum message length must be positive".to_string());
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "Logging Configuration:\n\
         - Event buffer size: {}\n\
         - Max message length: {}\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Forward to log crate: {}",
        EVENT_BUFFER_SIZE,
        MAX_MESSAGE_LENGTH,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.forward_to_log_crate,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Event buffer size"));
        assert!(summary.contains("Min log level"));
    }
}
