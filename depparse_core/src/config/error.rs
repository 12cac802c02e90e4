//! Configuration errors: always fatal, always raised before parsing starts

use crate::logging::{codes, Code};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown parsing algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("Invalid value '{value}' for {section}.{option}: {reason}")]
    InvalidOption {
        section: String,
        option: String,
        value: String,
        reason: String,
    },

    #[error("Invalid decision settings '{settings}': {reason}")]
    InvalidDecisionSettings { settings: String, reason: String },

    #[error("Cannot access options file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Options are not valid TOML: {error}")]
    Syntax { error: String },
}

impl ConfigError {
    pub fn invalid_option(section: &str, option: &str, value: impl ToString, reason: &str) -> Self {
        Self::InvalidOption {
            section: section.to_string(),
            option: option.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_decision_settings(settings: &str, reason: &str) -> Self {
        Self::InvalidDecisionSettings {
            settings: settings.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownAlgorithm { .. } => codes::config::UNKNOWN_ALGORITHM,
            Self::InvalidOption { .. } => codes::config::INVALID_OPTION,
            Self::InvalidDecisionSettings { .. } => codes::config::INVALID_DECISION_SETTINGS,
            Self::Io { .. } => codes::config::OPTIONS_IO,
            Self::Syntax { .. } => codes::config::OPTIONS_SYNTAX,
        }
    }

    pub fn requires_halt(&self) -> bool {
        true
    }
}
