use crate::logging::codes;
use crate::symbols::SymbolError;
use crate::transition::TransitionError;

/// Errors raised by decision models and classifiers
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("Operation '{operation}' is not available while the guide is {mode}")]
    ModeViolation { operation: String, mode: String },

    #[error("Training of model '{model}' failed: {reason}")]
    TrainingFailure { model: String, reason: String },

    #[error("Malformed decision: {reason}")]
    MalformedDecision { reason: String },

    #[error("Guide file error for '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Guide serialization failed: {error}")]
    Serialization { error: String },

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl GuideError {
    pub fn mode_violation(operation: &str, mode: &str) -> Self {
        Self::ModeViolation {
            operation: operation.to_string(),
            mode: mode.to_string(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDecision {
            reason: reason.into(),
        }
    }

    pub fn training_failure(model: &str, reason: impl Into<String>) -> Self {
        Self::TrainingFailure {
            model: model.to_string(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            GuideError::ModeViolation { .. } => codes::guide::MODE_VIOLATION,
            GuideError::TrainingFailure { .. } => codes::guide::TRAINING_FAILURE,
            GuideError::MalformedDecision { .. } => codes::guide::MALFORMED_DECISION,
            GuideError::Io { .. } | GuideError::Serialization { .. } => codes::guide::GUIDE_IO,
            GuideError::Symbol(e) => e.error_code(),
            GuideError::Transition(e) => e.error_code(),
        }
    }

    /// A malformed prediction is recovered through the k-best list
    pub fn requires_halt(&self) -> bool {
        !matches!(self, GuideError::MalformedDecision { .. })
    }
}

impl From<serde_json::Error> for GuideError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            error: error.to_string(),
        }
    }
}

pub type GuideResult<T> = Result<T, GuideError>;
