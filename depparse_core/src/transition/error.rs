//! Transition system errors

use crate::graph::GraphError;
use crate::logging::{codes, Code};

pub type TransitionResult<T> = Result<T, TransitionError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Transition {transition} is not permissible for {algorithm}: {reason}")]
    IllegalTransition {
        transition: String,
        algorithm: String,
        reason: String,
    },

    #[error("Configuration for {found} handed to the {expected} transition system")]
    ConfigurationMismatch { expected: String, found: String },

    #[error("Transition '{symbol}' is not part of the {algorithm} transition table")]
    UnknownTransition { symbol: String, algorithm: String },

    #[error("Transition budget of {limit} exhausted on a sentence of {tokens} tokens")]
    TransitionLimit { limit: usize, tokens: usize },

    #[error("Arc could not be added: {source}")]
    Graph {
        #[from]
        source: GraphError,
    },
}

impl TransitionError {
    pub fn illegal(transition: impl ToString, algorithm: &str, reason: &str) -> Self {
        Self::IllegalTransition {
            transition: transition.to_string(),
            algorithm: algorithm.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_transition(symbol: impl ToString, algorithm: &str) -> Self {
        Self::UnknownTransition {
            symbol: symbol.to_string(),
            algorithm: algorithm.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::IllegalTransition { .. } => codes::transition::ILLEGAL_TRANSITION,
            Self::ConfigurationMismatch { .. } => codes::transition::CONFIGURATION_MISMATCH,
            Self::UnknownTransition { .. } => codes::transition::UNKNOWN_TRANSITION,
            Self::TransitionLimit { .. } => codes::transition::TRANSITION_LIMIT,
            Self::Graph { source } => source.error_code(),
        }
    }

    pub fn requires_halt(&self) -> bool {
        true
    }
}
