//! Oracle errors

use crate::logging::{codes, Code};
use crate::transition::TransitionError;

pub type OracleResult<T> = Result<T, OracleError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Gold structure cannot be derived by {algorithm}: {reason}")]
    NotExpressible { algorithm: String, reason: String },

    #[error("Oracle derivation for sentence {sentence} diverged from the gold structure: {reason}")]
    Divergence { sentence: usize, reason: String },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl OracleError {
    pub fn not_expressible(algorithm: &str, reason: &str) -> Self {
        Self::NotExpressible {
            algorithm: algorithm.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn divergence(sentence: usize, reason: impl Into<String>) -> Self {
        Self::Divergence {
            sentence,
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::NotExpressible { .. } => codes::oracle::NOT_EXPRESSIBLE,
            Self::Divergence { .. } => codes::oracle::DIVERGENCE,
            Self::Transition(e) => e.error_code(),
        }
    }

    /// A sentence outside the algorithm's class can be skipped; anything else is a bug
    pub fn requires_halt(&self) -> bool {
        !matches!(self, Self::NotExpressible { .. })
    }
}
