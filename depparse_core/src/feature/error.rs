use crate::logging::{codes, Code};
use crate::symbols::SymbolError;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("Unknown feature function '{name}'")]
    UnknownFunction { name: String },

    #[error("Malformed feature specification '{spec}': {reason}")]
    MalformedSpec { spec: String, reason: String },

    #[error("Address function '{address}' is not available for {algorithm}")]
    UnsupportedAddress { address: String, algorithm: String },

    #[error("Column '{column}' cannot be used by {function}")]
    UnknownColumn { column: String, function: String },

    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

impl FeatureError {
    pub fn malformed(spec: &str, reason: impl Into<String>) -> Self {
        Self::MalformedSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownFunction { .. } => codes::features::UNKNOWN_FUNCTION,
            Self::MalformedSpec { .. } | Self::UnknownColumn { .. } => codes::features::MALFORMED_SPEC,
            Self::UnsupportedAddress { .. } => codes::features::UNSUPPORTED_ADDRESS,
            Self::Symbol(e) => e.error_code(),
        }
    }
}

pub type FeatureResult<T> = Result<T, FeatureError>;
