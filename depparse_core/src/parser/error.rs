use crate::algorithm::OracleError;
use crate::config::ConfigError;
use crate::corpus::CorpusError;
use crate::feature::FeatureError;
use crate::graph::GraphError;
use crate::guide::GuideError;
use crate::logging::{codes, Code};
use crate::symbols::SymbolError;
use crate::transition::TransitionError;

/// Errors of the training and parsing drivers
#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Symbol table failure: {0}")]
    Symbol(#[from] SymbolError),

    #[error("Dependency structure failure: {0}")]
    Graph(#[from] GraphError),

    #[error("Transition failure: {0}")]
    Transition(#[from] TransitionError),

    #[error("Oracle failure: {0}")]
    Oracle(#[from] OracleError),

    #[error("Decision model failure: {0}")]
    Guide(#[from] GuideError),

    #[error("Feature extraction failed: {0}")]
    Feature(#[from] FeatureError),

    #[error("Corpus failure: {0}")]
    Corpus(#[from] CorpusError),

    #[error("Sentence {sentence} has {tokens} tokens, more than the limit of {limit}")]
    SentenceTooLong {
        sentence: usize,
        tokens: usize,
        limit: usize,
    },

    #[error("Parsing did not terminate within {budget} transitions")]
    TransitionLimit { budget: usize },

    #[error("Model directory '{path}': {reason}")]
    Model { path: String, reason: String },
}

impl ParserError {
    pub fn model(path: impl ToString, reason: impl ToString) -> Self {
        Self::Model {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Symbol(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Transition(e) => e.error_code(),
            Self::Oracle(e) => e.error_code(),
            Self::Guide(e) => e.error_code(),
            Self::Feature(e) => e.error_code(),
            Self::Corpus(e) => e.error_code(),
            Self::SentenceTooLong { .. } => codes::corpus::MALFORMED_ROW,
            Self::TransitionLimit { .. } => codes::transition::TRANSITION_LIMIT,
            Self::Model { .. } => codes::guide::GUIDE_IO,
        }
    }

    pub fn requires_halt(&self) -> bool {
        match self {
            Self::Oracle(e) => e.requires_halt(),
            Self::Guide(e) => e.requires_halt(),
            Self::SentenceTooLong { .. } => false,
            _ => true,
        }
    }
}

pub type ParserResult<T> = Result<T, ParserError>;
