use crate::logging::{codes, Code};

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Corpus I/O error for '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },

    #[error("No sentences in '{path}'")]
    EmptyCorpus { path: String },

    #[error("Sentence {sentence}: {reason}")]
    Mismatch { sentence: usize, reason: String },
}

impl CorpusError {
    pub fn io(path: impl ToString, error: impl ToString) -> Self {
        Self::Io {
            path: path.to_string(),
            error: error.to_string(),
        }
    }

    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Io { .. } => codes::corpus::CORPUS_IO,
            Self::MalformedRow { .. } | Self::Mismatch { .. } => codes::corpus::MALFORMED_ROW,
            Self::EmptyCorpus { .. } => codes::corpus::EMPTY_CORPUS,
        }
    }

    pub fn requires_halt(&self) -> bool {
        !matches!(self, Self::EmptyCorpus { .. })
    }
}

pub type CorpusResult<T> = Result<T, CorpusError>;
