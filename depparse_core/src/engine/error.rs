use crate::logging::{codes, Code};
use crate::parser::ParserError;

/// Batch parsing errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Worker {worker} failed on sentence {sentence}: {source}")]
    Worker {
        worker: usize,
        sentence: usize,
        source: Box<ParserError>,
    },

    #[error("Worker {worker} panicked")]
    ThreadPanicked { worker: usize },

    #[error("Invalid thread count {threads} (must be between 1 and {max})")]
    InvalidThreadCount { threads: usize, max: usize },
}

impl EngineError {
    pub fn worker(worker: usize, sentence: usize, error: ParserError) -> Self {
        Self::Worker {
            worker,
            sentence,
            source: Box::new(error),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Worker { .. } => codes::engine::WORKER_FAILURE,
            Self::ThreadPanicked { .. } => codes::engine::THREAD_PANICKED,
            Self::InvalidThreadCount { .. } => codes::engine::INVALID_THREAD_COUNT,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
