use crate::corpus::Sentence;
use crate::parser::{ParseStatistics, ParserError};
use std::time::Duration;

/// A sentence that could not be parsed; its input is kept in the output
#[derive(Debug)]
pub struct SentenceFailure {
    pub sentence: usize,
    pub error: ParserError,
}

/// Parsed sentences in input order plus what happened on the way
#[derive(Debug, Default)]
pub struct BatchResults {
    pub sentences: Vec<Sentence>,
    pub failures: Vec<SentenceFailure>,
    pub statistics: ParseStatistics,
    pub threads_used: usize,
    pub duration: Duration,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Append a worker's output; workers must be merged in order
    pub fn merge(&mut self, other: BatchResults) {
        self.sentences.extend(other.sentences);
        self.failures.extend(other.failures);
        self.statistics.merge(&other.statistics);
    }

    pub fn summary(&self) -> String {
        format!(
            "Parsed {} sentences ({} tokens) with {} threads in {:.2}s: {} failed, {} fallbacks, {} k-best retries",
            self.sentences.len(),
            self.statistics.tokens,
            self.threads_used,
            self.duration.as_secs_f64(),
            self.failure_count(),
            self.statistics.fallbacks,
            self.statistics.kbest_retries
        )
    }
}
