//! Thread-parallel batch parsing
//!
//! The batch is cut into contiguous slices, one per worker. Each worker owns
//! a [`DeterministicParser`] over the shared read-only model and parses its
//! slice in order; outputs are joined back in worker order, so the result
//! matches a sequential parse sentence for sentence.

pub mod error;
pub mod results;

pub use error::{EngineError, EngineResult};
pub use results::{BatchResults, SentenceFailure};

use crate::config::constants::engine::{DEFAULT_THREADS, MAX_THREADS};
use crate::config::runtime::EnginePreferences;
use crate::config::ParserOptions;
use crate::corpus::Sentence;
use crate::logging::{self, codes};
use crate::parser::{DeterministicParser, TrainedModel};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub threads: usize,
    /// Abort the batch on the first failing sentence
    pub fail_fast: bool,
    pub progress_reporting: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            fail_fast: true,
            progress_reporting: false,
        }
    }
}

impl EngineConfig {
    /// Options file settings, overridden by the environment
    pub fn from_options(options: &ParserOptions) -> Self {
        let preferences = EnginePreferences::default();
        Self {
            threads: preferences.threads.unwrap_or(options.engine.threads),
            fail_fast: options.engine.fail_fast,
            progress_reporting: preferences.progress_reporting,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.threads == 0 || self.threads > MAX_THREADS {
            return Err(EngineError::InvalidThreadCount {
                threads: self.threads,
                max: MAX_THREADS,
            });
        }
        Ok(())
    }
}

/// Contiguous slices of `n` sentences for `threads` workers
///
/// Every worker gets `n / threads` sentences and the last one also takes the
/// remainder. Never more workers than sentences.
pub fn partition(n: usize, threads: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let threads = threads.clamp(1, n);
    let interval = n / threads;
    (0..threads)
        .map(|worker| {
            let start = worker * interval;
            let end = if worker + 1 == threads { n } else { start + interval };
            start..end
        })
        .collect()
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug)]
pub struct ConcurrentEngine {
    model: Arc<TrainedModel>,
    config: EngineConfig,
}

impl ConcurrentEngine {
    pub fn new(model: Arc<TrainedModel>, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse every sentence on worker threads, output in input order
    pub fn parse_batch(&self, sentences: &[Sentence]) -> EngineResult<BatchResults> {
        let start = Instant::now();
        let ranges = partition(sentences.len(), self.config.threads);

        crate::log_info!("Starting batch parse",
            "sentences" => sentences.len(),
            "threads" => ranges.len()
        );

        let abort = Arc::new(AtomicBool::new(false));
        let handles: Vec<_> = ranges
            .iter()
            .enumerate()
            .map(|(worker, range)| {
                let slice = sentences[range.clone()].to_vec();
                let offset = range.start;
                let model = Arc::clone(&self.model);
                let config = self.config.clone();
                let abort = Arc::clone(&abort);
                thread::spawn(move || run_worker(worker, offset, &slice, model, &config, &abort))
            })
            .collect();

        let mut results = BatchResults::new();
        let mut first_error = None;
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(output)) => results.merge(output),
                Ok(Err(error)) => {
                    first_error.get_or_insert(error);
                }
                Err(_) => {
                    crate::log_error!(codes::engine::THREAD_PANICKED, "Worker panicked", "worker" => worker);
                    first_error.get_or_insert(EngineError::ThreadPanicked { worker });
                }
            }
        }
        if let Some(error) = first_error {
            return Err(error);
        }

        results.threads_used = ranges.len();
        results.duration = start.elapsed();
        crate::log_success!(codes::success::BATCH_COMPLETE, "Batch parse completed",
            "sentences" => results.sentences.len(),
            "failed" => results.failure_count(),
            "threads" => results.threads_used,
            "duration_ms" => format!("{:.2}", results.duration.as_secs_f64() * 1000.0)
        );
        Ok(results)
    }

    /// Single-threaded reference parse of the same batch
    pub fn parse_sequential(&self, sentences: &[Sentence]) -> EngineResult<BatchResults> {
        let start = Instant::now();
        let abort = AtomicBool::new(false);
        let mut results = run_worker(0, 0, sentences, Arc::clone(&self.model), &self.config, &abort)?;
        results.threads_used = 1;
        results.duration = start.elapsed();
        Ok(results)
    }
}

/// Parse one slice; `offset` is the batch index of its first sentence
fn run_worker(
    worker: usize,
    offset: usize,
    sentences: &[Sentence],
    model: Arc<TrainedModel>,
    config: &EngineConfig,
    abort: &AtomicBool,
) -> EngineResult<BatchResults> {
    let mut parser = DeterministicParser::new(model);
    let mut output = BatchResults::new();
    output.sentences.reserve(sentences.len());

    for (index, sentence) in sentences.iter().enumerate() {
        if abort.load(Ordering::Relaxed) {
            break;
        }
        let sentence_id = offset + index + 1;
        match logging::with_sentence_context(worker, sentence_id, || parser.parse(sentence)) {
            Ok(parsed) => output.sentences.push(parsed),
            Err(error) if config.fail_fast => {
                abort.store(true, Ordering::Relaxed);
                crate::log_error!(error.error_code(), "Sentence failed, aborting batch",
                    "worker" => worker,
                    "sentence" => sentence_id,
                    "error" => &error
                );
                return Err(EngineError::worker(worker, sentence_id, error));
            }
            Err(error) => {
                crate::log_error!(error.error_code(), "Sentence failed, keeping its input",
                    "worker" => worker,
                    "sentence" => sentence_id,
                    "error" => &error
                );
                output.sentences.push(sentence.clone());
                output.failures.push(SentenceFailure {
                    sentence: sentence_id,
                    error,
                });
            }
        }
    }
    output.statistics = *parser.statistics();

    if config.progress_reporting {
        crate::log_success!(codes::success::WORKER_COMPLETE, "Worker finished",
            "worker" => worker,
            "sentences" => output.sentences.len(),
            "fallbacks" => output.statistics.fallbacks
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::strip_gold;
    use crate::parser::fixtures::{corpus, non_projective};
    use crate::parser::{ParserError, Trainer};
    use assert_matches::assert_matches;

    fn model() -> Arc<TrainedModel> {
        let (model, _) = Trainer::new(ParserOptions::default())
            .unwrap()
            .train(&corpus())
            .unwrap();
        Arc::new(model)
    }

    fn batch(n: usize) -> Vec<Sentence> {
        let mut pool = corpus();
        pool.push(non_projective());
        pool.iter().cycle().take(n).map(strip_gold).collect()
    }

    fn too_long() -> Sentence {
        let rows = (1..=crate::config::constants::parsing::MAX_SENTENCE_TOKENS + 1)
            .map(|i| vec![i.to_string(), "w".to_string()])
            .collect();
        Sentence::from_rows(rows).unwrap()
    }

    #[test]
    fn test_partition() {
        assert_eq!(partition(10, 3), vec![0..3, 3..6, 6..10]);
        assert_eq!(partition(8, 8).len(), 8);
        assert_eq!(partition(2, 8), vec![0..1, 1..2]);
        assert_eq!(partition(5, 1), vec![0..5]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn test_partition_covers_every_sentence_once() {
        for n in 1..40 {
            for threads in 1..10 {
                let ranges = partition(n, threads);
                assert!(ranges.iter().all(|r| !r.is_empty()));
                assert_eq!(ranges.first().map(|r| r.start), Some(0));
                assert_eq!(ranges.last().map(|r| r.end), Some(n));
                assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            }
        }
    }

    #[test]
    fn test_parallel_output_matches_sequential() {
        let engine = ConcurrentEngine::new(model(), EngineConfig::default().with_threads(3)).unwrap();
        let sentences = batch(11);

        let parallel = engine.parse_batch(&sentences).unwrap();
        let sequential = engine.parse_sequential(&sentences).unwrap();

        assert_eq!(parallel.threads_used, 3);
        assert_eq!(parallel.sentences, sequential.sentences);
        assert_eq!(parallel.statistics, sequential.statistics);
        assert!(parallel.summary().contains("Parsed 11 sentences"));
    }

    #[test]
    fn test_fail_fast_aborts_batch() {
        let engine = ConcurrentEngine::new(model(), EngineConfig::default().with_threads(2)).unwrap();
        let mut sentences = batch(4);
        sentences.insert(3, too_long());

        assert_matches!(
            engine.parse_batch(&sentences),
            Err(EngineError::Worker { sentence: 4, .. })
        );
    }

    #[test]
    fn test_failures_recorded_without_fail_fast() {
        let config = EngineConfig {
            threads: 2,
            fail_fast: false,
            progress_reporting: true,
        };
        let engine = ConcurrentEngine::new(model(), config).unwrap();
        let mut sentences = batch(4);
        sentences.insert(1, too_long());

        let results = engine.parse_batch(&sentences).unwrap();
        assert_eq!(results.sentences.len(), 5);
        assert_eq!(results.sentences[1], sentences[1]);
        assert_eq!(results.failure_count(), 1);
        assert_eq!(results.failures[0].sentence, 2);
        assert_matches!(results.failures[0].error, ParserError::SentenceTooLong { .. });
    }

    #[test]
    fn test_invalid_thread_count() {
        assert_matches!(
            ConcurrentEngine::new(model(), EngineConfig::default().with_threads(0)),
            Err(EngineError::InvalidThreadCount { threads: 0, .. })
        );
    }
}
