//! Transition-based dependency parsing
//!
//! Sentences are parsed by applying transitions to a parser configuration.
//! During training an oracle derives the transitions from gold trees and the
//! decision models learn from them; during parsing the trained guide picks
//! them, falling back through its ranked candidates when the best one is
//! illegal. Batches are parsed on worker threads over one shared model.

#[macro_use]
pub mod logging;

pub mod algorithm;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod eval;
pub mod feature;
pub mod graph;
pub mod guide;
pub mod parser;
pub mod symbols;
pub mod transition;

pub use algorithm::{OracleGuide, ParseMode, ParserConfiguration, ParsingAlgorithm};
pub use config::{Algorithm, ParserOptions};
pub use corpus::Sentence;
pub use engine::{BatchResults, ConcurrentEngine, EngineConfig, EngineError};
pub use eval::AttachmentScores;
pub use parser::{DeterministicParser, ParseStatistics, ParserError, TrainedModel, Trainer};
