//! Classifier contract consumed by the decision models

use super::error::{GuideError, GuideResult};
use super::perceptron::Perceptron;
use std::fmt;

/// A trainable multiclass classifier over integer feature vectors
///
/// Feature vectors are positional: the value at index `i` is the code
/// produced by the `i`-th feature function.
pub trait Classifier: Send + Sync + fmt::Debug {
    fn add_instance(&mut self, features: &[i32], decision: i32) -> GuideResult<()>;

    /// Batch training over every instance added so far
    fn train(&mut self) -> GuideResult<()>;

    /// Decision codes ranked best first
    fn predict(&self, features: &[i32]) -> GuideResult<Vec<i32>>;

    fn instance_count(&self) -> usize;

    /// Serializable state of a trained classifier
    fn save_state(&self) -> GuideResult<serde_json::Value>;
}

/// Builds classifiers for named sub-models and restores them from saved state
pub trait ClassifierFactory: Send + Sync + fmt::Debug {
    fn learner(&self) -> &str;

    fn create(&self, model: &str) -> Box<dyn Classifier>;

    fn restore(&self, model: &str, state: serde_json::Value) -> GuideResult<Box<dyn Classifier>>;
}

#[derive(Debug, Clone)]
pub struct PerceptronFactory {
    epochs: usize,
}

impl PerceptronFactory {
    pub fn new(epochs: usize) -> Self {
        Self { epochs }
    }
}

impl ClassifierFactory for PerceptronFactory {
    fn learner(&self) -> &str {
        "perceptron"
    }

    fn create(&self, _model: &str) -> Box<dyn Classifier> {
        Box::new(Perceptron::new(self.epochs))
    }

    fn restore(&self, model: &str, state: serde_json::Value) -> GuideResult<Box<dyn Classifier>> {
        let perceptron: Perceptron = serde_json::from_value(state).map_err(|e| GuideError::Serialization {
            error: format!("model '{}': {}", model, e),
        })?;
        Ok(Box::new(perceptron))
    }
}

/// Factory for the learner named in the options
pub fn factory_for(learner: &str, epochs: usize) -> GuideResult<Box<dyn ClassifierFactory>> {
    if learner.eq_ignore_ascii_case("perceptron") {
        Ok(Box::new(PerceptronFactory::new(epochs)))
    } else {
        Err(GuideError::training_failure(
            learner,
            "no classifier is registered under this name",
        ))
    }
}
