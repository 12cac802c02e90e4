//! Decision layer between parser configurations and classifiers

pub mod classifier;
pub mod decision;
pub mod error;
pub mod model;
pub mod perceptron;
pub mod settings;

pub use classifier::{factory_for, Classifier, ClassifierFactory, PerceptronFactory};
pub use decision::{ActionMapper, ComplexDecision, KBestList, SingleDecision};
pub use error::{GuideError, GuideResult};
pub use model::{DecisionModel, DecisionModelKind, TrainedGuide};
pub use perceptron::Perceptron;
pub use settings::{DecisionSettings, RelationToNextDecision};
