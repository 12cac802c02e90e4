//! Sentence graphs mutated by the transition systems

pub mod error;
pub mod structure;
pub mod token;

pub use error::{GraphError, GraphResult};
pub use structure::{DependencyStructure, Edge};
pub use token::{Token, TokenPool};
