//! Dependency structure errors

use crate::logging::{codes, Code};

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Node {node} does not exist in a structure of {size} tokens")]
    InvalidNode { node: usize, size: usize },

    #[error("Token {dependent} already has head {existing_head}, cannot attach it to {new_head}")]
    MultipleHeads {
        dependent: usize,
        existing_head: usize,
        new_head: usize,
    },

    #[error("The root node cannot be a dependent (head {head})")]
    RootAsDependent { head: usize },
}

impl GraphError {
    pub fn invalid_node(node: usize, size: usize) -> Self {
        Self::InvalidNode { node, size }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::InvalidNode { .. } => codes::graph::INVALID_NODE,
            Self::MultipleHeads { .. } => codes::graph::MULTIPLE_HEADS,
            Self::RootAsDependent { .. } => codes::graph::ROOT_AS_DEPENDENT,
        }
    }

    pub fn requires_halt(&self) -> bool {
        true
    }
}
