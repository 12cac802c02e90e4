//! Transitions shared by every parsing algorithm

pub mod error;
pub mod table;

pub use error::{TransitionError, TransitionResult};
pub use table::{Transition, TransitionEntry, TransitionKind, TransitionTable};
