//! Transitions and the per-algorithm transition tables

use super::error::{TransitionError, TransitionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransitionKind {
    Shift,
    Reduce,
    LeftArc,
    RightArc,
    NoArc,
    Switch,
}

impl TransitionKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            TransitionKind::Shift => "SH",
            TransitionKind::Reduce => "RE",
            TransitionKind::LeftArc => "LA",
            TransitionKind::RightArc => "RA",
            TransitionKind::NoArc => "NA",
            TransitionKind::Switch => "SW",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "SH" => Some(TransitionKind::Shift),
            "RE" => Some(TransitionKind::Reduce),
            "LA" => Some(TransitionKind::LeftArc),
            "RA" => Some(TransitionKind::RightArc),
            "NA" => Some(TransitionKind::NoArc),
            "SW" => Some(TransitionKind::Switch),
            _ => None,
        }
    }

    /// Whether the transition creates an arc and so carries a label
    pub fn is_arc(&self) -> bool {
        matches!(self, TransitionKind::LeftArc | TransitionKind::RightArc)
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A transition plus the label code of the arc it creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub kind: TransitionKind,
    pub label: Option<i32>,
}

impl Transition {
    pub fn new(kind: TransitionKind) -> Self {
        Self { kind, label: None }
    }

    pub fn labeled(kind: TransitionKind, label: i32) -> Self {
        Self {
            kind,
            label: Some(label),
        }
    }

    pub fn shift() -> Self {
        Self::new(TransitionKind::Shift)
    }

    pub fn reduce() -> Self {
        Self::new(TransitionKind::Reduce)
    }

    pub fn no_arc() -> Self {
        Self::new(TransitionKind::NoArc)
    }

    pub fn switch() -> Self {
        Self::new(TransitionKind::Switch)
    }

    pub fn left_arc(label: Option<i32>) -> Self {
        Self {
            kind: TransitionKind::LeftArc,
            label,
        }
    }

    pub fn right_arc(label: Option<i32>) -> Self {
        Self {
            kind: TransitionKind::RightArc,
            label,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            Some(label) => write!(f, "{}({})", self.kind, label),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEntry {
    pub code: i32,
    pub kind: TransitionKind,
    pub labeled: bool,
}

/// Transitions one algorithm can take, coded from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    algorithm: String,
    entries: Vec<TransitionEntry>,
}

impl TransitionTable {
    pub fn new(algorithm: &str, kinds: &[TransitionKind]) -> Self {
        let entries = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| TransitionEntry {
                code: i as i32 + 1,
                kind,
                labeled: kind.is_arc(),
            })
            .collect();
        Self {
            algorithm: algorithm.to_string(),
            entries,
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn entries(&self) -> &[TransitionEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> impl Iterator<Item = TransitionKind> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    pub fn contains(&self, kind: TransitionKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    pub fn code(&self, kind: TransitionKind) -> TransitionResult<i32> {
        self.entries
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.code)
            .ok_or_else(|| TransitionError::unknown_transition(kind, &self.algorithm))
    }

    pub fn kind(&self, code: i32) -> TransitionResult<TransitionKind> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.kind)
            .ok_or_else(|| TransitionError::unknown_transition(code, &self.algorithm))
    }

    pub fn kind_for_symbol(&self, symbol: &str) -> TransitionResult<TransitionKind> {
        TransitionKind::from_symbol(symbol)
            .filter(|k| self.contains(*k))
            .ok_or_else(|| TransitionError::unknown_transition(symbol, &self.algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_codes_start_at_one() {
        let table = TransitionTable::new(
            "nivreeager",
            &[
                TransitionKind::Shift,
                TransitionKind::Reduce,
                TransitionKind::RightArc,
                TransitionKind::LeftArc,
            ],
        );
        assert_eq!(table.code(TransitionKind::Shift).unwrap(), 1);
        assert_eq!(table.code(TransitionKind::LeftArc).unwrap(), 4);
        assert_eq!(table.kind(2).unwrap(), TransitionKind::Reduce);
        assert!(table.entries()[2].labeled);
        assert!(!table.entries()[1].labeled);
    }

    #[test]
    fn test_foreign_transitions_rejected() {
        let table = TransitionTable::new("stackproj", &[TransitionKind::Shift, TransitionKind::LeftArc]);
        assert_matches!(
            table.code(TransitionKind::Switch),
            Err(TransitionError::UnknownTransition { .. })
        );
        assert_matches!(table.kind(0), Err(TransitionError::UnknownTransition { .. }));
        assert_matches!(table.kind_for_symbol("NA"), Err(TransitionError::UnknownTransition { .. }));
        assert_eq!(table.kind_for_symbol("LA").unwrap(), TransitionKind::LeftArc);
    }

    #[test]
    fn test_display() {
        assert_eq!(Transition::right_arc(Some(4)).to_string(), "RA(4)");
        assert_eq!(Transition::shift().to_string(), "SH");
    }
}
