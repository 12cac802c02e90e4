//! Decision settings such as `T.TRANS+A.DEPREL`
//!
//! The first part always names the transition table. An optional second part
//! names the arc-label column. The separator decides how the two relate:
//! `+` combines them into one decision, `,` predicts them one after the other
//! and `#` (or `;`) predicts the label only for transitions that carry one.

use crate::config::constants::decision::{LABEL_PREFIX, TRANSITION_TABLE};
use crate::config::{ConfigError, ConfigResult};
use crate::corpus::OUTPUT_COLUMNS;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationToNextDecision {
    None,
    Sequential,
    Branched,
}

impl RelationToNextDecision {
    fn separator(&self) -> &'static str {
        match self {
            RelationToNextDecision::None => "+",
            RelationToNextDecision::Sequential => ",",
            RelationToNextDecision::Branched => "#",
        }
    }

    fn from_separator(c: char) -> Option<Self> {
        match c {
            '+' => Some(RelationToNextDecision::None),
            ',' => Some(RelationToNextDecision::Sequential),
            '#' | ';' => Some(RelationToNextDecision::Branched),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionSettings {
    /// Column that supplies arc labels, `None` for unlabeled parsing
    label_column: Option<String>,
    relation: RelationToNextDecision,
}

impl DecisionSettings {
    pub fn parse(settings: &str) -> ConfigResult<Self> {
        let settings = settings.trim();
        let separators: Vec<char> = settings
            .chars()
            .filter(|&c| RelationToNextDecision::from_separator(c).is_some())
            .collect();

        let (transition_part, label_part, relation) = match separators.as_slice() {
            [] => (settings, None, RelationToNextDecision::None),
            [sep] => {
                let relation = RelationToNextDecision::from_separator(*sep)
                    .ok_or_else(|| ConfigError::invalid_decision_settings(settings, "unknown separator"))?;
                let (first, second) = settings
                    .split_once(*sep)
                    .ok_or_else(|| ConfigError::invalid_decision_settings(settings, "unknown separator"))?;
                (first.trim(), Some(second.trim()), relation)
            }
            _ => {
                return Err(ConfigError::invalid_decision_settings(
                    settings,
                    "at most two decisions are supported",
                ))
            }
        };

        if transition_part != TRANSITION_TABLE {
            return Err(ConfigError::invalid_decision_settings(
                settings,
                &format!("first decision must be {}", TRANSITION_TABLE),
            ));
        }

        let label_column = match label_part {
            None => None,
            Some(part) => match part.strip_prefix(LABEL_PREFIX) {
                Some(column) if OUTPUT_COLUMNS.contains(&column) => Some(column.to_string()),
                _ => {
                    return Err(ConfigError::invalid_decision_settings(
                        settings,
                        &format!("second decision must be an arc label table ({}COLUMN)", LABEL_PREFIX),
                    ))
                }
            },
        };

        Ok(Self {
            label_column,
            relation,
        })
    }

    pub fn relation(&self) -> RelationToNextDecision {
        self.relation
    }

    pub fn label_column(&self) -> Option<&str> {
        self.label_column.as_deref()
    }

    pub fn is_labeled(&self) -> bool {
        self.label_column.is_some()
    }

    /// Name of the symbol table holding combined `TRANS~LABEL` symbols
    pub fn combined_table(&self) -> Option<String> {
        match (&self.label_column, self.relation) {
            (Some(_), RelationToNextDecision::None) => Some(self.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for DecisionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label_column {
            None => write!(f, "{}", TRANSITION_TABLE),
            Some(column) => write!(
                f,
                "{}{}{}{}",
                TRANSITION_TABLE,
                self.relation.separator(),
                LABEL_PREFIX,
                column
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_relations() {
        let combined = DecisionSettings::parse("T.TRANS+A.DEPREL").unwrap();
        assert_eq!(combined.relation(), RelationToNextDecision::None);
        assert_eq!(combined.label_column(), Some("DEPREL"));
        assert_eq!(combined.combined_table().as_deref(), Some("T.TRANS+A.DEPREL"));

        let seq = DecisionSettings::parse("T.TRANS,A.DEPREL").unwrap();
        assert_eq!(seq.relation(), RelationToNextDecision::Sequential);
        assert_eq!(seq.combined_table(), None);

        let branched = DecisionSettings::parse("T.TRANS;A.DEPREL").unwrap();
        assert_eq!(branched.relation(), RelationToNextDecision::Branched);
        assert_eq!(branched.to_string(), "T.TRANS#A.DEPREL");

        let unlabeled = DecisionSettings::parse("T.TRANS").unwrap();
        assert!(!unlabeled.is_labeled());
        assert_eq!(unlabeled.combined_table(), None);
    }

    #[test]
    fn test_malformed_settings() {
        for bad in ["", "A.DEPREL", "T.TRANS+DEPREL", "T.TRANS+A.", "T.TRANS+A.POSTAG", "T.TRANS+A.DEPREL,A.X"] {
            assert_matches!(
                DecisionSettings::parse(bad),
                Err(ConfigError::InvalidDecisionSettings { .. }),
                "{}",
                bad
            );
        }
    }
}
