//! Attachment scores of parsed sentences against gold sentences

use crate::corpus::{CorpusError, CorpusResult, Sentence};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttachmentCounts {
    pub tokens: usize,
    pub correct_head: usize,
    pub correct_label: usize,
    pub correct_both: usize,
}

impl AttachmentCounts {
    fn add_token(&mut self, head_ok: bool, label_ok: bool) {
        self.tokens += 1;
        self.correct_head += usize::from(head_ok);
        self.correct_label += usize::from(label_ok);
        self.correct_both += usize::from(head_ok && label_ok);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttachmentScores {
    pub las: f64,
    pub uas: f64,
    pub label_accuracy: f64,
    pub sentences: usize,
    pub counts: AttachmentCounts,
}

impl AttachmentScores {
    /// Score `parsed` against `gold` on the HEAD and DEPREL columns
    pub fn compute(gold: &[Sentence], parsed: &[Sentence]) -> CorpusResult<Self> {
        if gold.len() != parsed.len() {
            return Err(CorpusError::Mismatch {
                sentence: gold.len().min(parsed.len()) + 1,
                reason: format!(
                    "gold has {} sentences, parsed has {}",
                    gold.len(),
                    parsed.len()
                ),
            });
        }

        let mut counts = AttachmentCounts::default();
        for (index, (g, p)) in gold.iter().zip(parsed).enumerate() {
            if g.len() != p.len() {
                return Err(CorpusError::Mismatch {
                    sentence: index + 1,
                    reason: format!("gold has {} tokens, parsed has {}", g.len(), p.len()),
                });
            }
            for token in 1..=g.len() {
                let head_ok = g.head(token).is_some() && g.head(token) == p.head(token);
                let label_ok = g.deprel(token).is_some() && g.deprel(token) == p.deprel(token);
                counts.add_token(head_ok, label_ok);
            }
        }

        let ratio = |n: usize| {
            if counts.tokens == 0 {
                0.0
            } else {
                n as f64 / counts.tokens as f64
            }
        };
        Ok(Self {
            las: ratio(counts.correct_both),
            uas: ratio(counts.correct_head),
            label_accuracy: ratio(counts.correct_label),
            sentences: gold.len(),
            counts,
        })
    }
}

impl fmt::Display for AttachmentScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sentences: {}  Tokens: {}", self.sentences, self.counts.tokens)?;
        writeln!(f, "LAS: {:.4}", self.las)?;
        writeln!(f, "UAS: {:.4}", self.uas)?;
        write!(f, "LA:  {:.4}", self.label_accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{DEPREL_COLUMN, HEAD_COLUMN};
    use assert_matches::assert_matches;

    fn gold() -> Sentence {
        let row = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Sentence::from_rows(vec![
            row(&["1", "John", "_", "N", "NNP", "_", "2", "SBJ"]),
            row(&["2", "saw", "_", "V", "VBD", "_", "0", "ROOT"]),
            row(&["3", "Mary", "_", "N", "NNP", "_", "2", "OBJ"]),
            row(&["4", ".", "_", "P", ".", "_", "2", "P"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_perfect_parse() {
        let scores = AttachmentScores::compute(&[gold()], &[gold()]).unwrap();
        assert_eq!(scores.las, 1.0);
        assert_eq!(scores.uas, 1.0);
        assert_eq!(scores.counts.tokens, 4);
    }

    #[test]
    fn test_partial_credit() {
        let mut parsed = gold();
        parsed.set_value(1, DEPREL_COLUMN, "OBJ");
        parsed.set_value(3, HEAD_COLUMN, "1");

        let scores = AttachmentScores::compute(&[gold()], &[parsed]).unwrap();
        assert_eq!(scores.counts.correct_head, 3);
        assert_eq!(scores.counts.correct_label, 3);
        assert_eq!(scores.counts.correct_both, 2);
        assert_eq!(scores.las, 0.5);
        assert_eq!(scores.uas, 0.75);
        assert!(scores.to_string().contains("LAS: 0.5000"));
    }

    #[test]
    fn test_mismatched_corpora() {
        assert_matches!(
            AttachmentScores::compute(&[gold(), gold()], &[gold()]),
            Err(CorpusError::Mismatch { .. })
        );
        let short = Sentence::from_rows(vec![vec!["1".into(), "John".into()]]).unwrap();
        assert_matches!(
            AttachmentScores::compute(&[gold()], &[short]),
            Err(CorpusError::Mismatch { sentence: 1, .. })
        );
    }
}
