//! Tabular corpus handling for training and parsing

pub mod error;
pub mod format;
pub mod io;

pub use error::{CorpusError, CorpusResult};
pub use format::{
    column_index, Sentence, COLUMNS, DEPREL_COLUMN, EMPTY_VALUE, HEAD_COLUMN, INPUT_COLUMNS,
    OUTPUT_COLUMNS,
};
pub use io::{read_file, read_sentences, write_file, write_sentences};

/// Copy of `sentence` with HEAD and DEPREL blanked out
pub fn strip_gold(sentence: &Sentence) -> Sentence {
    let mut stripped = sentence.clone();
    for token in 1..=stripped.len() {
        stripped.set_value(token, HEAD_COLUMN, EMPTY_VALUE);
        stripped.set_value(token, DEPREL_COLUMN, EMPTY_VALUE);
    }
    stripped
}

/// Tokens whose rows differ between two sentences; `None` when lengths differ
pub fn diff_sentences(gold: &Sentence, parsed: &Sentence) -> Option<Vec<usize>> {
    if gold.len() != parsed.len() {
        return None;
    }
    Some(
        gold.lines()
            .zip(parsed.lines())
            .enumerate()
            .filter(|(_, (g, p))| g != p)
            .map(|(i, _)| i + 1)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence() -> Sentence {
        let row = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Sentence::from_rows(vec![
            row(&["1", "John", "_", "N", "NNP", "_", "2", "SBJ"]),
            row(&["2", "sleeps", "_", "V", "VBZ", "_", "0", "ROOT"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_strip_gold() {
        let stripped = strip_gold(&sentence());
        assert_eq!(stripped.head(1), None);
        assert_eq!(stripped.deprel(2), None);
        assert_eq!(stripped.value(2, 1), Some("sleeps"));
        assert!(!stripped.has_gold());
    }

    #[test]
    fn test_diff_sentences() {
        let gold = sentence();
        let mut parsed = gold.clone();
        assert_eq!(diff_sentences(&gold, &parsed), Some(vec![]));

        parsed.set_value(1, DEPREL_COLUMN, "OBJ");
        assert_eq!(diff_sentences(&gold, &parsed), Some(vec![1]));

        assert_eq!(diff_sentences(&gold, &Sentence::new()), None);
    }
}
