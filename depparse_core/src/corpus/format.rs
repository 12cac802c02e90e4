//! CoNLL-X sentences: ten tab-separated columns per token

use super::error::{CorpusError, CorpusResult};

pub const COLUMNS: [&str; 10] = [
    "ID", "FORM", "LEMMA", "CPOSTAG", "POSTAG", "FEATS", "HEAD", "DEPREL", "PHEAD", "PDEPREL",
];

/// Columns encoded into input symbol tables
pub const INPUT_COLUMNS: [&str; 5] = ["FORM", "LEMMA", "CPOSTAG", "POSTAG", "FEATS"];

/// Columns the parser writes
pub const OUTPUT_COLUMNS: [&str; 1] = ["DEPREL"];

pub const HEAD_COLUMN: usize = 6;
pub const DEPREL_COLUMN: usize = 7;

/// Placeholder for an absent value
pub const EMPTY_VALUE: &str = "_";

pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|&c| c == name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentence {
    rows: Vec<Vec<String>>,
}

impl Sentence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one token line; short rows are padded with `_`
    pub fn push_line(&mut self, line: &str, line_no: usize) -> CorpusResult<()> {
        let mut row: Vec<String> = line.split('\t').map(|c| c.trim().to_string()).collect();
        if row.len() < 2 || row.len() > COLUMNS.len() {
            return Err(CorpusError::malformed(
                line_no,
                format!("expected 2 to {} columns, found {}", COLUMNS.len(), row.len()),
            ));
        }
        let expected = self.rows.len() + 1;
        if row[0].parse::<usize>().ok() != Some(expected) {
            return Err(CorpusError::malformed(
                line_no,
                format!("token id '{}' should be {}", row[0], expected),
            ));
        }
        row.resize(COLUMNS.len(), EMPTY_VALUE.to_string());
        let head = &row[HEAD_COLUMN];
        if head != EMPTY_VALUE && head.parse::<usize>().is_err() {
            return Err(CorpusError::malformed(line_no, format!("head '{}' is not a token id", head)));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Build from token rows of column values, used by tests and the engine
    pub fn from_rows(rows: Vec<Vec<String>>) -> CorpusResult<Self> {
        let mut sentence = Self::new();
        for (i, row) in rows.into_iter().enumerate() {
            sentence.push_line(&row.join("\t"), i + 1)?;
        }
        Ok(sentence)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` for 1-based token `token`
    pub fn value(&self, token: usize, column: usize) -> Option<&str> {
        self.rows
            .get(token.checked_sub(1)?)
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }

    pub fn set_value(&mut self, token: usize, column: usize, value: &str) {
        if let Some(cell) = token
            .checked_sub(1)
            .and_then(|i| self.rows.get_mut(i))
            .and_then(|row| row.get_mut(column))
        {
            *cell = value.to_string();
        }
    }

    pub fn head(&self, token: usize) -> Option<usize> {
        self.value(token, HEAD_COLUMN)?.parse().ok()
    }

    pub fn deprel(&self, token: usize) -> Option<&str> {
        self.value(token, DEPREL_COLUMN).filter(|&v| v != EMPTY_VALUE)
    }

    pub fn has_gold(&self) -> bool {
        (1..=self.len()).all(|t| self.head(t).is_some())
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.join("\t"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_short_rows_are_padded() {
        let mut sentence = Sentence::new();
        sentence.push_line("1\tJohn\t_\tN\tNNP\t_\t2\tSBJ", 1).unwrap();
        assert_eq!(sentence.value(1, 9), Some("_"));
        assert_eq!(sentence.head(1), Some(2));
        assert_eq!(sentence.deprel(1), Some("SBJ"));
        assert!(sentence.has_gold());
    }

    #[test]
    fn test_bad_rows() {
        let mut sentence = Sentence::new();
        assert_matches!(
            sentence.push_line("2\tJohn", 4),
            Err(CorpusError::MalformedRow { line: 4, .. })
        );
        assert_matches!(
            sentence.push_line("1\tJohn\t_\tN\tNNP\t_\tX\tSBJ", 1),
            Err(CorpusError::MalformedRow { .. })
        );
        assert_matches!(sentence.push_line("1", 1), Err(CorpusError::MalformedRow { .. }));
    }

    #[test]
    fn test_column_lookup() {
        assert_eq!(column_index("POSTAG"), Some(4));
        assert_eq!(column_index("DEPREL"), Some(DEPREL_COLUMN));
        assert_eq!(column_index("XPOS"), None);
    }
}
