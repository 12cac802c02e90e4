//! Moving sentences in and out of symbol-coded dependency structures

use super::error::{ParserError, ParserResult};
use crate::config::constants::parsing::MAX_SENTENCE_TOKENS;
use crate::corpus::{
    column_index, CorpusError, Sentence, DEPREL_COLUMN, EMPTY_VALUE, HEAD_COLUMN, INPUT_COLUMNS,
};
use crate::graph::{DependencyStructure, TokenPool};
use crate::symbols::{SymbolResult, SymbolTableHandler, TableCategory, ValueType};

/// Table holding arc labels
pub const LABEL_TABLE: &str = "DEPREL";

/// Declare every input column table and the label table
pub fn declare_tables(symbols: &mut dyn SymbolTableHandler) -> SymbolResult<()> {
    for column in INPUT_COLUMNS {
        symbols.add_symbol_table(column, TableCategory::Input, ValueType::String)?;
    }
    symbols.add_symbol_table(LABEL_TABLE, TableCategory::Output, ValueType::String)
}

pub fn check_length(sentence_id: usize, sentence: &Sentence) -> ParserResult<()> {
    if sentence.len() > MAX_SENTENCE_TOKENS {
        return Err(ParserError::SentenceTooLong {
            sentence: sentence_id,
            tokens: sentence.len(),
            limit: MAX_SENTENCE_TOKENS,
        });
    }
    Ok(())
}

/// Structure with the input columns coded; unseen values are added to `symbols`
pub fn encode_input(
    sentence: &Sentence,
    symbols: &mut dyn SymbolTableHandler,
    pool: &mut TokenPool,
) -> ParserResult<DependencyStructure> {
    let mut structure = DependencyStructure::from_pool(pool, sentence.len());
    let columns: Vec<(&str, usize)> = INPUT_COLUMNS
        .iter()
        .filter_map(|&name| column_index(name).map(|index| (name, index)))
        .collect();

    for token in 1..=sentence.len() {
        for &(name, index) in &columns {
            let value = sentence.value(token, index).unwrap_or(EMPTY_VALUE);
            let code = symbols.add_symbol(name, value)?;
            structure.set_column(token, name, code)?;
        }
    }
    Ok(structure)
}

/// Gold arcs of a training sentence, labels coded in the label table
///
/// The heads must form a tree under the root: no token heads itself, every
/// head is in the sentence and following heads from any token reaches 0.
pub fn encode_gold(
    sentence: &Sentence,
    symbols: &mut dyn SymbolTableHandler,
) -> ParserResult<DependencyStructure> {
    let n = sentence.len();
    let mut heads = vec![0; n + 1];
    for (token, slot) in heads.iter_mut().enumerate().skip(1) {
        let head = sentence.head(token).ok_or_else(|| {
            CorpusError::malformed(token, format!("token {} has no gold head", token))
        })?;
        if head == token {
            return Err(CorpusError::malformed(token, format!("token {} is its own head", token)).into());
        }
        if head > n {
            return Err(CorpusError::malformed(
                token,
                format!("head {} of token {} is outside the sentence", head, token),
            )
            .into());
        }
        *slot = head;
    }
    for token in 1..=n {
        let mut node = heads[token];
        let mut steps = 0;
        while node != 0 {
            steps += 1;
            if steps > n {
                return Err(CorpusError::malformed(
                    token,
                    format!("gold heads above token {} form a cycle", token),
                )
                .into());
            }
            node = heads[node];
        }
    }

    let mut gold = DependencyStructure::new(n);
    for (token, &head) in heads.iter().enumerate().skip(1) {
        let label = sentence.value(token, DEPREL_COLUMN).unwrap_or(EMPTY_VALUE);
        let code = symbols.add_symbol(LABEL_TABLE, label)?;
        gold.add_edge(head, token, Some(code))?;
    }
    Ok(gold)
}

/// Write predicted heads and labels into the HEAD and DEPREL columns
pub fn write_arcs(
    structure: &DependencyStructure,
    symbols: &dyn SymbolTableHandler,
    sentence: &mut Sentence,
) -> ParserResult<()> {
    for token in 1..=sentence.len() {
        let head = structure.head(token).unwrap_or(0);
        let label = match structure.label(token) {
            Some(code) => symbols.require_symbol(LABEL_TABLE, code)?,
            None => EMPTY_VALUE.to_string(),
        };
        sentence.set_value(token, HEAD_COLUMN, &head.to_string());
        sentence.set_value(token, DEPREL_COLUMN, &label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{HashSymbolTableHandler, NullValueStrategy};
    use assert_matches::assert_matches;

    fn sentence() -> Sentence {
        let row = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Sentence::from_rows(vec![
            row(&["1", "John", "john", "N", "NNP", "_", "2", "SBJ"]),
            row(&["2", "sleeps", "sleep", "V", "VBZ", "_", "0", "ROOT"]),
        ])
        .unwrap()
    }

    fn symbols() -> HashSymbolTableHandler {
        let mut symbols = HashSymbolTableHandler::new(NullValueStrategy::One);
        declare_tables(&mut symbols).unwrap();
        symbols
    }

    #[test]
    fn test_input_columns_are_coded() {
        let mut symbols = symbols();
        let mut pool = TokenPool::new();
        let structure = encode_input(&sentence(), &mut symbols, &mut pool).unwrap();

        let vbz = symbols.symbol_to_code("POSTAG", "VBZ").unwrap();
        assert_eq!(structure.column(2, "POSTAG"), vbz);
        assert_eq!(structure.column(1, "FORM"), symbols.symbol_to_code("FORM", "John").unwrap());
        assert_eq!(structure.n_edges(), 0);
    }

    #[test]
    fn test_gold_and_write_back() {
        let mut symbols = symbols();
        let gold = encode_gold(&sentence(), &mut symbols).unwrap();
        assert_eq!(gold.head(1), Some(2));
        assert_eq!(gold.head(2), Some(0));

        let mut parsed = crate::corpus::strip_gold(&sentence());
        write_arcs(&gold, &symbols, &mut parsed).unwrap();
        assert_eq!(parsed, sentence());
    }

    #[test]
    fn test_missing_gold_head() {
        let mut symbols = symbols();
        let stripped = crate::corpus::strip_gold(&sentence());
        assert_matches!(
            encode_gold(&stripped, &mut symbols),
            Err(ParserError::Corpus(CorpusError::MalformedRow { line: 1, .. }))
        );
    }

    fn with_heads(heads: &[&str]) -> Sentence {
        let rows = heads
            .iter()
            .enumerate()
            .map(|(i, head)| {
                let id = (i + 1).to_string();
                [id.as_str(), "w", "_", "X", "X", "_", head, "DEP"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect()
            })
            .collect();
        Sentence::from_rows(rows).unwrap()
    }

    #[test]
    fn test_self_head_is_malformed() {
        let mut symbols = symbols();
        assert_matches!(
            encode_gold(&with_heads(&["0", "2", "1"]), &mut symbols),
            Err(ParserError::Corpus(CorpusError::MalformedRow { line: 2, .. }))
        );
    }

    #[test]
    fn test_cyclic_heads_are_malformed() {
        let mut symbols = symbols();
        // 2 -> 3 -> 2, never reaching the root
        assert_matches!(
            encode_gold(&with_heads(&["0", "3", "2"]), &mut symbols),
            Err(ParserError::Corpus(CorpusError::MalformedRow { line: 2, .. }))
        );
        assert_matches!(
            encode_gold(&with_heads(&["0", "9"]), &mut symbols),
            Err(ParserError::Corpus(CorpusError::MalformedRow { line: 2, .. }))
        );
        assert!(encode_gold(&with_heads(&["2", "0", "2"]), &mut symbols).is_ok());
    }
}
