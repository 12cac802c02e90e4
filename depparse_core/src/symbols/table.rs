//! The writable symbol table used during training

use super::error::{SymbolError, SymbolResult};
use super::null_values::{NullValueId, NullValues, NullValueStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// Whether a column is read from the input or predicted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableCategory {
    Input = 1,
    Output = 3,
}

impl TableCategory {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(TableCategory::Input),
            3 => Some(TableCategory::Output),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String = 1,
    Integer = 2,
    Boolean = 3,
    Real = 4,
}

impl ValueType {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ValueType::String),
            2 => Some(ValueType::Integer),
            3 => Some(ValueType::Boolean),
            4 => Some(ValueType::Real),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Real => "real",
        }
    }
}

/// String to code registry for one column
///
/// Codes are handed out from a counter that starts above the reserved null
/// codes and never reuses a value, so a code stays bound to its string for
/// the life of the table.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    name: String,
    category: TableCategory,
    value_type: ValueType,
    null_values: NullValues,
    symbol_codes: HashMap<String, i32>,
    code_symbols: HashMap<i32, String>,
    real_values: HashMap<String, f64>,
    value_counter: i32,
}

impl SymbolTable {
    pub fn new(
        name: &str,
        category: TableCategory,
        value_type: ValueType,
        strategy: NullValueStrategy,
    ) -> Self {
        let null_values = NullValues::new(strategy);
        Self {
            name: name.to_string(),
            category,
            value_type,
            null_values,
            symbol_codes: HashMap::new(),
            code_symbols: HashMap::new(),
            real_values: HashMap::new(),
            value_counter: null_values.next_code(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> TableCategory {
        self.category
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn null_values(&self) -> &NullValues {
        &self.null_values
    }

    pub fn null_code(&self, id: NullValueId) -> i32 {
        self.null_values.code(id)
    }

    pub fn is_null_code(&self, code: i32) -> bool {
        self.null_values.is_null_code(code)
    }

    /// Number of ordinary symbols
    pub fn size(&self) -> usize {
        self.symbol_codes.len()
    }

    /// Next code the table would allocate
    pub fn value_counter(&self) -> i32 {
        self.value_counter
    }

    /// Reject values this table cannot hold; returns the parsed real value if any
    pub(crate) fn check_symbol(&self, symbol: &str) -> SymbolResult<Option<f64>> {
        if symbol.is_empty() {
            return Err(SymbolError::empty_symbol(&self.name));
        }
        match self.value_type {
            ValueType::Real => symbol
                .parse::<f64>()
                .map(Some)
                .map_err(|_| SymbolError::invalid_value(&self.name, symbol, "real")),
            ValueType::Integer => symbol
                .parse::<i64>()
                .map(|_| None)
                .map_err(|_| SymbolError::invalid_value(&self.name, symbol, "integer")),
            ValueType::Boolean => match symbol {
                "true" | "false" | "yes" | "no" | "1" | "0" => Ok(None),
                _ => Err(SymbolError::invalid_value(&self.name, symbol, "boolean")),
            },
            ValueType::String => Ok(None),
        }
    }

    pub fn add_symbol(&mut self, symbol: &str) -> SymbolResult<i32> {
        if let Some(code) = self.null_values.symbol_to_code(symbol) {
            return Ok(code);
        }
        if let Some(&code) = self.symbol_codes.get(symbol) {
            return Ok(code);
        }
        let real = self.check_symbol(symbol)?;

        let code = self.value_counter;
        self.value_counter += 1;
        self.insert(symbol, code, real);
        Ok(code)
    }

    fn insert(&mut self, symbol: &str, code: i32, real: Option<f64>) {
        self.symbol_codes.insert(symbol.to_string(), code);
        self.code_symbols.insert(code, symbol.to_string());
        if let Some(value) = real {
            self.real_values.insert(symbol.to_string(), value);
        }
    }

    pub fn symbol_to_code(&self, symbol: &str) -> Option<i32> {
        self.null_values
            .symbol_to_code(symbol)
            .or_else(|| self.symbol_codes.get(symbol).copied())
    }

    pub fn code_to_symbol(&self, code: i32) -> Option<&str> {
        self.null_values
            .code_to_symbol(code)
            .or_else(|| self.code_symbols.get(&code).map(String::as_str))
    }

    pub fn real_value(&self, symbol: &str) -> Option<f64> {
        self.real_values.get(symbol).copied()
    }

    /// Ordinary entries in code order
    pub fn entries(&self) -> Vec<(i32, &str)> {
        let mut entries: Vec<(i32, &str)> = self
            .code_symbols
            .iter()
            .map(|(code, symbol)| (*code, symbol.as_str()))
            .collect();
        entries.sort_by_key(|(code, _)| *code);
        entries
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Name line, one `code\tsymbol` line per entry, blank line
    pub fn save<W: Write>(&self, writer: &mut W) -> SymbolResult<()> {
        writeln!(writer, "{}", self.name)?;
        for (code, symbol) in self.entries() {
            writeln!(writer, "{}\t{}", code, symbol)?;
        }
        writeln!(writer)?;
        Ok(())
    }

    /// Read entry lines up to the next blank line or end of input
    ///
    /// `line_no` tracks the position in the enclosing file for error messages.
    pub fn load_entries<R: BufRead>(
        &mut self,
        lines: &mut std::io::Lines<R>,
        line_no: &mut usize,
    ) -> SymbolResult<()> {
        for line in lines.by_ref() {
            let line = line?;
            *line_no += 1;
            if line.is_empty() {
                break;
            }
            let (code, symbol) = line
                .split_once('\t')
                .ok_or_else(|| SymbolError::malformed(*line_no, "expected code<TAB>symbol"))?;
            let code: i32 = code
                .trim()
                .parse()
                .map_err(|_| SymbolError::malformed(*line_no, "code is not an integer"))?;
            if self.null_values.is_null_code(code) {
                return Err(SymbolError::malformed(*line_no, "code is reserved for null values"));
            }
            match self.code_symbols.get(&code) {
                Some(existing) if existing != symbol => {
                    return Err(SymbolError::malformed(*line_no, "code bound to two symbols"));
                }
                Some(_) => continue,
                None => {}
            }

            let real = self.check_symbol(symbol)?;
            self.insert(symbol, code, real);
            self.value_counter = self.value_counter.max(code + 1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::BufRead;

    fn deprel_table() -> SymbolTable {
        SymbolTable::new(
            "DEPREL",
            TableCategory::Output,
            ValueType::String,
            NullValueStrategy::One,
        )
    }

    #[test]
    fn test_codes_start_above_null_values() {
        let mut table = deprel_table();
        assert_eq!(table.add_symbol("SBJ").unwrap(), 1);
        assert_eq!(table.add_symbol("OBJ").unwrap(), 2);
        assert_eq!(table.add_symbol("SBJ").unwrap(), 1);
        assert_eq!(table.size(), 2);
        assert_eq!(table.value_counter(), 3);
        assert_eq!(table.code_to_symbol(2), Some("OBJ"));
    }

    #[test]
    fn test_null_symbols_map_to_reserved_codes() {
        let mut table = SymbolTable::new(
            "POSTAG",
            TableCategory::Input,
            ValueType::String,
            NullValueStrategy::NoValue,
        );
        assert_eq!(table.add_symbol("#rootnode#").unwrap(), 1);
        assert_eq!(table.add_symbol("NN").unwrap(), 3);
        assert_eq!(table.code_to_symbol(0), Some("#null#"));
        assert_eq!(table.size(), 1);
    }

    #[test]
    fn test_empty_and_invalid_values() {
        let mut table = deprel_table();
        assert_matches!(table.add_symbol(""), Err(SymbolError::EmptySymbol { .. }));

        let mut real = SymbolTable::new(
            "WEIGHT",
            TableCategory::Input,
            ValueType::Real,
            NullValueStrategy::One,
        );
        assert_eq!(real.add_symbol("0.25").unwrap(), 1);
        assert_eq!(real.real_value("0.25"), Some(0.25));
        assert_matches!(real.add_symbol("abc"), Err(SymbolError::InvalidValue { .. }));
        assert_eq!(real.value_counter(), 2);
    }

    #[test]
    fn test_save_then_load_reproduces_codes() {
        let mut table = deprel_table();
        for label in ["SBJ", "OBJ", "NMOD", "P"] {
            table.add_symbol(label).unwrap();
        }
        let mut buffer = Vec::new();
        table.save(&mut buffer).unwrap();

        let mut lines = std::io::Cursor::new(buffer).lines();
        assert_eq!(lines.next().unwrap().unwrap(), "DEPREL");
        let mut reloaded = deprel_table();
        let mut line_no = 1;
        reloaded.load_entries(&mut lines, &mut line_no).unwrap();

        assert_eq!(reloaded.entries(), table.entries());
        assert_eq!(reloaded.value_counter(), table.value_counter());
        assert_eq!(reloaded.add_symbol("ADV").unwrap(), 5);
    }

    #[test]
    fn test_load_is_order_independent() {
        let data = "3\tP\n1\tSBJ\n2\tOBJ\n\n";
        let mut table = deprel_table();
        let mut line_no = 0;
        table
            .load_entries(&mut std::io::Cursor::new(data).lines(), &mut line_no)
            .unwrap();
        assert_eq!(table.symbol_to_code("P"), Some(3));
        assert_eq!(table.value_counter(), 4);
    }

    #[test]
    fn test_load_rejects_conflicting_codes() {
        let data = "1\tSBJ\n1\tOBJ\n\n";
        let mut table = deprel_table();
        let mut line_no = 0;
        assert_matches!(
            table.load_entries(&mut std::io::Cursor::new(data).lines(), &mut line_no),
            Err(SymbolError::MalformedTable { line: 2, .. })
        );
    }
}
