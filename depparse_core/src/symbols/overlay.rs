//! Parse-time extension of a frozen symbol table
//!
//! An overlay never touches its parent. Lookups go to the parent first; on a
//! miss a new code is allocated from the first value the parent never issued
//! and kept in the overlay's own maps until [`OverlaySymbolTable::clear_tmp_storage`].

use super::error::SymbolResult;
use super::table::SymbolTable;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct OverlaySymbolTable {
    symbol_codes: HashMap<String, i32>,
    code_symbols: HashMap<i32, String>,
    real_values: HashMap<String, f64>,
    overlay_counter: i32,
}

impl OverlaySymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, parent: &SymbolTable, symbol: &str) -> SymbolResult<i32> {
        if let Some(code) = parent.symbol_to_code(symbol) {
            return Ok(code);
        }
        if let Some(&code) = self.symbol_codes.get(symbol) {
            return Ok(code);
        }
        let real = parent.check_symbol(symbol)?;

        let code = parent.value_counter() + self.overlay_counter;
        self.overlay_counter += 1;
        self.symbol_codes.insert(symbol.to_string(), code);
        self.code_symbols.insert(code, symbol.to_string());
        if let Some(value) = real {
            self.real_values.insert(symbol.to_string(), value);
        }
        Ok(code)
    }

    pub fn symbol_to_code(&self, parent: &SymbolTable, symbol: &str) -> Option<i32> {
        parent
            .symbol_to_code(symbol)
            .or_else(|| self.symbol_codes.get(symbol).copied())
    }

    pub fn code_to_symbol<'a>(&'a self, parent: &'a SymbolTable, code: i32) -> Option<&'a str> {
        parent
            .code_to_symbol(code)
            .or_else(|| self.code_symbols.get(&code).map(String::as_str))
    }

    pub fn real_value(&self, parent: &SymbolTable, symbol: &str) -> Option<f64> {
        parent
            .real_value(symbol)
            .or_else(|| self.real_values.get(symbol).copied())
    }

    /// Size of the frozen vocabulary; overlay entries are not counted
    pub fn size(&self, parent: &SymbolTable) -> usize {
        parent.size()
    }

    pub fn overlay_size(&self) -> usize {
        self.symbol_codes.len()
    }

    pub fn clear_tmp_storage(&mut self) {
        self.symbol_codes.clear();
        self.code_symbols.clear();
        self.real_values.clear();
        self.overlay_counter = 0;
    }
}
