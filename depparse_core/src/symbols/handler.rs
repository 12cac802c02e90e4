//! Name-addressed access to a set of symbol tables

use super::error::{SymbolError, SymbolResult};
use super::null_values::{NullValueId, NullValueStrategy};
use super::overlay::OverlaySymbolTable;
use super::table::{SymbolTable, TableCategory, ValueType};
use crate::logging::codes;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Operations shared by the training handler and the parse-time overlay
pub trait SymbolTableHandler: Send {
    /// Declare a table; declaring an existing table is a no-op
    fn add_symbol_table(
        &mut self,
        name: &str,
        category: TableCategory,
        value_type: ValueType,
    ) -> SymbolResult<()>;

    fn has_table(&self, name: &str) -> bool;

    fn add_symbol(&mut self, table: &str, symbol: &str) -> SymbolResult<i32>;

    fn symbol_to_code(&self, table: &str, symbol: &str) -> SymbolResult<Option<i32>>;

    fn code_to_symbol(&self, table: &str, code: i32) -> SymbolResult<Option<&str>>;

    fn null_code(&self, table: &str, id: NullValueId) -> SymbolResult<i32>;

    fn table_names(&self) -> Vec<String>;

    /// Code lookup that treats an unknown symbol as an error
    fn require_code(&self, table: &str, symbol: &str) -> SymbolResult<i32> {
        self.symbol_to_code(table, symbol)?
            .ok_or_else(|| SymbolError::unknown_symbol(table, symbol))
    }

    /// Symbol lookup that treats an unknown code as an error
    fn require_symbol(&self, table: &str, code: i32) -> SymbolResult<String> {
        self.code_to_symbol(table, code)?
            .map(str::to_string)
            .ok_or_else(|| SymbolError::unknown_code(table, code))
    }
}

// ============================================================================
// HASH HANDLER
// ============================================================================

/// Owning handler; written during training, frozen afterwards
#[derive(Debug, Clone, Default)]
pub struct HashSymbolTableHandler {
    strategy: NullValueStrategy,
    tables: BTreeMap<String, SymbolTable>,
}

impl HashSymbolTableHandler {
    pub fn new(strategy: NullValueStrategy) -> Self {
        Self {
            strategy,
            tables: BTreeMap::new(),
        }
    }

    pub fn null_value_strategy(&self) -> NullValueStrategy {
        self.strategy
    }

    pub fn table(&self, name: &str) -> Option<&SymbolTable> {
        self.tables.get(name)
    }

    fn table_or_err(&self, name: &str) -> SymbolResult<&SymbolTable> {
        self.tables
            .get(name)
            .ok_or_else(|| SymbolError::unknown_table(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &SymbolTable> {
        self.tables.values()
    }

    /// Header block followed by every table body
    pub fn save<W: Write>(&self, writer: &mut W) -> SymbolResult<()> {
        for table in self.tables.values() {
            writeln!(
                writer,
                "\t{}\t{}\t{}\t{}",
                table.name(),
                table.category().code(),
                table.value_type().code(),
                table.null_values().strategy()
            )?;
        }
        writeln!(writer)?;
        for table in self.tables.values() {
            table.save(writer)?;
        }
        Ok(())
    }

    pub fn load<R: BufRead>(reader: R) -> SymbolResult<Self> {
        let mut handler = Self::default();
        let mut lines = reader.lines();
        let mut line_no = 0;

        // header: one tab-prefixed line per table, ended by a blank line
        for line in lines.by_ref() {
            let line = line?;
            line_no += 1;
            if line.is_empty() {
                break;
            }
            let fields: Vec<&str> = line.trim_start_matches('\t').split('\t').collect();
            let [name, category, value_type, strategy] = fields[..] else {
                return Err(SymbolError::malformed(line_no, "header needs four fields"));
            };
            let category = category
                .parse()
                .ok()
                .and_then(TableCategory::from_code)
                .ok_or_else(|| SymbolError::malformed(line_no, "unknown table category"))?;
            let value_type = value_type
                .parse()
                .ok()
                .and_then(ValueType::from_code)
                .ok_or_else(|| SymbolError::malformed(line_no, "unknown value type"))?;
            let strategy: NullValueStrategy = strategy
                .parse()
                .map_err(|e: String| SymbolError::malformed(line_no, &e))?;

            if handler.tables.is_empty() {
                handler.strategy = strategy;
            }
            handler.tables.insert(
                name.to_string(),
                SymbolTable::new(name, category, value_type, strategy),
            );
        }

        // bodies: a name line, then entries
        while let Some(line) = lines.next() {
            let line = line?;
            line_no += 1;
            if line.is_empty() {
                continue;
            }
            let table = handler
                .tables
                .get_mut(line.as_str())
                .ok_or_else(|| SymbolError::unknown_table(&line))?;
            table.load_entries(&mut lines, &mut line_no)?;
        }
        Ok(handler)
    }

    pub fn save_to_file(&self, path: &Path) -> SymbolResult<()> {
        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.save(&mut writer)?;
        writer.flush()?;

        crate::log_success!(
            codes::success::SYMBOL_TABLES_SAVED,
            "Symbol tables saved",
            "path" => path.display(),
            "tables" => self.tables.len()
        );
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> SymbolResult<Self> {
        let file = std::fs::File::open(path)?;
        let handler = Self::load(BufReader::new(file))?;

        crate::log_success!(
            codes::success::SYMBOL_TABLES_LOADED,
            "Symbol tables loaded",
            "path" => path.display(),
            "tables" => handler.tables.len()
        );
        Ok(handler)
    }
}

impl SymbolTableHandler for HashSymbolTableHandler {
    fn add_symbol_table(
        &mut self,
        name: &str,
        category: TableCategory,
        value_type: ValueType,
    ) -> SymbolResult<()> {
        let strategy = self.strategy;
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| SymbolTable::new(name, category, value_type, strategy));
        Ok(())
    }

    fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    fn add_symbol(&mut self, table: &str, symbol: &str) -> SymbolResult<i32> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| SymbolError::unknown_table(table))?
            .add_symbol(symbol)
    }

    fn symbol_to_code(&self, table: &str, symbol: &str) -> SymbolResult<Option<i32>> {
        Ok(self.table_or_err(table)?.symbol_to_code(symbol))
    }

    fn code_to_symbol(&self, table: &str, code: i32) -> SymbolResult<Option<&str>> {
        Ok(self.table_or_err(table)?.code_to_symbol(code))
    }

    fn null_code(&self, table: &str, id: NullValueId) -> SymbolResult<i32> {
        Ok(self.table_or_err(table)?.null_code(id))
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}

// ============================================================================
// OVERLAY HANDLER
// ============================================================================

/// Per-worker view over a shared, frozen handler
#[derive(Debug, Clone)]
pub struct OverlaySymbolTableHandler {
    parent: Arc<HashSymbolTableHandler>,
    overlays: BTreeMap<String, OverlaySymbolTable>,
    /// Tables declared at parse time that the trained model never had
    local_tables: BTreeMap<String, SymbolTable>,
}

impl OverlaySymbolTableHandler {
    pub fn new(parent: Arc<HashSymbolTableHandler>) -> Self {
        let overlays = parent
            .table_names()
            .into_iter()
            .map(|name| (name, OverlaySymbolTable::new()))
            .collect();
        Self {
            parent,
            overlays,
            local_tables: BTreeMap::new(),
        }
    }

    pub fn parent(&self) -> &HashSymbolTableHandler {
        &self.parent
    }

    /// Drop every symbol added since the last clear
    pub fn clear_tmp_storage(&mut self) {
        for overlay in self.overlays.values_mut() {
            overlay.clear_tmp_storage();
        }
        for table in self.local_tables.values_mut() {
            *table = SymbolTable::new(
                table.name(),
                table.category(),
                table.value_type(),
                table.null_values().strategy(),
            );
        }
    }

    pub fn overlay_size(&self, table: &str) -> usize {
        self.overlays
            .get(table)
            .map(OverlaySymbolTable::overlay_size)
            .or_else(|| self.local_tables.get(table).map(SymbolTable::size))
            .unwrap_or(0)
    }

    pub fn size(&self, table: &str) -> SymbolResult<usize> {
        if let (Some(parent), Some(overlay)) = (self.parent.table(table), self.overlays.get(table)) {
            return Ok(overlay.size(parent));
        }
        self.local_tables
            .get(table)
            .map(SymbolTable::size)
            .ok_or_else(|| SymbolError::unknown_table(table))
    }
}

impl SymbolTableHandler for OverlaySymbolTableHandler {
    fn add_symbol_table(
        &mut self,
        name: &str,
        category: TableCategory,
        value_type: ValueType,
    ) -> SymbolResult<()> {
        if self.parent.has_table(name) {
            self.overlays.entry(name.to_string()).or_default();
            return Ok(());
        }
        let strategy = self.parent.null_value_strategy();
        self.local_tables
            .entry(name.to_string())
            .or_insert_with(|| SymbolTable::new(name, category, value_type, strategy));
        Ok(())
    }

    fn has_table(&self, name: &str) -> bool {
        self.parent.has_table(name) || self.local_tables.contains_key(name)
    }

    fn add_symbol(&mut self, table: &str, symbol: &str) -> SymbolResult<i32> {
        if let Some(parent) = self.parent.table(table) {
            return self
                .overlays
                .entry(table.to_string())
                .or_default()
                .add_symbol(parent, symbol);
        }
        self.local_tables
            .get_mut(table)
            .ok_or_else(|| SymbolError::unknown_table(table))?
            .add_symbol(symbol)
    }

    fn symbol_to_code(&self, table: &str, symbol: &str) -> SymbolResult<Option<i32>> {
        if let Some(parent) = self.parent.table(table) {
            return Ok(match self.overlays.get(table) {
                Some(overlay) => overlay.symbol_to_code(parent, symbol),
                None => parent.symbol_to_code(symbol),
            });
        }
        self.local_tables
            .get(table)
            .map(|t| t.symbol_to_code(symbol))
            .ok_or_else(|| SymbolError::unknown_table(table))
    }

    fn code_to_symbol(&self, table: &str, code: i32) -> SymbolResult<Option<&str>> {
        if let Some(parent) = self.parent.table(table) {
            return Ok(match self.overlays.get(table) {
                Some(overlay) => overlay.code_to_symbol(parent, code),
                None => parent.code_to_symbol(code),
            });
        }
        self.local_tables
            .get(table)
            .map(|t| t.code_to_symbol(code))
            .ok_or_else(|| SymbolError::unknown_table(table))
    }

    fn null_code(&self, table: &str, id: NullValueId) -> SymbolResult<i32> {
        if let Some(parent) = self.parent.table(table) {
            return Ok(parent.null_code(id));
        }
        self.local_tables
            .get(table)
            .map(|t| t.null_code(id))
            .ok_or_else(|| SymbolError::unknown_table(table))
    }

    fn table_names(&self) -> Vec<String> {
        let mut names = self.parent.table_names();
        names.extend(self.local_tables.keys().cloned());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn trained_handler() -> HashSymbolTableHandler {
        let mut handler = HashSymbolTableHandler::new(NullValueStrategy::RootNode);
        handler
            .add_symbol_table("FORM", TableCategory::Input, ValueType::String)
            .unwrap();
        handler
            .add_symbol_table("DEPREL", TableCategory::Output, ValueType::String)
            .unwrap();
        for word in ["John", "saw", "Mary"] {
            handler.add_symbol("FORM", word).unwrap();
        }
        for label in ["SBJ", "OBJ", "ROOT"] {
            handler.add_symbol("DEPREL", label).unwrap();
        }
        handler
    }

    #[test]
    fn test_unknown_table_is_an_error() {
        let mut handler = trained_handler();
        assert_matches!(
            handler.add_symbol("LEMMA", "see"),
            Err(SymbolError::UnknownTable { table }) if table == "LEMMA"
        );
        assert_matches!(handler.require_code("DEPREL", "NMOD"), Err(SymbolError::UnknownSymbol { .. }));
        assert_matches!(handler.require_symbol("DEPREL", 99), Err(SymbolError::UnknownCode { .. }));
    }

    #[test]
    fn test_handler_save_load_reproduces_codes() {
        let handler = trained_handler();
        let mut buffer = Vec::new();
        handler.save(&mut buffer).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("\tDEPREL\t3\t1\trootnode\n"));

        let loaded = HashSymbolTableHandler::load(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(loaded.table_names(), handler.table_names());
        assert_eq!(loaded.null_value_strategy(), NullValueStrategy::RootNode);
        for name in handler.table_names() {
            assert_eq!(
                loaded.table(&name).unwrap().entries(),
                handler.table(&name).unwrap().entries()
            );
        }
        assert_eq!(loaded.symbol_to_code("FORM", "Mary").unwrap(), Some(4));
    }

    #[test]
    fn test_body_for_undeclared_table_rejected() {
        let data = "\tFORM\t1\t1\tone\n\nLEMMA\n1\tsee\n\n";
        assert_matches!(
            HashSymbolTableHandler::load(std::io::Cursor::new(data)),
            Err(SymbolError::UnknownTable { .. })
        );
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symboltables.sym");
        let handler = trained_handler();
        handler.save_to_file(&path).unwrap();
        let loaded = HashSymbolTableHandler::load_from_file(&path).unwrap();
        assert_eq!(loaded.require_code("DEPREL", "OBJ").unwrap(), 3);
    }

    #[test]
    fn test_overlay_handler_extends_without_writing_back() {
        let parent = Arc::new(trained_handler());
        let mut overlay = OverlaySymbolTableHandler::new(parent.clone());

        assert_eq!(overlay.add_symbol("FORM", "saw").unwrap(), 3);
        let unseen = overlay.add_symbol("FORM", "Bill").unwrap();
        assert_eq!(unseen, 5);
        assert_eq!(overlay.code_to_symbol("FORM", unseen).unwrap(), Some("Bill"));
        assert_eq!(parent.symbol_to_code("FORM", "Bill").unwrap(), None);
        assert_eq!(overlay.size("FORM").unwrap(), 3);

        overlay.clear_tmp_storage();
        assert_eq!(overlay.symbol_to_code("FORM", "Bill").unwrap(), None);
        assert_eq!(parent.table("FORM").unwrap().size(), 3);
        assert_eq!(parent.table("FORM").unwrap().value_counter(), 5);
    }

    #[test]
    fn test_overlay_local_tables() {
        let parent = Arc::new(trained_handler());
        let mut overlay = OverlaySymbolTableHandler::new(parent.clone());

        overlay
            .add_symbol_table("FEATS", TableCategory::Input, ValueType::String)
            .unwrap();
        assert_eq!(overlay.add_symbol("FEATS", "sg").unwrap(), 2);
        assert!(overlay.has_table("FEATS"));
        assert!(!parent.has_table("FEATS"));

        overlay.clear_tmp_storage();
        assert_eq!(overlay.symbol_to_code("FEATS", "sg").unwrap(), None);
        assert!(overlay.has_table("FEATS"));
    }

    #[test]
    fn test_handlers_are_object_safe() {
        let parent = Arc::new(trained_handler());
        let mut handlers: Vec<Box<dyn SymbolTableHandler>> = vec![
            Box::new(trained_handler()),
            Box::new(OverlaySymbolTableHandler::new(parent)),
        ];
        for handler in handlers.iter_mut() {
            assert_eq!(handler.null_code("FORM", NullValueId::RootNode).unwrap(), 1);
            assert_eq!(handler.add_symbol("FORM", "#rootnode#").unwrap(), 1);
        }
    }
}
