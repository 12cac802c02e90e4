//! Symbol table errors

use crate::logging::{codes, Code};

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SymbolError {
    #[error("Symbol table '{table}' does not exist")]
    UnknownTable { table: String },

    #[error("Code {code} is not defined in symbol table '{table}'")]
    UnknownCode { table: String, code: i32 },

    #[error("Symbol '{symbol}' is not defined in symbol table '{table}'")]
    UnknownSymbol { table: String, symbol: String },

    #[error("Empty symbol cannot be added to table '{table}'")]
    EmptySymbol { table: String },

    #[error("'{symbol}' is not a valid {value_type} value for table '{table}'")]
    InvalidValue {
        table: String,
        symbol: String,
        value_type: String,
    },

    #[error("Symbol table I/O failed: {error}")]
    Io { error: String },

    #[error("Malformed symbol table data at line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },
}

impl SymbolError {
    pub fn unknown_table(table: &str) -> Self {
        Self::UnknownTable {
            table: table.to_string(),
        }
    }

    pub fn unknown_code(table: &str, code: i32) -> Self {
        Self::UnknownCode {
            table: table.to_string(),
            code,
        }
    }

    pub fn unknown_symbol(table: &str, symbol: &str) -> Self {
        Self::UnknownSymbol {
            table: table.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn empty_symbol(table: &str) -> Self {
        Self::EmptySymbol {
            table: table.to_string(),
        }
    }

    pub fn invalid_value(table: &str, symbol: &str, value_type: &str) -> Self {
        Self::InvalidValue {
            table: table.to_string(),
            symbol: symbol.to_string(),
            value_type: value_type.to_string(),
        }
    }

    pub fn malformed(line: usize, reason: &str) -> Self {
        Self::MalformedTable {
            line,
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownTable { .. } => codes::symbols::UNKNOWN_TABLE,
            Self::UnknownCode { .. } => codes::symbols::UNKNOWN_CODE,
            Self::UnknownSymbol { .. } => codes::symbols::UNKNOWN_SYMBOL,
            Self::EmptySymbol { .. } => codes::symbols::EMPTY_SYMBOL,
            Self::InvalidValue { .. } => codes::symbols::INVALID_VALUE,
            Self::Io { .. } => codes::symbols::SYMBOL_IO,
            Self::MalformedTable { .. } => codes::symbols::MALFORMED_TABLE,
        }
    }

    /// A bad value in one sentence is recoverable; a broken vocabulary is not
    pub fn requires_halt(&self) -> bool {
        !matches!(self, Self::EmptySymbol { .. } | Self::InvalidValue { .. })
    }
}

impl From<std::io::Error> for SymbolError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            error: e.to_string(),
        }
    }
}
