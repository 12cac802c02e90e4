//! Reserved null codes at the bottom of every symbol table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NULL_SYMBOL: &str = "#null#";
pub const ROOT_NODE_SYMBOL: &str = "#rootnode#";
pub const NO_VALUE_SYMBOL: &str = "#novalue#";

/// Which kind of missing value a feature ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullValueId {
    /// The addressed node does not exist
    NoNode,
    /// The addressed node is the artificial root
    RootNode,
    /// The node exists but the column has no value yet
    NoValue,
}

/// How many distinct null codes a table reserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NullValueStrategy {
    #[default]
    One,
    RootNode,
    NoValue,
}

impl NullValueStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NullValueStrategy::One => "one",
            NullValueStrategy::RootNode => "rootnode",
            NullValueStrategy::NoValue => "novalue",
        }
    }
}

impl FromStr for NullValueStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one" => Ok(NullValueStrategy::One),
            "rootnode" => Ok(NullValueStrategy::RootNode),
            "novalue" => Ok(NullValueStrategy::NoValue),
            other => Err(format!("unknown null value strategy '{}'", other)),
        }
    }
}

impl fmt::Display for NullValueStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Null symbols and codes resolved for one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullValues {
    strategy: NullValueStrategy,
}

impl NullValues {
    pub fn new(strategy: NullValueStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> NullValueStrategy {
        self.strategy
    }

    pub fn code(&self, id: NullValueId) -> i32 {
        match (self.strategy, id) {
            (_, NullValueId::NoNode) => 0,
            (NullValueStrategy::One, _) => 0,
            (_, NullValueId::RootNode) => 1,
            (NullValueStrategy::RootNode, NullValueId::NoValue) => 0,
            (NullValueStrategy::NoValue, NullValueId::NoValue) => 2,
        }
    }

    pub fn symbol(&self, id: NullValueId) -> &'static str {
        match self.code(id) {
            0 => NULL_SYMBOL,
            1 => ROOT_NODE_SYMBOL,
            _ => NO_VALUE_SYMBOL,
        }
    }

    /// First code available for ordinary symbols
    pub fn next_code(&self) -> i32 {
        match self.strategy {
            NullValueStrategy::One => 1,
            NullValueStrategy::RootNode => 2,
            NullValueStrategy::NoValue => 3,
        }
    }

    pub fn is_null_code(&self, code: i32) -> bool {
        (0..self.next_code()).contains(&code)
    }

    pub fn symbol_to_code(&self, symbol: &str) -> Option<i32> {
        let code = match symbol {
            NULL_SYMBOL => 0,
            ROOT_NODE_SYMBOL => 1,
            NO_VALUE_SYMBOL => 2,
            _ => return None,
        };
        self.is_null_code(code).then_some(code)
    }

    pub fn code_to_symbol(&self, code: i32) -> Option<&'static str> {
        if !self.is_null_code(code) {
            return None;
        }
        Some(match code {
            0 => NULL_SYMBOL,
            1 => ROOT_NODE_SYMBOL,
            _ => NO_VALUE_SYMBOL,
        })
    }
}
