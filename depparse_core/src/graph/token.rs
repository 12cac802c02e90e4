//! Tokens and the per-worker token pool

use std::collections::BTreeMap;

/// One node of a sentence; index 0 is the artificial root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub index: usize,
    /// Column name to symbol code
    pub columns: BTreeMap<String, i32>,
}

impl Token {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            columns: BTreeMap::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.index == 0
    }

    pub fn column(&self, name: &str) -> Option<i32> {
        self.columns.get(name).copied()
    }

    pub fn set_column(&mut self, name: &str, code: i32) {
        self.columns.insert(name.to_string(), code);
    }

    fn reset(&mut self, index: usize) {
        self.index = index;
        self.columns.clear();
    }
}

/// Free list of cleared tokens reused from sentence to sentence
#[derive(Debug, Default)]
pub struct TokenPool {
    free: Vec<Token>,
    allocated: usize,
}

impl TokenPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self, index: usize) -> Token {
        match self.free.pop() {
            Some(mut token) => {
                token.reset(index);
                token
            }
            None => {
                self.allocated += 1;
                Token::new(index)
            }
        }
    }

    pub fn give_back(&mut self, mut token: Token) {
        token.reset(0);
        self.free.push(token);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Tokens created because the free list was empty
    pub fn allocated(&self) -> usize {
        self.allocated
    }
}
