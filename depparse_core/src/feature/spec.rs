//! Feature specification syntax
//!
//! ```text
//! term  := NAME
//!        | NAME '[' INDEX ']'
//!        | NAME '(' term (',' term)* ')'
//! ```
//!
//! `InputColumn(POSTAG, head(Stack[0]))` is a call with a bare word and a
//! nested call wrapping an indexed address.

use super::error::{FeatureError, FeatureResult};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecTerm {
    Word(String),
    Indexed { name: String, index: usize },
    Call { name: String, args: Vec<SpecTerm> },
}

impl SpecTerm {
    pub fn parse(spec: &str) -> FeatureResult<Self> {
        let mut parser = SpecParser {
            spec,
            chars: spec.char_indices().peekable(),
        };
        let term = parser.term()?;
        parser.skip_whitespace();
        if let Some((at, c)) = parser.chars.next() {
            return Err(FeatureError::malformed(
                spec,
                format!("unexpected '{}' at offset {}", c, at),
            ));
        }
        Ok(term)
    }

    pub fn name(&self) -> &str {
        match self {
            SpecTerm::Word(name) => name,
            SpecTerm::Indexed { name, .. } | SpecTerm::Call { name, .. } => name,
        }
    }
}

impl fmt::Display for SpecTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecTerm::Word(name) => write!(f, "{}", name),
            SpecTerm::Indexed { name, index } => write!(f, "{}[{}]", name, index),
            SpecTerm::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

struct SpecParser<'a> {
    spec: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl SpecParser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn expect(&mut self, expected: char) -> FeatureResult<()> {
        self.skip_whitespace();
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((at, c)) => Err(FeatureError::malformed(
                self.spec,
                format!("expected '{}' but found '{}' at offset {}", expected, c, at),
            )),
            None => Err(FeatureError::malformed(
                self.spec,
                format!("expected '{}' at end of input", expected),
            )),
        }
    }

    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|(_, c)| c.is_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        {
            word.push(c);
        }
        word
    }

    fn term(&mut self) -> FeatureResult<SpecTerm> {
        self.skip_whitespace();
        let name = self.word();
        if name.is_empty() {
            return Err(FeatureError::malformed(self.spec, "expected a name"));
        }
        self.skip_whitespace();

        match self.chars.peek().map(|&(_, c)| c) {
            Some('[') => {
                self.chars.next();
                self.skip_whitespace();
                let digits = self.word();
                let index = digits.parse().map_err(|_| {
                    FeatureError::malformed(self.spec, format!("'{}' is not an index", digits))
                })?;
                self.expect(']')?;
                Ok(SpecTerm::Indexed { name, index })
            }
            Some('(') => {
                self.chars.next();
                let mut args = vec![self.term()?];
                loop {
                    self.skip_whitespace();
                    match self.chars.next() {
                        Some((_, ',')) => args.push(self.term()?),
                        Some((_, ')')) => break,
                        Some((at, c)) => {
                            return Err(FeatureError::malformed(
                                self.spec,
                                format!("unexpected '{}' at offset {}", c, at),
                            ))
                        }
                        None => return Err(FeatureError::malformed(self.spec, "unclosed '('")),
                    }
                }
                Ok(SpecTerm::Call { name, args })
            }
            _ => Ok(SpecTerm::Word(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_nested_call() {
        let term = SpecTerm::parse("InputColumn(POSTAG, head(Stack[0]))").unwrap();
        assert_eq!(
            term,
            SpecTerm::Call {
                name: "InputColumn".to_string(),
                args: vec![
                    SpecTerm::Word("POSTAG".to_string()),
                    SpecTerm::Call {
                        name: "head".to_string(),
                        args: vec![SpecTerm::Indexed {
                            name: "Stack".to_string(),
                            index: 0
                        }],
                    },
                ],
            }
        );
        assert_eq!(term.to_string(), "InputColumn(POSTAG, head(Stack[0]))");
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(
            SpecTerm::parse(" Exists ( Input [ 2 ] ) ").unwrap().to_string(),
            "Exists(Input[2])"
        );
    }

    #[test]
    fn test_malformed() {
        for bad in ["", "InputColumn(FORM", "Stack[x]", "Exists(Input[0]))", "(FORM)", "Stack[0"] {
            assert_matches!(SpecTerm::parse(bad), Err(FeatureError::MalformedSpec { .. }), "{}", bad);
        }
    }
}
