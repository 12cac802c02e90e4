//! Feature function registry
//!
//! Function names map to constructor closures. A specification is resolved
//! once, when the feature model is built, into a boxed extractor; extraction
//! itself never looks anything up by name.

use super::error::{FeatureError, FeatureResult};
use super::spec::SpecTerm;
use crate::algorithm::{AddressFunction, ParserConfiguration};
use crate::config::Algorithm;
use crate::corpus::{INPUT_COLUMNS, OUTPUT_COLUMNS};
use crate::graph::DependencyStructure;
use crate::symbols::{NullValueId, SymbolTableHandler};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

// ============================================================================
// ADDRESSES
// ============================================================================

/// Moves from one node of the partial structure to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Head,
    LeftmostDependent,
    RightmostDependent,
    Predecessor,
    Successor,
}

impl Navigation {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "head" => Some(Navigation::Head),
            "ldep" => Some(Navigation::LeftmostDependent),
            "rdep" => Some(Navigation::RightmostDependent),
            "pred" => Some(Navigation::Predecessor),
            "succ" => Some(Navigation::Successor),
            _ => None,
        }
    }

    fn step(&self, structure: &DependencyStructure, node: usize) -> Option<usize> {
        match self {
            Navigation::Head => structure.head(node),
            Navigation::LeftmostDependent => structure.leftmost_dependent(node).filter(|&d| d < node),
            Navigation::RightmostDependent => structure.rightmost_dependent(node).filter(|&d| d > node),
            Navigation::Predecessor => structure.predecessor(node),
            Navigation::Successor => structure.successor(node),
        }
    }
}

/// `head(ldep(Stack[1]))` and friends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    function: AddressFunction,
    index: usize,
    /// Applied innermost first
    path: Vec<Navigation>,
}

impl Address {
    fn from_term(term: &SpecTerm, spec: &str, algorithm: Algorithm) -> FeatureResult<Self> {
        match term {
            SpecTerm::Indexed { name, index } => {
                let function = AddressFunction::from_name(name)
                    .ok_or_else(|| FeatureError::malformed(spec, format!("'{}' is not an address", name)))?;
                if !function.supported_by(algorithm) {
                    return Err(FeatureError::UnsupportedAddress {
                        address: name.clone(),
                        algorithm: algorithm.to_string(),
                    });
                }
                Ok(Self {
                    function,
                    index: *index,
                    path: Vec::new(),
                })
            }
            SpecTerm::Call { name, args } if args.len() == 1 => {
                let step = Navigation::from_name(name)
                    .ok_or_else(|| FeatureError::malformed(spec, format!("'{}' is not a navigation", name)))?;
                let mut inner = Self::from_term(&args[0], spec, algorithm)?;
                inner.path.push(step);
                Ok(inner)
            }
            other => Err(FeatureError::malformed(
                spec,
                format!("'{}' is not an address", other),
            )),
        }
    }

    pub fn resolve(&self, config: &ParserConfiguration) -> Option<usize> {
        let structure = config.structure();
        self.path
            .iter()
            .try_fold(config.address(self.function, self.index)?, |node, step| {
                step.step(structure, node)
            })
    }
}

// ============================================================================
// FEATURE FUNCTIONS
// ============================================================================

type Extractor = dyn Fn(&ParserConfiguration, &dyn SymbolTableHandler) -> FeatureResult<i32> + Send + Sync;

/// A resolved feature: its specification and the extractor built from it
pub struct FeatureFunction {
    spec: String,
    extractor: Box<Extractor>,
}

impl FeatureFunction {
    pub fn spec(&self) -> &str {
        &self.spec
    }

    pub fn extract(&self, config: &ParserConfiguration, symbols: &dyn SymbolTableHandler) -> FeatureResult<i32> {
        (self.extractor)(config, symbols)
    }
}

impl fmt::Debug for FeatureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureFunction").field("spec", &self.spec).finish()
    }
}

type Constructor = fn(&[SpecTerm], &str, Algorithm) -> FeatureResult<Box<Extractor>>;

fn column_arg(args: &[SpecTerm], spec: &str, function: &str, allowed: &[&str]) -> FeatureResult<String> {
    match args.first() {
        Some(SpecTerm::Word(column)) if allowed.contains(&column.as_str()) => Ok(column.clone()),
        Some(SpecTerm::Word(column)) => Err(FeatureError::UnknownColumn {
            column: column.clone(),
            function: function.to_string(),
        }),
        _ => Err(FeatureError::malformed(spec, format!("{} needs a column name first", function))),
    }
}

fn address_arg(args: &[SpecTerm], position: usize, spec: &str, algorithm: Algorithm) -> FeatureResult<Address> {
    let term = args
        .get(position)
        .ok_or_else(|| FeatureError::malformed(spec, "missing address argument"))?;
    Address::from_term(term, spec, algorithm)
}

fn arity(args: &[SpecTerm], expected: usize, spec: &str) -> FeatureResult<()> {
    if args.len() != expected {
        return Err(FeatureError::malformed(
            spec,
            format!("expected {} arguments, found {}", expected, args.len()),
        ));
    }
    Ok(())
}

/// Code of the node's input column, or the table's null code for missing or root nodes
fn input_column(args: &[SpecTerm], spec: &str, algorithm: Algorithm) -> FeatureResult<Box<Extractor>> {
    arity(args, 2, spec)?;
    let column = column_arg(args, spec, "InputColumn", &INPUT_COLUMNS)?;
    let address = address_arg(args, 1, spec, algorithm)?;
    Ok(Box::new(move |config: &ParserConfiguration, symbols: &dyn SymbolTableHandler| -> FeatureResult<i32> {
        let id = match address.resolve(config) {
            None => NullValueId::NoNode,
            Some(0) => NullValueId::RootNode,
            Some(node) => match config.structure().column(node, &column) {
                Some(code) => return Ok(code),
                None => NullValueId::NoValue,
            },
        };
        Ok(symbols.null_code(&column, id)?)
    }))
}

/// Label of the arc entering the node in the partial structure
fn output_column(args: &[SpecTerm], spec: &str, algorithm: Algorithm) -> FeatureResult<Box<Extractor>> {
    arity(args, 2, spec)?;
    let column = column_arg(args, spec, "OutputColumn", &OUTPUT_COLUMNS)?;
    let address = address_arg(args, 1, spec, algorithm)?;
    Ok(Box::new(move |config: &ParserConfiguration, symbols: &dyn SymbolTableHandler| -> FeatureResult<i32> {
        let id = match address.resolve(config) {
            None => NullValueId::NoNode,
            Some(0) => NullValueId::RootNode,
            Some(node) => match config.structure().label(node) {
                Some(label) => return Ok(label),
                None => NullValueId::NoValue,
            },
        };
        Ok(symbols.null_code(&column, id)?)
    }))
}

/// 1 when the address points at a node, 0 otherwise
fn exists(args: &[SpecTerm], spec: &str, algorithm: Algorithm) -> FeatureResult<Box<Extractor>> {
    arity(args, 1, spec)?;
    let address = address_arg(args, 0, spec, algorithm)?;
    Ok(Box::new(move |config: &ParserConfiguration, _: &dyn SymbolTableHandler| -> FeatureResult<i32> {
        Ok(i32::from(address.resolve(config).is_some()))
    }))
}

/// Name to constructor map, built on first use
#[derive(Debug)]
pub struct FeatureRegistry {
    constructors: BTreeMap<&'static str, Constructor>,
}

static REGISTRY: OnceLock<FeatureRegistry> = OnceLock::new();

impl FeatureRegistry {
    pub fn global() -> &'static FeatureRegistry {
        REGISTRY.get_or_init(|| {
            let mut constructors: BTreeMap<&'static str, Constructor> = BTreeMap::new();
            constructors.insert("InputColumn", input_column);
            constructors.insert("OutputColumn", output_column);
            constructors.insert("Exists", exists);
            FeatureRegistry { constructors }
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Resolve one specification string into a feature function
    pub fn build(&self, spec: &str, algorithm: Algorithm) -> FeatureResult<FeatureFunction> {
        let term = SpecTerm::parse(spec)?;
        let SpecTerm::Call { name, args } = &term else {
            return Err(FeatureError::malformed(spec, "a feature is a function call"));
        };
        let constructor = self
            .constructors
            .get(name.as_str())
            .ok_or_else(|| FeatureError::UnknownFunction { name: name.clone() })?;
        Ok(FeatureFunction {
            spec: term.to_string(),
            extractor: constructor(args, spec, algorithm)?,
        })
    }
}
