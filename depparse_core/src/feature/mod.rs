//! Feature extraction
//!
//! A [`FeatureModel`] is an ordered list of feature functions resolved from
//! specification strings through the [`FeatureRegistry`]. Extraction reads the
//! configuration and the symbol tables and never mutates either.

pub mod error;
pub mod registry;
pub mod spec;

pub use error::{FeatureError, FeatureResult};
pub use registry::{Address, FeatureFunction, FeatureRegistry, Navigation};
pub use spec::SpecTerm;

use crate::algorithm::ParserConfiguration;
use crate::config::Algorithm;
use crate::symbols::SymbolTableHandler;

const STACK_FEATURES: &[&str] = &[
    "InputColumn(POSTAG, Stack[0])",
    "InputColumn(POSTAG, Stack[1])",
    "InputColumn(POSTAG, Input[0])",
    "InputColumn(POSTAG, Input[1])",
    "InputColumn(POSTAG, Lookahead[2])",
    "InputColumn(FORM, Stack[0])",
    "InputColumn(FORM, Input[0])",
    "InputColumn(FORM, Input[1])",
    "InputColumn(FORM, head(Stack[0]))",
    "OutputColumn(DEPREL, Stack[0])",
    "OutputColumn(DEPREL, ldep(Stack[0]))",
    "OutputColumn(DEPREL, rdep(Stack[0]))",
    "OutputColumn(DEPREL, ldep(Input[0]))",
];

const COVINGTON_FEATURES: &[&str] = &[
    "InputColumn(POSTAG, Left[0])",
    "InputColumn(POSTAG, Left[1])",
    "InputColumn(POSTAG, Right[0])",
    "InputColumn(POSTAG, Right[1])",
    "InputColumn(POSTAG, LeftContext[0])",
    "InputColumn(POSTAG, RightContext[0])",
    "InputColumn(FORM, Left[0])",
    "InputColumn(FORM, Right[0])",
    "OutputColumn(DEPREL, Left[0])",
    "OutputColumn(DEPREL, ldep(Left[0]))",
    "OutputColumn(DEPREL, rdep(Left[0]))",
    "OutputColumn(DEPREL, ldep(Right[0]))",
];

const TWO_PLANAR_FEATURES: &[&str] = &[
    "InputColumn(POSTAG, ActiveStack[0])",
    "InputColumn(POSTAG, ActiveStack[1])",
    "InputColumn(POSTAG, InactiveStack[0])",
    "InputColumn(POSTAG, Input[0])",
    "InputColumn(POSTAG, Input[1])",
    "InputColumn(FORM, ActiveStack[0])",
    "InputColumn(FORM, InactiveStack[0])",
    "InputColumn(FORM, Input[0])",
    "OutputColumn(DEPREL, ActiveStack[0])",
    "OutputColumn(DEPREL, InactiveStack[0])",
    "OutputColumn(DEPREL, ldep(Input[0]))",
    "Exists(InactiveStack[1])",
];

#[derive(Debug)]
pub struct FeatureModel {
    algorithm: Algorithm,
    functions: Vec<FeatureFunction>,
}

impl FeatureModel {
    pub fn new(specs: &[String], algorithm: Algorithm) -> FeatureResult<Self> {
        let registry = FeatureRegistry::global();
        let functions = specs
            .iter()
            .map(|spec| registry.build(spec, algorithm))
            .collect::<FeatureResult<Vec<_>>>()?;
        Ok(Self {
            algorithm,
            functions,
        })
    }

    /// Feature model used when the options list none
    pub fn default_specs(algorithm: Algorithm) -> Vec<String> {
        let specs = match algorithm {
            Algorithm::NivreEager | Algorithm::StackProj | Algorithm::Planar => STACK_FEATURES,
            Algorithm::CovNonProj | Algorithm::CovProj => COVINGTON_FEATURES,
            Algorithm::TwoPlanar => TWO_PLANAR_FEATURES,
        };
        specs.iter().map(|s| s.to_string()).collect()
    }

    /// Resolve a specification without keeping it
    pub fn check_spec(spec: &str, algorithm: Algorithm) -> FeatureResult<()> {
        FeatureRegistry::global().build(spec, algorithm).map(|_| ())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn specs(&self) -> impl Iterator<Item = &str> {
        self.functions.iter().map(FeatureFunction::spec)
    }

    /// One code per feature function, in model order
    pub fn extract(
        &self,
        config: &ParserConfiguration,
        symbols: &dyn SymbolTableHandler,
    ) -> FeatureResult<Vec<i32>> {
        self.functions
            .iter()
            .map(|function| function.extract(config, symbols))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{ParseMode, ParsingAlgorithm, StackVariant};
    use crate::graph::DependencyStructure;
    use crate::symbols::{HashSymbolTableHandler, NullValueStrategy, TableCategory, ValueType};
    use crate::transition::{Transition, TransitionKind};
    use assert_matches::assert_matches;

    fn symbols() -> HashSymbolTableHandler {
        let mut symbols = HashSymbolTableHandler::new(NullValueStrategy::RootNode);
        for table in ["FORM", "POSTAG"] {
            symbols
                .add_symbol_table(table, TableCategory::Input, ValueType::String)
                .unwrap();
        }
        symbols
            .add_symbol_table("DEPREL", TableCategory::Output, ValueType::String)
            .unwrap();
        symbols
    }

    fn sentence(symbols: &mut HashSymbolTableHandler) -> DependencyStructure {
        let mut structure = DependencyStructure::new(2);
        for (node, (form, tag)) in [(1, ("John", "NNP")), (2, ("sleeps", "VBZ"))] {
            let form = symbols.add_symbol("FORM", form).unwrap();
            let tag = symbols.add_symbol("POSTAG", tag).unwrap();
            structure.set_column(node, "FORM", form).unwrap();
            structure.set_column(node, "POSTAG", tag).unwrap();
        }
        structure
    }

    fn model(specs: &[&str], algorithm: Algorithm) -> FeatureModel {
        let specs: Vec<String> = specs.iter().map(|s| s.to_string()).collect();
        FeatureModel::new(&specs, algorithm).unwrap()
    }

    #[test]
    fn test_default_specs_resolve() {
        for algorithm in Algorithm::ALL {
            let specs = FeatureModel::default_specs(algorithm);
            let model = FeatureModel::new(&specs, algorithm).unwrap();
            assert_eq!(model.len(), specs.len());
        }
    }

    #[test]
    fn test_spec_errors() {
        assert_matches!(
            FeatureModel::check_spec("Split(FORM, Stack[0])", Algorithm::NivreEager),
            Err(FeatureError::UnknownFunction { .. })
        );
        assert_matches!(
            FeatureModel::check_spec("InputColumn(FORM, Left[0])", Algorithm::NivreEager),
            Err(FeatureError::UnsupportedAddress { .. })
        );
        assert_matches!(
            FeatureModel::check_spec("InputColumn(HEAD, Stack[0])", Algorithm::NivreEager),
            Err(FeatureError::UnknownColumn { .. })
        );
        assert_matches!(
            FeatureModel::check_spec("InputColumn(FORM, sibling(Stack[0]))", Algorithm::NivreEager),
            Err(FeatureError::MalformedSpec { .. })
        );
        assert_matches!(
            FeatureModel::check_spec("Exists(Stack[0], Input[0])", Algorithm::NivreEager),
            Err(FeatureError::MalformedSpec { .. })
        );
        assert_matches!(
            FeatureModel::check_spec("POSTAG", Algorithm::NivreEager),
            Err(FeatureError::MalformedSpec { .. })
        );
    }

    #[test]
    fn test_extraction_uses_null_codes() {
        let mut symbols = symbols();
        let structure = sentence(&mut symbols);
        let john = symbols.symbol_to_code("FORM", "John").unwrap().unwrap();

        let algorithm = ParsingAlgorithm::Stack(StackVariant::ArcEager {
            allow_root: true,
            allow_reduce: false,
        });
        let config = algorithm.initial_configuration(structure);
        let model = model(
            &[
                "InputColumn(POSTAG, Stack[0])",
                "InputColumn(FORM, Input[0])",
                "InputColumn(POSTAG, Stack[1])",
                "Exists(Input[1])",
                "Exists(Input[2])",
            ],
            Algorithm::NivreEager,
        );

        let features = model.extract(&config, &symbols).unwrap();
        assert_eq!(features, vec![1, john, 0, 1, 0]);
    }

    #[test]
    fn test_output_column_follows_new_arcs() {
        let mut symbols = symbols();
        let structure = sentence(&mut symbols);
        let sbj = symbols.add_symbol("DEPREL", "SBJ").unwrap();
        let sleeps = symbols.symbol_to_code("FORM", "sleeps").unwrap().unwrap();

        let algorithm = ParsingAlgorithm::Stack(StackVariant::ArcEager {
            allow_root: true,
            allow_reduce: false,
        });
        let mut config = algorithm.initial_configuration(structure);
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        config
            .apply(Transition::labeled(TransitionKind::LeftArc, sbj), ParseMode::Parse)
            .unwrap();

        let model = model(
            &[
                "OutputColumn(DEPREL, ldep(Input[0]))",
                "InputColumn(FORM, head(pred(Input[0])))",
                "OutputColumn(DEPREL, Input[0])",
            ],
            Algorithm::NivreEager,
        );
        let features = model.extract(&config, &symbols).unwrap();
        assert_eq!(features, vec![sbj, sleeps, 0]);
    }
}
