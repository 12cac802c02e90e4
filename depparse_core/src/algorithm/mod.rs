//! Parsing algorithms
//!
//! Four families, each bringing its own configuration shape, transition
//! system and oracle:
//!
//! * [`stack`]: `stackproj` (arc-standard) and `nivreeager` (arc-eager)
//! * [`covington`]: `covnonproj` and `covproj`
//! * [`planar`]: planar arc-eager
//! * [`twoplanar`]: two-planar arc-eager with SWITCH
//!
//! [`ParsingAlgorithm`] is chosen once from the options and builds the initial
//! [`ParserConfiguration`]; every operation on a configuration dispatches on
//! the family with a `match`.

pub mod covington;
pub mod error;
pub mod oracle;
pub mod planar;
pub mod stack;
pub mod twoplanar;

pub use covington::{CovingtonConfig, CovingtonPolicy};
pub use error::{OracleError, OracleResult};
pub use oracle::OracleGuide;
pub use planar::{PlanarConfig, PlanarPolicy};
pub use stack::{StackConfig, StackVariant};
pub use twoplanar::{TwoPlanarConfig, TwoPlanarPolicy};

use crate::config::{Algorithm, ConfigResult, ParserOptions};
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionError, TransitionKind, TransitionResult, TransitionTable};

/// Oracle derivation or parsing
///
/// Some transitions behave differently when the parser runs on its own
/// predictions (`reduceonswitch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Learn,
    Parse,
}

/// Positions a configuration exposes to feature extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFunction {
    Stack,
    Input,
    Lookahead,
    Left,
    Right,
    LeftContext,
    RightContext,
    ActiveStack,
    InactiveStack,
}

impl AddressFunction {
    pub const ALL: [AddressFunction; 9] = [
        AddressFunction::Stack,
        AddressFunction::Input,
        AddressFunction::Lookahead,
        AddressFunction::Left,
        AddressFunction::Right,
        AddressFunction::LeftContext,
        AddressFunction::RightContext,
        AddressFunction::ActiveStack,
        AddressFunction::InactiveStack,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AddressFunction::Stack => "Stack",
            AddressFunction::Input => "Input",
            AddressFunction::Lookahead => "Lookahead",
            AddressFunction::Left => "Left",
            AddressFunction::Right => "Right",
            AddressFunction::LeftContext => "LeftContext",
            AddressFunction::RightContext => "RightContext",
            AddressFunction::ActiveStack => "ActiveStack",
            AddressFunction::InactiveStack => "InactiveStack",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    pub fn supported_by(&self, algorithm: Algorithm) -> bool {
        use AddressFunction::*;
        match algorithm {
            Algorithm::NivreEager | Algorithm::StackProj | Algorithm::Planar => {
                matches!(self, Stack | Input | Lookahead)
            }
            Algorithm::CovNonProj | Algorithm::CovProj => {
                matches!(self, Left | Right | LeftContext | RightContext)
            }
            Algorithm::TwoPlanar => {
                matches!(self, Stack | Input | Lookahead | ActiveStack | InactiveStack)
            }
        }
    }
}

/// Behaviour every configuration family implements
pub trait TransitionSystem {
    fn name(&self) -> &'static str;

    /// Transitions of the family in table order
    fn kinds(&self) -> &'static [TransitionKind];

    fn structure(&self) -> &DependencyStructure;

    fn into_structure(self) -> DependencyStructure;

    /// `Err(reason)` when `kind` is not permissible in the current state
    fn check(&self, kind: TransitionKind) -> Result<(), &'static str>;

    /// Apply a transition already known to be permissible
    fn perform(&mut self, transition: Transition, mode: ParseMode) -> TransitionResult<()>;

    fn is_terminal(&self) -> bool;

    /// A transition forced by the state, taken without asking the guide
    fn deterministic_transition(&self) -> Option<Transition>;

    /// A transition permissible in every non-terminal state
    fn default_transition(&self, root_label: i32) -> Transition;

    fn address(&self, function: AddressFunction, index: usize) -> Option<usize>;
}

// ============================================================================
// ALGORITHM SELECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsingAlgorithm {
    Stack(StackVariant),
    Covington(CovingtonPolicy),
    Planar(PlanarPolicy),
    TwoPlanar(TwoPlanarPolicy),
}

impl ParsingAlgorithm {
    pub fn from_options(options: &ParserOptions) -> ConfigResult<Self> {
        let planar = PlanarPolicy {
            no_covered_roots: options.planar.no_covered_roots,
            acyclicity: options.planar.acyclicity,
            connectedness: options.connectedness()?,
            root_handling: options.root_handling()?,
        };
        let covington = |projective| CovingtonPolicy {
            allow_root: options.covington.allow_root,
            allow_shift: options.covington.allow_shift,
            projective,
        };

        Ok(match options.algorithm()? {
            Algorithm::StackProj => ParsingAlgorithm::Stack(StackVariant::Projective),
            Algorithm::NivreEager => ParsingAlgorithm::Stack(StackVariant::ArcEager {
                allow_root: options.nivre.allow_root,
                allow_reduce: options.nivre.allow_reduce,
            }),
            Algorithm::CovNonProj => ParsingAlgorithm::Covington(covington(false)),
            Algorithm::CovProj => ParsingAlgorithm::Covington(covington(true)),
            Algorithm::Planar => ParsingAlgorithm::Planar(planar),
            Algorithm::TwoPlanar => ParsingAlgorithm::TwoPlanar(TwoPlanarPolicy {
                planar,
                reduce_on_switch: options.two_planar.reduceonswitch,
            }),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            ParsingAlgorithm::Stack(StackVariant::Projective) => Algorithm::StackProj,
            ParsingAlgorithm::Stack(StackVariant::ArcEager { .. }) => Algorithm::NivreEager,
            ParsingAlgorithm::Covington(p) if p.projective => Algorithm::CovProj,
            ParsingAlgorithm::Covington(_) => Algorithm::CovNonProj,
            ParsingAlgorithm::Planar(_) => Algorithm::Planar,
            ParsingAlgorithm::TwoPlanar(_) => Algorithm::TwoPlanar,
        }
    }

    pub fn name(&self) -> &'static str {
        self.algorithm().as_str()
    }

    pub fn initial_configuration(&self, structure: DependencyStructure) -> ParserConfiguration {
        match *self {
            ParsingAlgorithm::Stack(variant) => {
                ParserConfiguration::Stack(StackConfig::new(variant, structure))
            }
            ParsingAlgorithm::Covington(policy) => {
                ParserConfiguration::Covington(CovingtonConfig::new(policy, structure))
            }
            ParsingAlgorithm::Planar(policy) => {
                ParserConfiguration::Planar(PlanarConfig::new(policy, structure))
            }
            ParsingAlgorithm::TwoPlanar(policy) => {
                ParserConfiguration::TwoPlanar(TwoPlanarConfig::new(policy, structure))
            }
        }
    }

    pub fn transition_table(&self) -> TransitionTable {
        let probe = self.initial_configuration(DependencyStructure::new(0));
        TransitionTable::new(self.name(), probe.kinds())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub enum ParserConfiguration {
    Stack(StackConfig),
    Covington(CovingtonConfig),
    Planar(PlanarConfig),
    TwoPlanar(TwoPlanarConfig),
}

macro_rules! dispatch {
    ($config:expr, $c:ident => $body:expr) => {
        match $config {
            ParserConfiguration::Stack($c) => $body,
            ParserConfiguration::Covington($c) => $body,
            ParserConfiguration::Planar($c) => $body,
            ParserConfiguration::TwoPlanar($c) => $body,
        }
    };
}

impl ParserConfiguration {
    pub fn name(&self) -> &'static str {
        dispatch!(self, c => c.name())
    }

    pub fn kinds(&self) -> &'static [TransitionKind] {
        dispatch!(self, c => c.kinds())
    }

    pub fn structure(&self) -> &DependencyStructure {
        dispatch!(self, c => c.structure())
    }

    pub fn into_structure(self) -> DependencyStructure {
        dispatch!(self, c => c.into_structure())
    }

    /// Final structure with every headless token attached to the root
    pub fn finish(self, root_label: Option<i32>) -> DependencyStructure {
        let mut structure = self.into_structure();
        structure.link_all_trees_to_root(root_label);
        structure
    }

    pub fn legal_transitions(&self) -> Vec<TransitionKind> {
        dispatch!(self, c => c
            .kinds()
            .iter()
            .copied()
            .filter(|&kind| c.check(kind).is_ok())
            .collect())
    }

    pub fn is_permissible(&self, transition: &Transition) -> bool {
        self.check(transition).is_ok()
    }

    fn check(&self, transition: &Transition) -> Result<(), &'static str> {
        if transition.kind.is_arc() && transition.label.is_none() {
            return Err("arc transitions need a label");
        }
        dispatch!(self, c => c.check(transition.kind))
    }

    /// Apply `transition`; an impermissible transition leaves the state untouched
    pub fn apply(&mut self, transition: Transition, mode: ParseMode) -> TransitionResult<()> {
        if let Err(reason) = self.check(&transition) {
            return Err(TransitionError::illegal(transition, self.name(), reason));
        }
        dispatch!(self, c => c.perform(transition, mode))
    }

    pub fn is_terminal(&self) -> bool {
        dispatch!(self, c => c.is_terminal())
    }

    pub fn deterministic_transition(&self) -> Option<Transition> {
        dispatch!(self, c => c.deterministic_transition())
    }

    pub fn default_transition(&self, root_label: i32) -> Transition {
        dispatch!(self, c => c.default_transition(root_label))
    }

    pub fn address(&self, function: AddressFunction, index: usize) -> Option<usize> {
        dispatch!(self, c => c.address(function, index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_algorithm_from_options() {
        for algorithm in Algorithm::ALL {
            let options = ParserOptions::for_algorithm(algorithm);
            let parsing = ParsingAlgorithm::from_options(&options).unwrap();
            assert_eq!(parsing.algorithm(), algorithm);
            assert_eq!(parsing.name(), algorithm.as_str());
        }
    }

    #[test]
    fn test_transition_tables() {
        let options = ParserOptions::for_algorithm(Algorithm::TwoPlanar);
        let table = ParsingAlgorithm::from_options(&options)
            .unwrap()
            .transition_table();
        assert!(table.contains(TransitionKind::Switch));
        assert_eq!(table.entries().len(), 5);

        let options = ParserOptions::for_algorithm(Algorithm::StackProj);
        let table = ParsingAlgorithm::from_options(&options)
            .unwrap()
            .transition_table();
        assert!(!table.contains(TransitionKind::Reduce));
    }

    #[test]
    fn test_illegal_apply_is_an_error() {
        let algorithm = ParsingAlgorithm::Stack(StackVariant::ArcEager {
            allow_root: true,
            allow_reduce: false,
        });
        let mut config = algorithm.initial_configuration(DependencyStructure::new(2));
        assert_matches!(
            config.apply(Transition::reduce(), ParseMode::Parse),
            Err(TransitionError::IllegalTransition { reason, .. }) if reason == "root cannot be reduced"
        );
        assert_matches!(
            config.apply(Transition::switch(), ParseMode::Parse),
            Err(TransitionError::IllegalTransition { .. })
        );
        assert_eq!(config.structure().n_edges(), 0);
    }

    #[test]
    fn test_default_transition_is_always_legal() {
        let options = ParserOptions::default();
        for algorithm in Algorithm::ALL {
            let mut options = options.clone();
            options.parser.algorithm = algorithm.as_str().to_string();
            let parsing = ParsingAlgorithm::from_options(&options).unwrap();
            let mut config = parsing.initial_configuration(DependencyStructure::new(4));
            let mut steps = 0;
            while !config.is_terminal() {
                let transition = config.default_transition(1);
                assert!(config.is_permissible(&transition), "{} {}", algorithm, transition);
                config.apply(transition, ParseMode::Parse).unwrap();
                steps += 1;
                assert!(steps < 100);
            }
        }
    }

    #[test]
    fn test_address_support() {
        assert!(AddressFunction::Left.supported_by(Algorithm::CovNonProj));
        assert!(!AddressFunction::Left.supported_by(Algorithm::NivreEager));
        assert!(AddressFunction::InactiveStack.supported_by(Algorithm::TwoPlanar));
        assert_eq!(AddressFunction::from_name("RightContext"), Some(AddressFunction::RightContext));
        assert_eq!(AddressFunction::from_name("Queue"), None);
    }
}
