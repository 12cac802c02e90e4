//! Oracle guide: the transition sequence that rebuilds a gold structure

use super::error::{OracleError, OracleResult};
use super::{covington, planar, stack, twoplanar};
use super::planar::PlanarPolicy;
use super::{ParseMode, ParserConfiguration, ParsingAlgorithm, StackVariant};
use crate::config::constants::parsing::transition_budget;
use crate::config::Connectedness;
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionError};

/// Derives, for any configuration on the way, the transition that advances
/// towards `gold`. One guide is built per gold sentence.
#[derive(Debug, Clone)]
pub struct OracleGuide<'g> {
    algorithm: ParsingAlgorithm,
    gold: &'g DependencyStructure,
    /// Plane of each gold arc by dependent, two-planar only
    planes: Vec<Option<usize>>,
}

impl<'g> OracleGuide<'g> {
    /// Fails with `NotExpressible` when `gold` is outside the algorithm's structural class
    pub fn new(algorithm: ParsingAlgorithm, gold: &'g DependencyStructure) -> OracleResult<Self> {
        let name = algorithm.name();
        let requires_projective = matches!(
            algorithm,
            ParsingAlgorithm::Stack(_) | ParsingAlgorithm::Planar(_)
        ) || matches!(algorithm, ParsingAlgorithm::Covington(p) if p.projective);

        if requires_projective {
            let relaxed = matches!(algorithm, ParsingAlgorithm::Planar(p) if p.relaxed_root());
            let crossing = gold
                .edges()
                .iter()
                .filter(|e| !(relaxed && e.head == 0))
                .any(|e| {
                    gold.edges().iter().any(|o| {
                        !(relaxed && o.head == 0)
                            && DependencyStructure::crosses(e.head, e.dependent, o.head, o.dependent)
                    })
                });
            let projective = if relaxed { !crossing } else { gold.is_projective() };
            if !projective {
                return Err(OracleError::not_expressible(name, "gold structure has crossing arcs"));
            }
        }

        let planes = match algorithm {
            ParsingAlgorithm::TwoPlanar(policy) => {
                twoplanar::assign_planes(gold, policy.planar.relaxed_root())
                    .map_err(|reason| OracleError::not_expressible(name, &reason))?
            }
            _ => Vec::new(),
        };

        let guide = Self {
            algorithm,
            gold,
            planes,
        };
        if guide.restricted_by_policy() {
            guide.check_derivable()?;
        }
        Ok(guide)
    }

    /// Whether planar policy flags forbid transitions the plain oracle relies on
    fn restricted_by_policy(&self) -> bool {
        let restricts = |p: &PlanarPolicy| p.no_covered_roots || p.connectedness == Connectedness::Reduce;
        match self.algorithm {
            ParsingAlgorithm::Planar(p) => restricts(&p),
            ParsingAlgorithm::TwoPlanar(p) => restricts(&p.planar),
            _ => false,
        }
    }

    /// Run the oracle on a bare structure; gold trees the policy cannot reach are not expressible
    fn check_derivable(&self) -> OracleResult<()> {
        let name = self.algorithm.name();
        let n = self.gold.n_tokens();
        let mut config = self.algorithm.initial_configuration(DependencyStructure::new(n));
        let budget = transition_budget(n);
        let mut transitions = 0;

        while !config.is_terminal() {
            let transition = match config.deterministic_transition() {
                Some(transition) => transition,
                None => self.predict(&config)?,
            };
            if !config.is_permissible(&transition) {
                return Err(OracleError::not_expressible(
                    name,
                    &format!("policy forbids {} on the way to the gold structure", transition),
                ));
            }
            config.apply(transition, ParseMode::Learn)?;
            transitions += 1;
            if transitions > budget {
                return Err(OracleError::not_expressible(name, "derivation does not terminate"));
            }
        }

        let derived = config.finish(None);
        match (1..=n).find(|&token| derived.head(token) != self.gold.head(token)) {
            Some(token) => Err(OracleError::not_expressible(
                name,
                &format!("policy prevents attaching token {}", token),
            )),
            None => Ok(()),
        }
    }

    pub fn gold(&self) -> &DependencyStructure {
        self.gold
    }

    pub fn predict(&self, config: &ParserConfiguration) -> OracleResult<Transition> {
        let transition = match (self.algorithm, config) {
            (ParsingAlgorithm::Stack(_), ParserConfiguration::Stack(c)) => stack::oracle(c, self.gold),
            (ParsingAlgorithm::Covington(_), ParserConfiguration::Covington(c)) => {
                covington::oracle(c, self.gold)
            }
            (ParsingAlgorithm::Planar(_), ParserConfiguration::Planar(c)) => planar::oracle(c, self.gold),
            (ParsingAlgorithm::TwoPlanar(_), ParserConfiguration::TwoPlanar(c)) => {
                twoplanar::oracle(c, self.gold, &self.planes)
            }
            _ => {
                return Err(TransitionError::ConfigurationMismatch {
                    expected: self.algorithm.name().to_string(),
                    found: config.name().to_string(),
                }
                .into())
            }
        };
        Ok(transition)
    }

    /// Whether the arc-eager variant would leave root children for the final linking step
    pub fn links_roots_implicitly(&self) -> bool {
        match self.algorithm {
            ParsingAlgorithm::Stack(StackVariant::ArcEager { allow_root, .. }) => !allow_root,
            ParsingAlgorithm::Covington(p) => !p.allow_root,
            ParsingAlgorithm::Planar(p) => p.relaxed_root(),
            ParsingAlgorithm::TwoPlanar(p) => p.planar.relaxed_root(),
            ParsingAlgorithm::Stack(StackVariant::Projective) => false,
        }
    }
}
