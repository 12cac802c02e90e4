//! Two-planar arc-eager algorithm
//!
//! Two stacks, one per plane. SHIFT pushes the next input node onto both;
//! arcs and REDUCE act on the active stack only; SWITCH swaps which stack is
//! active. Each plane on its own is crossing-free.

use super::planar::{arc_transition, check_arc, check_reduce, pending_arc, PlanarPolicy};
use super::{AddressFunction, ParseMode, TransitionSystem};
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionKind, TransitionResult};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TwoPlanarPolicy {
    pub planar: PlanarPolicy,
    /// After SWITCH, pop the new active top if it already has a head (parse mode only)
    pub reduce_on_switch: bool,
}

const TWO_PLANAR_KINDS: &[TransitionKind] = &[
    TransitionKind::Shift,
    TransitionKind::Switch,
    TransitionKind::Reduce,
    TransitionKind::RightArc,
    TransitionKind::LeftArc,
];

#[derive(Debug, Clone)]
pub struct TwoPlanarConfig {
    policy: TwoPlanarPolicy,
    stacks: [Vec<usize>; 2],
    active: usize,
    input: Vec<usize>,
    last_was_switch: bool,
    structure: DependencyStructure,
}

impl TwoPlanarConfig {
    pub fn new(policy: TwoPlanarPolicy, structure: DependencyStructure) -> Self {
        let input = (1..=structure.n_tokens()).rev().collect();
        Self {
            policy,
            stacks: [vec![0], vec![0]],
            active: 0,
            input,
            last_was_switch: false,
            structure,
        }
    }

    pub fn policy(&self) -> TwoPlanarPolicy {
        self.policy
    }

    /// Index of the plane whose stack is active
    pub fn active_plane(&self) -> usize {
        self.active
    }

    pub fn active_peek(&self, i: usize) -> Option<usize> {
        peek(&self.stacks[self.active], i)
    }

    pub fn inactive_peek(&self, i: usize) -> Option<usize> {
        peek(&self.stacks[1 - self.active], i)
    }

    pub fn input_peek(&self, i: usize) -> Option<usize> {
        peek(&self.input, i)
    }
}

fn peek(stack: &[usize], i: usize) -> Option<usize> {
    stack.len().checked_sub(i + 1).map(|p| stack[p])
}

impl TransitionSystem for TwoPlanarConfig {
    fn name(&self) -> &'static str {
        "2planar"
    }

    fn kinds(&self) -> &'static [TransitionKind] {
        TWO_PLANAR_KINDS
    }

    fn structure(&self) -> &DependencyStructure {
        &self.structure
    }

    fn into_structure(self) -> DependencyStructure {
        self.structure
    }

    fn check(&self, kind: TransitionKind) -> Result<(), &'static str> {
        let top = self.active_peek(0).unwrap_or(0);
        let planar = &self.policy.planar;
        match (kind, self.input_peek(0)) {
            (TransitionKind::Reduce, _) => check_reduce(&self.structure, planar, top),
            (_, None) => Err("input is empty"),
            (TransitionKind::Shift, Some(_)) => Ok(()),
            (TransitionKind::Switch, Some(_)) if self.last_was_switch => {
                Err("two switches in a row")
            }
            (TransitionKind::Switch, Some(_)) => Ok(()),
            (TransitionKind::LeftArc | TransitionKind::RightArc, Some(next)) => {
                check_arc(&self.structure, planar, top, next, kind)
            }
            _ => Err("not a two-planar transition"),
        }
    }

    fn perform(&mut self, transition: Transition, mode: ParseMode) -> TransitionResult<()> {
        let top = self.active_peek(0).unwrap_or(0);
        match transition.kind {
            TransitionKind::Shift => {
                if let Some(next) = self.input.pop() {
                    self.stacks[0].push(next);
                    self.stacks[1].push(next);
                }
            }
            TransitionKind::Reduce => {
                self.stacks[self.active].pop();
            }
            TransitionKind::Switch => {
                self.active = 1 - self.active;
                if self.policy.reduce_on_switch && mode == ParseMode::Parse {
                    let new_top = self.active_peek(0).unwrap_or(0);
                    if new_top != 0 && self.structure.has_head(new_top) {
                        self.stacks[self.active].pop();
                    }
                }
            }
            TransitionKind::LeftArc => {
                let next = self.input_peek(0).unwrap_or(0);
                self.structure.add_edge(next, top, transition.label)?;
            }
            TransitionKind::RightArc => {
                let next = self.input_peek(0).unwrap_or(0);
                self.structure.add_edge(top, next, transition.label)?;
            }
            _ => {}
        }
        self.last_was_switch = transition.kind == TransitionKind::Switch;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.input.is_empty()
    }

    fn deterministic_transition(&self) -> Option<Transition> {
        None
    }

    fn default_transition(&self, _root_label: i32) -> Transition {
        Transition::shift()
    }

    fn address(&self, function: AddressFunction, index: usize) -> Option<usize> {
        match function {
            AddressFunction::ActiveStack | AddressFunction::Stack => self.active_peek(index),
            AddressFunction::InactiveStack => self.inactive_peek(index),
            AddressFunction::Input | AddressFunction::Lookahead => self.input_peek(index),
            _ => None,
        }
    }
}

// ============================================================================
// PLANE ASSIGNMENT AND ORACLE
// ============================================================================

/// Plane of every gold arc, indexed by dependent
///
/// Arcs are the vertices of a crossing graph; a proper 2-colouring of that
/// graph splits the arcs into two crossing-free planes. Root arcs are left
/// out under relaxed root handling since they are never built explicitly.
pub(crate) fn assign_planes(
    gold: &DependencyStructure,
    relaxed_root: bool,
) -> Result<Vec<Option<usize>>, String> {
    let arcs: Vec<(usize, usize)> = gold
        .edges()
        .into_iter()
        .filter(|e| !(relaxed_root && e.head == 0))
        .map(|e| (e.head, e.dependent))
        .collect();

    let crossing: Vec<Vec<usize>> = (0..arcs.len())
        .map(|i| {
            (0..arcs.len())
                .filter(|&j| {
                    i != j
                        && DependencyStructure::crosses(arcs[i].0, arcs[i].1, arcs[j].0, arcs[j].1)
                })
                .collect()
        })
        .collect();

    let mut colour: Vec<Option<usize>> = vec![None; arcs.len()];
    for start in 0..arcs.len() {
        if colour[start].is_some() {
            continue;
        }
        colour[start] = Some(0);
        let mut queue = VecDeque::from([start]);
        while let Some(arc) = queue.pop_front() {
            let own = colour[arc].unwrap_or(0);
            for &other in &crossing[arc] {
                match colour[other] {
                    None => {
                        colour[other] = Some(1 - own);
                        queue.push_back(other);
                    }
                    Some(c) if c == own => {
                        return Err(format!(
                            "arcs {}->{} and {}->{} cannot be separated into two planes",
                            arcs[arc].0, arcs[arc].1, arcs[other].0, arcs[other].1
                        ));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let mut planes = vec![None; gold.n_tokens() + 1];
    for (i, &(_, dependent)) in arcs.iter().enumerate() {
        planes[dependent] = colour[i];
    }
    Ok(planes)
}

/// Next transition towards `gold` given the plane of each gold arc
pub(crate) fn oracle(
    config: &TwoPlanarConfig,
    gold: &DependencyStructure,
    planes: &[Option<usize>],
) -> Transition {
    let relaxed = config.policy.planar.relaxed_root();
    let derived = &config.structure;
    let active = config.active;
    let top = config.active_peek(0).unwrap_or(0);
    let Some(next) = config.input_peek(0) else {
        return Transition::shift();
    };
    let plane_of = |arc: (usize, usize)| planes.get(arc.1).copied().flatten();

    let arc = pending_arc(gold, derived, relaxed, top, next)
        .filter(|&arc| plane_of(arc) == Some(active))
        .map(|arc| arc_transition(gold, top, arc));

    let active_stack = &config.stacks[active];
    let deeper = &active_stack[..active_stack.len().saturating_sub(1)];
    let needs_deeper = deeper.iter().any(|&d| {
        pending_arc(gold, derived, relaxed, d, next).is_some_and(|arc| plane_of(arc) == Some(active))
    });

    let needs_other_plane = (0..next).any(|d| {
        pending_arc(gold, derived, relaxed, d, next)
            .is_some_and(|arc| plane_of(arc) == Some(1 - active))
    });

    // Candidates in order of preference; policy flags can forbid any but SHIFT
    [
        arc,
        needs_deeper.then(Transition::reduce),
        needs_other_plane.then(Transition::switch),
    ]
    .into_iter()
    .flatten()
    .find(|t| config.check(t.kind).is_ok())
    .unwrap_or_else(Transition::shift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::ParserConfiguration;

    fn two_planar(n: usize, reduce_on_switch: bool) -> ParserConfiguration {
        ParserConfiguration::TwoPlanar(TwoPlanarConfig::new(
            TwoPlanarPolicy {
                planar: PlanarPolicy::default(),
                reduce_on_switch,
            },
            DependencyStructure::new(n),
        ))
    }

    #[test]
    fn test_shift_pushes_both_stacks() {
        let mut config = two_planar(2, false);
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        assert_eq!(config.address(AddressFunction::ActiveStack, 0), Some(1));
        assert_eq!(config.address(AddressFunction::InactiveStack, 0), Some(1));
        config.apply(Transition::reduce(), ParseMode::Parse).unwrap();
        assert_eq!(config.address(AddressFunction::ActiveStack, 0), Some(0));
        assert_eq!(config.address(AddressFunction::InactiveStack, 0), Some(1));
        config.apply(Transition::switch(), ParseMode::Parse).unwrap();
        assert_eq!(config.address(AddressFunction::ActiveStack, 0), Some(1));
        assert_eq!(config.address(AddressFunction::InactiveStack, 0), Some(0));
    }

    #[test]
    fn test_switch_twice_is_illegal() {
        let mut config = two_planar(2, false);
        config.apply(Transition::switch(), ParseMode::Parse).unwrap();
        assert!(!config.is_permissible(&Transition::switch()));
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        assert!(config.is_permissible(&Transition::switch()));
    }

    #[test]
    fn test_reduce_on_switch_applies_when_parsing() {
        let run = |mode: ParseMode| {
            let mut config = two_planar(3, true);
            config.apply(Transition::shift(), mode).unwrap();
            config.apply(Transition::left_arc(Some(1)), mode).unwrap(); // 2 -> 1
            config.apply(Transition::switch(), mode).unwrap();
            config.address(AddressFunction::ActiveStack, 0)
        };
        assert_eq!(run(ParseMode::Parse), Some(0));
        assert_eq!(run(ParseMode::Learn), Some(1));
    }

    #[test]
    fn test_plane_assignment() {
        // 1 -> 3 crosses both 2 -> 4 and 0 -> 2
        let mut gold = DependencyStructure::new(4);
        gold.add_edge(0, 2, Some(1)).unwrap();
        gold.add_edge(2, 4, Some(1)).unwrap();
        gold.add_edge(4, 1, Some(1)).unwrap();
        gold.add_edge(1, 3, Some(1)).unwrap();
        let planes = assign_planes(&gold, false).unwrap();
        assert_eq!(planes[2], planes[4]);
        assert_ne!(planes[3], planes[4]);
        assert_ne!(planes[3], planes[2]);
    }

    #[test]
    fn test_three_mutually_crossing_arcs_rejected() {
        let mut gold = DependencyStructure::new(6);
        gold.add_edge(0, 1, Some(1)).unwrap();
        gold.add_edge(1, 4, Some(1)).unwrap();
        gold.add_edge(2, 5, Some(1)).unwrap();
        gold.add_edge(3, 6, Some(1)).unwrap();
        gold.add_edge(1, 2, Some(1)).unwrap();
        gold.add_edge(1, 3, Some(1)).unwrap();
        assert!(assign_planes(&gold, false).is_err());
    }
}
