//! Planar arc-eager algorithm
//!
//! Arcs are built between the stack top and the next input node without
//! moving either, so a node can collect several dependents on both sides
//! before it is reduced. The resulting graphs have no crossing arcs.

use super::{AddressFunction, ParseMode, TransitionSystem};
use crate::config::{Connectedness, RootHandling};
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionKind, TransitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarPolicy {
    pub no_covered_roots: bool,
    pub acyclicity: bool,
    pub connectedness: Connectedness,
    pub root_handling: RootHandling,
}

impl Default for PlanarPolicy {
    fn default() -> Self {
        Self {
            no_covered_roots: false,
            acyclicity: true,
            connectedness: Connectedness::None,
            root_handling: RootHandling::Normal,
        }
    }
}

impl PlanarPolicy {
    pub fn relaxed_root(&self) -> bool {
        self.root_handling == RootHandling::Relaxed
    }
}

const PLANAR_KINDS: &[TransitionKind] = &[
    TransitionKind::Shift,
    TransitionKind::Reduce,
    TransitionKind::RightArc,
    TransitionKind::LeftArc,
];

// ============================================================================
// SHARED LEGALITY
// ============================================================================

/// Arc legality between a stack node and the next input node
pub(crate) fn check_arc(
    structure: &DependencyStructure,
    policy: &PlanarPolicy,
    top: usize,
    next: usize,
    kind: TransitionKind,
) -> Result<(), &'static str> {
    if structure.has_edge(top, next) || structure.has_edge(next, top) {
        return Err("nodes are already linked");
    }
    let (head, dependent) = match kind {
        TransitionKind::LeftArc => (next, top),
        _ => (top, next),
    };
    if dependent == 0 {
        return Err("root cannot be a dependent");
    }
    if head == 0 && policy.relaxed_root() {
        return Err("root arcs are implicit under relaxed root handling");
    }
    if structure.has_head(dependent) {
        return Err("dependent already has a head");
    }
    if policy.acyclicity && structure.is_ancestor(dependent, head) {
        return Err("arc would close a cycle");
    }
    if policy.no_covered_roots && (top + 1..next).any(|k| !structure.has_head(k)) {
        return Err("arc would cover a headless node");
    }
    Ok(())
}

pub(crate) fn check_reduce(
    structure: &DependencyStructure,
    policy: &PlanarPolicy,
    top: usize,
) -> Result<(), &'static str> {
    if top == 0 {
        return Err("root cannot be reduced");
    }
    if policy.connectedness == Connectedness::Reduce
        && !policy.relaxed_root()
        && !structure.has_head(top)
    {
        return Err("headless node cannot be reduced");
    }
    Ok(())
}

/// Gold arc between `a` and `b` that is not built yet, as (head, dependent)
pub(crate) fn pending_arc(
    gold: &DependencyStructure,
    derived: &DependencyStructure,
    relaxed_root: bool,
    a: usize,
    b: usize,
) -> Option<(usize, usize)> {
    let arc = if a != 0 && gold.head(a) == Some(b) {
        (b, a)
    } else if b != 0 && gold.head(b) == Some(a) {
        (a, b)
    } else {
        return None;
    };
    let implicit = arc.0 == 0 && relaxed_root;
    (!implicit && !derived.has_edge(arc.0, arc.1)).then_some(arc)
}

pub(crate) fn arc_transition(gold: &DependencyStructure, top: usize, arc: (usize, usize)) -> Transition {
    let (head, dependent) = arc;
    let kind = if dependent == top {
        TransitionKind::LeftArc
    } else {
        TransitionKind::RightArc
    };
    debug_assert!(head != dependent);
    Transition {
        kind,
        label: gold.label(dependent),
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct PlanarConfig {
    policy: PlanarPolicy,
    stack: Vec<usize>,
    input: Vec<usize>,
    structure: DependencyStructure,
}

impl PlanarConfig {
    pub fn new(policy: PlanarPolicy, structure: DependencyStructure) -> Self {
        let input = (1..=structure.n_tokens()).rev().collect();
        Self {
            policy,
            stack: vec![0],
            input,
            structure,
        }
    }

    pub fn policy(&self) -> PlanarPolicy {
        self.policy
    }

    pub fn stack_peek(&self, i: usize) -> Option<usize> {
        self.stack.len().checked_sub(i + 1).map(|p| self.stack[p])
    }

    pub fn input_peek(&self, i: usize) -> Option<usize> {
        self.input.len().checked_sub(i + 1).map(|p| self.input[p])
    }
}

impl TransitionSystem for PlanarConfig {
    fn name(&self) -> &'static str {
        "planar"
    }

    fn kinds(&self) -> &'static [TransitionKind] {
        PLANAR_KINDS
    }

    fn structure(&self) -> &DependencyStructure {
        &self.structure
    }

    fn into_structure(self) -> DependencyStructure {
        self.structure
    }

    fn check(&self, kind: TransitionKind) -> Result<(), &'static str> {
        let top = self.stack_peek(0).unwrap_or(0);
        match (kind, self.input_peek(0)) {
            (TransitionKind::Reduce, _) => check_reduce(&self.structure, &self.policy, top),
            (_, None) => Err("input is empty"),
            (TransitionKind::Shift, Some(_)) => Ok(()),
            (TransitionKind::LeftArc | TransitionKind::RightArc, Some(next)) => {
                check_arc(&self.structure, &self.policy, top, next, kind)
            }
            _ => Err("not a planar transition"),
        }
    }

    fn perform(&mut self, transition: Transition, _mode: ParseMode) -> TransitionResult<()> {
        let top = self.stack_peek(0).unwrap_or(0);
        match transition.kind {
            TransitionKind::Shift => {
                if let Some(next) = self.input.pop() {
                    self.stack.push(next);
                }
            }
            TransitionKind::Reduce => {
                self.stack.pop();
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
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.input.is_empty()
    }

    fn deterministic_transition(&self) -> Option<Transition> {
        (!self.input.is_empty() && self.policy.relaxed_root() && self.stack_peek(0) == Some(0))
            .then(Transition::shift)
    }

    fn default_transition(&self, _root_label: i32) -> Transition {
        Transition::shift()
    }

    fn address(&self, function: AddressFunction, index: usize) -> Option<usize> {
        match function {
            AddressFunction::Stack => self.stack_peek(index),
            AddressFunction::Input | AddressFunction::Lookahead => self.input_peek(index),
            _ => None,
        }
    }
}

/// Next transition towards `gold`
pub(crate) fn oracle(config: &PlanarConfig, gold: &DependencyStructure) -> Transition {
    let relaxed = config.policy.relaxed_root();
    let top = config.stack_peek(0).unwrap_or(0);
    let Some(next) = config.input_peek(0) else {
        return Transition::shift();
    };

    if let Some(arc) = pending_arc(gold, &config.structure, relaxed, top, next) {
        return arc_transition(gold, top, arc);
    }
    let deeper = &config.stack[..config.stack.len().saturating_sub(1)];
    if deeper
        .iter()
        .any(|&d| pending_arc(gold, &config.structure, relaxed, d, next).is_some())
    {
        return Transition::reduce();
    }
    Transition::shift()
}
