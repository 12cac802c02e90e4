//! Stack algorithms: arc-standard (`stackproj`) and arc-eager (`nivreeager`)

use super::{AddressFunction, ParseMode, TransitionSystem};
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionKind, TransitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackVariant {
    /// Arc-standard; arcs between the two topmost stack nodes
    Projective,
    /// Arc-eager; arcs between the stack top and the next input node
    ArcEager { allow_root: bool, allow_reduce: bool },
}

const PROJECTIVE_KINDS: &[TransitionKind] = &[
    TransitionKind::Shift,
    TransitionKind::RightArc,
    TransitionKind::LeftArc,
];

const ARC_EAGER_KINDS: &[TransitionKind] = &[
    TransitionKind::Shift,
    TransitionKind::Reduce,
    TransitionKind::RightArc,
    TransitionKind::LeftArc,
];

#[derive(Debug, Clone)]
pub struct StackConfig {
    variant: StackVariant,
    stack: Vec<usize>,
    /// Remaining input, next node last
    input: Vec<usize>,
    structure: DependencyStructure,
}

impl StackConfig {
    pub fn new(variant: StackVariant, structure: DependencyStructure) -> Self {
        let input = (1..=structure.n_tokens()).rev().collect();
        Self {
            variant,
            stack: vec![0],
            input,
            structure,
        }
    }

    pub fn variant(&self) -> StackVariant {
        self.variant
    }

    /// `i`-th node from the top of the stack
    pub fn stack_peek(&self, i: usize) -> Option<usize> {
        self.stack.len().checked_sub(i + 1).map(|p| self.stack[p])
    }

    /// `i`-th node of the remaining input
    pub fn input_peek(&self, i: usize) -> Option<usize> {
        self.input.len().checked_sub(i + 1).map(|p| self.input[p])
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    fn check_projective(&self, kind: TransitionKind) -> Result<(), &'static str> {
        match kind {
            TransitionKind::Shift if self.input.is_empty() => Err("input is empty"),
            TransitionKind::Shift => Ok(()),
            TransitionKind::LeftArc | TransitionKind::RightArc if self.stack.len() < 2 => {
                Err("arcs need two stack nodes")
            }
            TransitionKind::LeftArc if self.stack_peek(1) == Some(0) => {
                Err("root cannot be a dependent")
            }
            TransitionKind::LeftArc | TransitionKind::RightArc => Ok(()),
            _ => Err("not an arc-standard transition"),
        }
    }

    fn check_arc_eager(
        &self,
        kind: TransitionKind,
        allow_root: bool,
        allow_reduce: bool,
    ) -> Result<(), &'static str> {
        let top = self.stack_peek(0).unwrap_or(0);
        match kind {
            TransitionKind::Shift | TransitionKind::LeftArc | TransitionKind::RightArc
                if self.input.is_empty() =>
            {
                Err("input is empty")
            }
            TransitionKind::Shift => Ok(()),
            TransitionKind::LeftArc if top == 0 => Err("root cannot be a dependent"),
            TransitionKind::LeftArc if self.structure.has_head(top) => {
                Err("stack top already has a head")
            }
            TransitionKind::LeftArc => Ok(()),
            TransitionKind::RightArc if top == 0 && !allow_root => {
                Err("root attachment is disabled")
            }
            TransitionKind::RightArc => Ok(()),
            TransitionKind::Reduce if top == 0 => Err("root cannot be reduced"),
            TransitionKind::Reduce if !allow_reduce && !self.structure.has_head(top) => {
                Err("stack top has no head")
            }
            TransitionKind::Reduce => Ok(()),
            _ => Err("not an arc-eager transition"),
        }
    }

    fn pop(&mut self) -> usize {
        self.stack.pop().unwrap_or(0)
    }

    fn next_input(&mut self) -> usize {
        self.input.pop().unwrap_or(0)
    }
}

impl TransitionSystem for StackConfig {
    fn name(&self) -> &'static str {
        match self.variant {
            StackVariant::Projective => "stackproj",
            StackVariant::ArcEager { .. } => "nivreeager",
        }
    }

    fn kinds(&self) -> &'static [TransitionKind] {
        match self.variant {
            StackVariant::Projective => PROJECTIVE_KINDS,
            StackVariant::ArcEager { .. } => ARC_EAGER_KINDS,
        }
    }

    fn structure(&self) -> &DependencyStructure {
        &self.structure
    }

    fn into_structure(self) -> DependencyStructure {
        self.structure
    }

    fn check(&self, kind: TransitionKind) -> Result<(), &'static str> {
        match self.variant {
            StackVariant::Projective => self.check_projective(kind),
            StackVariant::ArcEager {
                allow_root,
                allow_reduce,
            } => self.check_arc_eager(kind, allow_root, allow_reduce),
        }
    }

    fn perform(&mut self, transition: Transition, _mode: ParseMode) -> TransitionResult<()> {
        match (self.variant, transition.kind) {
            (_, TransitionKind::Shift) => {
                let node = self.next_input();
                self.stack.push(node);
            }
            (StackVariant::Projective, TransitionKind::LeftArc) => {
                let head = self.pop();
                let dependent = self.pop();
                self.structure.add_edge(head, dependent, transition.label)?;
                self.stack.push(head);
            }
            (StackVariant::Projective, TransitionKind::RightArc) => {
                let dependent = self.pop();
                let head = self.stack_peek(0).unwrap_or(0);
                self.structure.add_edge(head, dependent, transition.label)?;
            }
            (StackVariant::ArcEager { .. }, TransitionKind::LeftArc) => {
                let dependent = self.pop();
                let head = self.input_peek(0).unwrap_or(0);
                self.structure.add_edge(head, dependent, transition.label)?;
            }
            (StackVariant::ArcEager { .. }, TransitionKind::RightArc) => {
                let head = self.stack_peek(0).unwrap_or(0);
                let dependent = self.next_input();
                self.structure.add_edge(head, dependent, transition.label)?;
                self.stack.push(dependent);
            }
            (_, TransitionKind::Reduce) => {
                self.pop();
            }
            _ => {}
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        match self.variant {
            StackVariant::Projective => self.input.is_empty() && self.stack.len() == 1,
            StackVariant::ArcEager { .. } => self.input.is_empty(),
        }
    }

    fn deterministic_transition(&self) -> Option<Transition> {
        if self.input.is_empty() {
            return None;
        }
        match self.variant {
            StackVariant::Projective if self.stack.len() == 1 => Some(Transition::shift()),
            StackVariant::ArcEager {
                allow_root: false, ..
            } if self.stack_peek(0) == Some(0) => Some(Transition::shift()),
            _ => None,
        }
    }

    fn default_transition(&self, root_label: i32) -> Transition {
        if self.input.is_empty() {
            Transition::right_arc(Some(root_label))
        } else {
            Transition::shift()
        }
    }

    fn address(&self, function: AddressFunction, index: usize) -> Option<usize> {
        match function {
            AddressFunction::Stack => self.stack_peek(index),
            AddressFunction::Input | AddressFunction::Lookahead => self.input_peek(index),
            _ => None,
        }
    }
}

// ============================================================================
// ORACLES
// ============================================================================

fn gold_arc(gold: &DependencyStructure, kind: TransitionKind, dependent: usize) -> Transition {
    Transition {
        kind,
        label: gold.label(dependent),
    }
}

/// Next transition towards `gold`
pub(crate) fn oracle(config: &StackConfig, gold: &DependencyStructure) -> Transition {
    match config.variant {
        StackVariant::Projective => projective_oracle(config, gold),
        StackVariant::ArcEager {
            allow_root,
            allow_reduce,
        } => arc_eager_oracle(config, gold, allow_root, allow_reduce),
    }
}

fn projective_oracle(config: &StackConfig, gold: &DependencyStructure) -> Transition {
    let (Some(right), Some(left)) = (config.stack_peek(0), config.stack_peek(1)) else {
        return Transition::shift();
    };
    if left != 0 && gold.head(left) == Some(right) {
        return gold_arc(gold, TransitionKind::LeftArc, left);
    }
    let complete = gold
        .dependents(right)
        .iter()
        .all(|&d| config.structure.has_head(d));
    if gold.head(right) == Some(left) && complete {
        return gold_arc(gold, TransitionKind::RightArc, right);
    }
    Transition::shift()
}

fn arc_eager_oracle(
    config: &StackConfig,
    gold: &DependencyStructure,
    allow_root: bool,
    allow_reduce: bool,
) -> Transition {
    let top = config.stack_peek(0).unwrap_or(0);
    let Some(next) = config.input_peek(0) else {
        return Transition::reduce();
    };

    if top != 0 && gold.head(top) == Some(next) {
        return gold_arc(gold, TransitionKind::LeftArc, top);
    }
    if gold.head(next) == Some(top) {
        return gold_arc(gold, TransitionKind::RightArc, next);
    }
    if !allow_reduce && !config.structure.has_head(top) {
        return Transition::shift();
    }
    if gold.leftmost_dependent(next).is_some_and(|d| d < top) {
        return Transition::reduce();
    }
    match gold.head(next) {
        Some(head) if head < top && (head != 0 || allow_root) => Transition::reduce(),
        _ => Transition::shift(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::ParserConfiguration;

    fn eager(n: usize) -> ParserConfiguration {
        ParserConfiguration::Stack(StackConfig::new(
            StackVariant::ArcEager {
                allow_root: true,
                allow_reduce: false,
            },
            DependencyStructure::new(n),
        ))
    }

    #[test]
    fn test_arc_standard_initial_state() {
        let config = ParserConfiguration::Stack(StackConfig::new(
            StackVariant::Projective,
            DependencyStructure::new(3),
        ));
        assert_eq!(config.legal_transitions(), vec![TransitionKind::Shift]);
        assert_eq!(config.deterministic_transition(), Some(Transition::shift()));
        assert_eq!(config.address(AddressFunction::Input, 0), Some(1));
        assert_eq!(config.address(AddressFunction::Stack, 0), Some(0));
        assert_eq!(config.address(AddressFunction::Stack, 1), None);
    }

    #[test]
    fn test_arc_standard_arcs() {
        let mut config = ParserConfiguration::Stack(StackConfig::new(
            StackVariant::Projective,
            DependencyStructure::new(2),
        ));
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        // root cannot become a dependent
        assert!(!config.is_permissible(&Transition::left_arc(Some(1))));
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        config.apply(Transition::left_arc(Some(4)), ParseMode::Parse).unwrap();
        assert_eq!(config.structure().head(1), Some(2));
        config.apply(Transition::right_arc(Some(5)), ParseMode::Parse).unwrap();
        assert_eq!(config.structure().head(2), Some(0));
        assert!(config.is_terminal());
    }

    #[test]
    fn test_arc_eager_legality() {
        let mut config = eager(2);
        assert!(!config.is_permissible(&Transition::reduce()));
        assert!(!config.is_permissible(&Transition::left_arc(Some(1))));
        assert!(config.is_permissible(&Transition::right_arc(Some(1))));
        assert!(!config.is_permissible(&Transition::right_arc(None)));

        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        // headless top cannot be reduced without allow_reduce
        assert!(!config.is_permissible(&Transition::reduce()));
        config.apply(Transition::left_arc(Some(3)), ParseMode::Parse).unwrap();
        assert_eq!(config.structure().head(1), Some(2));
        assert_eq!(config.address(AddressFunction::Stack, 0), Some(0));
    }

    #[test]
    fn test_arc_eager_without_root_attachment() {
        let config = ParserConfiguration::Stack(StackConfig::new(
            StackVariant::ArcEager {
                allow_root: false,
                allow_reduce: false,
            },
            DependencyStructure::new(2),
        ));
        assert!(!config.is_permissible(&Transition::right_arc(Some(1))));
        assert_eq!(config.deterministic_transition(), Some(Transition::shift()));
    }

    #[test]
    fn test_arc_eager_terminates_on_empty_input() {
        let mut config = eager(1);
        config.apply(Transition::shift(), ParseMode::Parse).unwrap();
        assert!(config.is_terminal());
        assert_eq!(config.address(AddressFunction::Input, 0), None);
    }
}
