//! Covington's incremental algorithm (`covnonproj`, `covproj`)
//!
//! Every pair of nodes is considered once: `right` walks the sentence and
//! `left` scans back over the nodes before it. After an arc or NOARC the scan
//! skips nodes that could not take an arc with `right`, and falling below
//! `leftstop` advances `right`.

use super::{AddressFunction, ParseMode, TransitionSystem};
use crate::graph::DependencyStructure;
use crate::transition::{Transition, TransitionKind, TransitionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CovingtonPolicy {
    /// The root may take part in explicit arcs
    pub allow_root: bool,
    /// SHIFT may skip the rest of the scan
    pub allow_shift: bool,
    /// Reject arcs crossing an existing arc
    pub projective: bool,
}

const COVINGTON_KINDS: &[TransitionKind] = &[
    TransitionKind::Shift,
    TransitionKind::NoArc,
    TransitionKind::RightArc,
    TransitionKind::LeftArc,
];

#[derive(Debug, Clone)]
pub struct CovingtonConfig {
    policy: CovingtonPolicy,
    left: usize,
    right: usize,
    leftstop: usize,
    rightstop: usize,
    structure: DependencyStructure,
}

impl CovingtonConfig {
    pub fn new(policy: CovingtonPolicy, structure: DependencyStructure) -> Self {
        let rightstop = structure.n_tokens();
        Self {
            policy,
            left: 0,
            right: 1,
            leftstop: if policy.allow_root { 0 } else { 1 },
            rightstop,
            structure,
        }
    }

    pub fn policy(&self) -> CovingtonPolicy {
        self.policy
    }

    pub fn left_target(&self) -> usize {
        self.left
    }

    pub fn right_target(&self) -> usize {
        self.right
    }

    pub fn leftstop(&self) -> usize {
        self.leftstop
    }

    fn advance_right(&mut self) {
        self.right += 1;
        self.left = self.right - 1;
    }

    /// Move `left` to the next node that can still be linked with `right`
    fn scan_left(&mut self) {
        let right = self.right;
        let right_root = self.structure.component_root(right);
        let right_headed = self.structure.has_head(right);

        let mut candidate = self.left;
        while candidate > self.leftstop {
            candidate -= 1;
            let different_component = self.structure.component_root(candidate) != right_root;
            let both_headed = right_headed && self.structure.has_head(candidate);
            if different_component && !both_headed {
                self.left = candidate;
                return;
            }
        }
        self.advance_right();
    }
}

impl TransitionSystem for CovingtonConfig {
    fn name(&self) -> &'static str {
        if self.policy.projective {
            "covproj"
        } else {
            "covnonproj"
        }
    }

    fn kinds(&self) -> &'static [TransitionKind] {
        COVINGTON_KINDS
    }

    fn structure(&self) -> &DependencyStructure {
        &self.structure
    }

    fn into_structure(self) -> DependencyStructure {
        self.structure
    }

    fn check(&self, kind: TransitionKind) -> Result<(), &'static str> {
        if self.is_terminal() {
            return Err("configuration is terminal");
        }
        let (left, right) = (self.left, self.right);
        let linked = kind.is_arc()
            && self.structure.component_root(left) == self.structure.component_root(right);
        match kind {
            TransitionKind::Shift if !self.policy.allow_shift => Err("shift is disabled"),
            TransitionKind::Shift | TransitionKind::NoArc => Ok(()),
            TransitionKind::LeftArc if left == 0 => Err("root cannot be a dependent"),
            TransitionKind::LeftArc if self.structure.has_head(left) => {
                Err("left target already has a head")
            }
            TransitionKind::RightArc if self.structure.has_head(right) => {
                Err("right target already has a head")
            }
            TransitionKind::RightArc if left == 0 && !self.policy.allow_root => {
                Err("root attachment is disabled")
            }
            TransitionKind::LeftArc | TransitionKind::RightArc if linked => {
                Err("targets are already connected")
            }
            TransitionKind::LeftArc | TransitionKind::RightArc
                if self.policy.projective && self.structure.crosses_existing(left, right) =>
            {
                Err("arc would cross an existing arc")
            }
            TransitionKind::LeftArc | TransitionKind::RightArc => Ok(()),
            _ => Err("not a Covington transition"),
        }
    }

    fn perform(&mut self, transition: Transition, _mode: ParseMode) -> TransitionResult<()> {
        let (left, right) = (self.left, self.right);
        match transition.kind {
            TransitionKind::Shift => {
                self.advance_right();
                return Ok(());
            }
            TransitionKind::LeftArc => self.structure.add_edge(right, left, transition.label)?,
            TransitionKind::RightArc => self.structure.add_edge(left, right, transition.label)?,
            _ => {}
        }
        self.scan_left();
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.right > self.rightstop
    }

    fn deterministic_transition(&self) -> Option<Transition> {
        (!self.is_terminal() && !self.policy.allow_root && self.left == 0)
            .then(Transition::no_arc)
    }

    fn default_transition(&self, _root_label: i32) -> Transition {
        if self.policy.allow_shift {
            Transition::shift()
        } else {
            Transition::no_arc()
        }
    }

    fn address(&self, function: AddressFunction, index: usize) -> Option<usize> {
        if self.is_terminal() {
            return None;
        }
        match function {
            AddressFunction::Left => self
                .left
                .checked_sub(index)
                .filter(|&n| n >= self.leftstop || (index == 0 && n == self.left)),
            AddressFunction::Right => Some(self.right + index).filter(|&n| n <= self.rightstop),
            AddressFunction::LeftContext => self
                .right
                .checked_sub(index + 1)
                .filter(|&n| n > self.left),
            AddressFunction::RightContext => {
                Some(self.right + index + 1).filter(|&n| n <= self.rightstop)
            }
            _ => None,
        }
    }
}

/// Next transition towards `gold`
pub(crate) fn oracle(config: &CovingtonConfig, gold: &DependencyStructure) -> Transition {
    let (left, right) = (config.left, config.right);

    if left != 0 && gold.head(left) == Some(right) {
        return Transition::left_arc(gold.label(left));
    }
    if gold.head(right) == Some(left) {
        return Transition::right_arc(gold.label(right));
    }
    if config.policy.allow_shift {
        let pending_dependent = gold.leftmost_dependent(right).is_some_and(|d| d < left);
        let pending_head = gold
            .head(right)
            .is_some_and(|h| h < left && (h != 0 || config.leftstop == 0));
        if !pending_dependent && !pending_head {
            return Transition::shift();
        }
    }
    Transition::no_arc()
}
