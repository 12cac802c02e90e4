//! Tokens of one sentence plus the labeled arcs built over them

use super::error::{GraphError, GraphResult};
use super::token::{Token, TokenPool};

/// A labeled arc, head to dependent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub head: usize,
    pub dependent: usize,
    pub label: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeadLink {
    head: usize,
    label: Option<i32>,
}

/// Sentence graph; node 0 is the artificial root, tokens are `1..=n`
///
/// Each non-root token has at most one head at any time.
#[derive(Debug, Clone)]
pub struct DependencyStructure {
    tokens: Vec<Token>,
    heads: Vec<Option<HeadLink>>,
}

impl DependencyStructure {
    /// Root plus `n` fresh tokens
    pub fn new(n: usize) -> Self {
        Self {
            tokens: (0..=n).map(Token::new).collect(),
            heads: vec![None; n + 1],
        }
    }

    pub fn from_pool(pool: &mut TokenPool, n: usize) -> Self {
        Self {
            tokens: (0..=n).map(|i| pool.take(i)).collect(),
            heads: vec![None; n + 1],
        }
    }

    /// Return every token to the pool
    pub fn release(self, pool: &mut TokenPool) {
        for token in self.tokens {
            pool.give_back(token);
        }
    }

    /// Number of tokens, not counting the root
    pub fn n_tokens(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn contains(&self, node: usize) -> bool {
        node < self.tokens.len()
    }

    fn check(&self, node: usize) -> GraphResult<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(GraphError::invalid_node(node, self.n_tokens()))
        }
    }

    pub fn token(&self, node: usize) -> Option<&Token> {
        self.tokens.get(node)
    }

    pub fn token_mut(&mut self, node: usize) -> Option<&mut Token> {
        self.tokens.get_mut(node)
    }

    pub fn column(&self, node: usize, name: &str) -> Option<i32> {
        self.tokens.get(node).and_then(|t| t.column(name))
    }

    pub fn set_column(&mut self, node: usize, name: &str, code: i32) -> GraphResult<()> {
        self.check(node)?;
        self.tokens[node].set_column(name, code);
        Ok(())
    }

    /// Previous token in sentence order; the root has no neighbours
    pub fn predecessor(&self, node: usize) -> Option<usize> {
        (node > 1 && self.contains(node)).then(|| node - 1)
    }

    pub fn successor(&self, node: usize) -> Option<usize> {
        (node > 0 && node < self.n_tokens()).then(|| node + 1)
    }

    // ========================================================================
    // ARCS
    // ========================================================================

    pub fn add_edge(&mut self, head: usize, dependent: usize, label: Option<i32>) -> GraphResult<()> {
        self.check(head)?;
        self.check(dependent)?;
        if dependent == 0 {
            return Err(GraphError::RootAsDependent { head });
        }
        if let Some(existing) = self.heads[dependent] {
            return Err(GraphError::MultipleHeads {
                dependent,
                existing_head: existing.head,
                new_head: head,
            });
        }
        self.heads[dependent] = Some(HeadLink { head, label });
        Ok(())
    }

    pub fn set_label(&mut self, dependent: usize, label: i32) -> GraphResult<()> {
        self.check(dependent)?;
        match self.heads[dependent].as_mut() {
            Some(link) => {
                link.label = Some(label);
                Ok(())
            }
            None => Err(GraphError::invalid_node(dependent, self.n_tokens())),
        }
    }

    pub fn clear_edges(&mut self) {
        self.heads.iter_mut().for_each(|h| *h = None);
    }

    pub fn head(&self, node: usize) -> Option<usize> {
        self.heads.get(node).copied().flatten().map(|l| l.head)
    }

    pub fn label(&self, node: usize) -> Option<i32> {
        self.heads.get(node).copied().flatten().and_then(|l| l.label)
    }

    pub fn has_head(&self, node: usize) -> bool {
        self.head(node).is_some()
    }

    pub fn has_edge(&self, head: usize, dependent: usize) -> bool {
        self.head(dependent) == Some(head)
    }

    /// Dependents of `node` in sentence order
    pub fn dependents(&self, node: usize) -> Vec<usize> {
        (1..self.tokens.len())
            .filter(|&d| self.head(d) == Some(node))
            .collect()
    }

    pub fn left_dependents(&self, node: usize) -> Vec<usize> {
        self.dependents(node).into_iter().filter(|&d| d < node).collect()
    }

    pub fn right_dependents(&self, node: usize) -> Vec<usize> {
        self.dependents(node).into_iter().filter(|&d| d > node).collect()
    }

    pub fn leftmost_dependent(&self, node: usize) -> Option<usize> {
        self.dependents(node).first().copied()
    }

    pub fn rightmost_dependent(&self, node: usize) -> Option<usize> {
        self.dependents(node).last().copied()
    }

    /// Follow heads upwards to the top of `node`'s tree
    pub fn component_root(&self, node: usize) -> usize {
        let mut current = node;
        for _ in 0..self.tokens.len() {
            match self.head(current) {
                Some(head) => current = head,
                None => break,
            }
        }
        current
    }

    /// True when `ancestor` dominates `node` (reflexively)
    pub fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = node;
        for _ in 0..self.tokens.len() {
            if current == ancestor {
                return true;
            }
            match self.head(current) {
                Some(head) => current = head,
                None => return false,
            }
        }
        false
    }

    /// Whether the spans `{a,b}` and `{c,d}` cross
    pub fn crosses(a: usize, b: usize, c: usize, d: usize) -> bool {
        let (l1, r1) = (a.min(b), a.max(b));
        let (l2, r2) = (c.min(d), c.max(d));
        (l1 < l2 && l2 < r1 && r1 < r2) || (l2 < l1 && l1 < r2 && r2 < r1)
    }

    /// Whether an arc between `a` and `b` would cross an existing arc
    pub fn crosses_existing(&self, a: usize, b: usize) -> bool {
        self.edges()
            .iter()
            .any(|e| Self::crosses(a, b, e.head, e.dependent))
    }

    /// Every arc's head dominates all nodes strictly inside the arc
    pub fn is_projective(&self) -> bool {
        self.edges().iter().all(|e| {
            let (l, r) = (e.head.min(e.dependent), e.head.max(e.dependent));
            (l + 1..r).all(|k| self.is_ancestor(e.head, k))
        })
    }

    /// Arcs ordered by dependent
    pub fn edges(&self) -> Vec<Edge> {
        self.heads
            .iter()
            .enumerate()
            .filter_map(|(dependent, link)| {
                link.map(|l| Edge {
                    head: l.head,
                    dependent,
                    label: l.label,
                })
            })
            .collect()
    }

    pub fn n_edges(&self) -> usize {
        self.heads.iter().filter(|h| h.is_some()).count()
    }

    /// Attach every headless token to the root
    pub fn link_all_trees_to_root(&mut self, label: Option<i32>) {
        for link in self.heads.iter_mut().skip(1) {
            if link.is_none() {
                *link = Some(HeadLink { head: 0, label });
            }
        }
    }
}

impl PartialEq for DependencyStructure {
    fn eq(&self, other: &Self) -> bool {
        self.heads == other.heads
    }
}

impl Eq for DependencyStructure {}
