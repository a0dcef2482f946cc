//! Walk up a category's ancestor chain.
//!
//! The walk is a small state machine so the same termination rules apply
//! whether parents are looked up through an async repository, inside a
//! database transaction, or in memory. Callers drive it with
//! [`AncestorWalk::next_step`] and feed each looked-up parent back through
//! [`AncestorWalk::record_parent`].

use std::collections::HashSet;

use crate::domain::CategoryId;

/// Result of walking an ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The chain reached a root without meeting the target.
    Clear,
    /// The target appears in the chain.
    Circular,
    /// The chain loops without passing through the target.
    Corrupted {
        /// First node seen twice.
        at: CategoryId,
    },
}

impl WalkOutcome {
    /// Whether accepting the parent would be unsafe.
    ///
    /// Corrupted chains count as circular.
    pub fn is_circular(self) -> bool {
        !matches!(self, Self::Clear)
    }
}

/// Next action requested by the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStep {
    /// Look up the parent of this node and call `record_parent`.
    Visit(CategoryId),
    /// The walk has finished.
    Done(WalkOutcome),
}

/// Ancestor walk looking for `target`, starting at `start`.
///
/// Each node is visited at most once, so the walk ends after at most one
/// step per category.
///
/// # Examples
/// ```
/// use content_backend::domain::{AncestorWalk, CategoryId, WalkOutcome};
///
/// // 2 -> 1 -> root
/// let parent_of = |id: CategoryId| (id.get() == 2).then(|| CategoryId::new(1));
/// let outcome =
///     AncestorWalk::new(CategoryId::new(1), Some(CategoryId::new(2))).run_with(parent_of);
/// assert_eq!(outcome, WalkOutcome::Circular);
/// ```
#[derive(Debug, Clone)]
pub struct AncestorWalk {
    target: CategoryId,
    next: Option<CategoryId>,
    visited: HashSet<CategoryId>,
    path: Vec<CategoryId>,
}

impl AncestorWalk {
    /// Start a walk at `start` (the candidate parent) looking for `target`.
    pub fn new(target: CategoryId, start: Option<CategoryId>) -> Self {
        Self {
            target,
            next: start,
            visited: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Decide the next action.
    pub fn next_step(&mut self) -> WalkStep {
        let Some(current) = self.next else {
            return WalkStep::Done(WalkOutcome::Clear);
        };
        if current == self.target {
            return WalkStep::Done(WalkOutcome::Circular);
        }
        if !self.visited.insert(current) {
            return WalkStep::Done(WalkOutcome::Corrupted { at: current });
        }
        self.path.push(current);
        WalkStep::Visit(current)
    }

    /// Record the parent of the node last returned by `next_step`.
    ///
    /// A node that no longer exists ends the chain; record `None` for it.
    pub fn record_parent(&mut self, parent: Option<CategoryId>) {
        self.next = parent;
    }

    /// Nodes visited so far, nearest first.
    pub fn path(&self) -> &[CategoryId] {
        &self.path
    }

    /// Consume the walk, returning the visited nodes nearest first.
    pub fn into_path(self) -> Vec<CategoryId> {
        self.path
    }

    /// Drive the walk to completion with a synchronous parent lookup.
    pub fn run_with<F>(mut self, mut parent_of: F) -> WalkOutcome
    where
        F: FnMut(CategoryId) -> Option<CategoryId>,
    {
        loop {
            match self.next_step() {
                WalkStep::Visit(current) => self.record_parent(parent_of(current)),
                WalkStep::Done(outcome) => return outcome,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use rstest::rstest;

    fn id(raw: i64) -> CategoryId {
        CategoryId::new(raw)
    }

    fn lookup(edges: &[(i64, i64)]) -> impl FnMut(CategoryId) -> Option<CategoryId> {
        let map: HashMap<CategoryId, CategoryId> =
            edges.iter().map(|&(child, parent)| (id(child), id(parent))).collect();
        move |node| map.get(&node).copied()
    }

    #[rstest]
    fn null_start_is_clear() {
        let outcome = AncestorWalk::new(id(1), None).run_with(lookup(&[]));
        assert_eq!(outcome, WalkOutcome::Clear);
    }

    #[rstest]
    fn start_equal_to_target_is_circular() {
        let outcome = AncestorWalk::new(id(1), Some(id(1))).run_with(lookup(&[]));
        assert_eq!(outcome, WalkOutcome::Circular);
    }

    #[rstest]
    fn finds_target_further_up() {
        let outcome =
            AncestorWalk::new(id(1), Some(id(4))).run_with(lookup(&[(4, 3), (3, 2), (2, 1)]));
        assert_eq!(outcome, WalkOutcome::Circular);
    }

    #[rstest]
    fn unrelated_chain_is_clear() {
        let outcome =
            AncestorWalk::new(id(9), Some(id(4))).run_with(lookup(&[(4, 3), (3, 2), (2, 1)]));
        assert_eq!(outcome, WalkOutcome::Clear);
    }

    #[rstest]
    fn existing_loop_terminates_as_corrupted() {
        let outcome = AncestorWalk::new(id(9), Some(id(2))).run_with(lookup(&[(2, 3), (3, 2)]));
        assert_eq!(outcome, WalkOutcome::Corrupted { at: id(2) });
        assert!(outcome.is_circular());
    }

    #[rstest]
    #[case(1, WalkOutcome::Circular)]
    #[case(5_000, WalkOutcome::Clear)]
    fn long_chains_are_walked_to_the_root(#[case] target: i64, #[case] expected: WalkOutcome) {
        let edges: Vec<(i64, i64)> = (2..=4_000).map(|n| (n, n - 1)).collect();
        let outcome = AncestorWalk::new(id(target), Some(id(4_000))).run_with(lookup(&edges));
        assert_eq!(outcome, expected);
    }

    #[rstest]
    fn path_lists_nearest_ancestor_first() {
        let mut walk = AncestorWalk::new(id(10), Some(id(3)));
        let mut parent_of = lookup(&[(3, 2), (2, 1)]);
        loop {
            match walk.next_step() {
                WalkStep::Visit(node) => walk.record_parent(parent_of(node)),
                WalkStep::Done(outcome) => {
                    assert_eq!(outcome, WalkOutcome::Clear);
                    break;
                }
            }
        }
        assert_eq!(walk.into_path(), vec![id(3), id(2), id(1)]);
    }
}
