//! Tree data structures for the search.
//!
//! The tree is owned top-down: every node owns its children in a `Vec`, and
//! the whole tree is dropped when the root goes out of scope at the end of a
//! decision call. Backpropagation retraces its steps with a [`NodePath`] of
//! child indices instead of parent pointers, which keeps ownership simple
//! and the borrow checker happy.

use std::fmt;

use rand::prelude::IteratorRandom;
use rand::RngCore;

use crate::state::DecisionState;
use crate::Result;

/// A node in the search tree.
///
/// Owns exactly one state, the action that led to it from its parent (`None`
/// at the root), visit and reward tallies, and the children discovered so
/// far. Children are unique by action: actions move from `untried` into
/// `children` exactly once.
///
/// Counters are plain fields. Each tree is exclusively owned by a single
/// search call, so there is nothing to synchronize.
pub struct SearchNode<S: DecisionState> {
    /// The state at this node.
    pub state: S,

    /// The action that led to this state (`None` for the root).
    pub action: Option<S::Action>,

    /// Number of completed iterations that passed through this node.
    pub visits: u64,

    /// Sum of simulated rewards backpropagated through this node.
    pub total_reward: f64,

    /// Children reachable from this node, in discovery order.
    pub children: Vec<SearchNode<S>>,

    /// Legal actions not yet expanded into children.
    pub untried: Vec<S::Action>,

    /// Depth of this node (root = 0).
    pub depth: usize,
}

impl<S: DecisionState> SearchNode<S> {
    /// Creates a node for `state`, reached via `action`.
    pub fn new(state: S, action: Option<S::Action>, depth: usize) -> Self {
        let untried = if state.is_terminal() {
            Vec::new()
        } else {
            state.legal_actions()
        };

        SearchNode {
            state,
            action,
            visits: 0,
            total_reward: 0.0,
            children: Vec::new(),
            untried,
            depth,
        }
    }

    /// Mean reward of this node, 0.0 when unvisited.
    pub fn value(&self) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        self.total_reward / self.visits as f64
    }

    /// Records one backpropagated simulation result.
    pub fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.total_reward += reward;
    }

    /// True when every legal action has a corresponding child.
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    /// True when this node has no children yet.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Expands the untried action at `action_index` into a new child.
    ///
    /// The action is removed from the untried list with `swap_remove`, which
    /// reorders the remainder; expansion order is randomized by the caller
    /// anyway. Returns the index of the new child.
    pub fn expand(&mut self, action_index: usize) -> Result<usize> {
        debug_assert!(action_index < self.untried.len());

        let action = self.untried.swap_remove(action_index);
        let next_state = self.state.apply(&action)?;

        let child = SearchNode::new(next_state, Some(action), self.depth + 1);
        self.children.push(child);
        Ok(self.children.len() - 1)
    }

    /// Expands a uniformly random untried action.
    ///
    /// Returns `None` when the node is already fully expanded.
    pub fn expand_random(&mut self, rng: &mut dyn RngCore) -> Result<Option<usize>> {
        if self.untried.is_empty() {
            return Ok(None);
        }

        let index = (0..self.untried.len()).choose(rng).unwrap_or(0);

        self.expand(index).map(Some)
    }
}

/// A path through the tree: child indices to follow from the root.
#[derive(Debug, Clone, Default)]
pub struct NodePath {
    /// Indices of children to follow from the root.
    pub indices: Vec<usize>,
}

impl NodePath {
    /// Creates an empty path (pointing at the root).
    pub fn new() -> Self {
        NodePath {
            indices: Vec::new(),
        }
    }

    /// Extends the path with a child index.
    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
    }

    /// Returns the length of the path.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the path points at the root.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path[")?;
        for (i, idx) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", idx)?;
        }
        write!(f, "]")
    }
}
