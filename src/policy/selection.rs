//! Selection policies: balancing exploration and exploitation while
//! descending the tree.

use std::f64;

use crate::state::DecisionState;
use crate::tree::SearchNode;

/// Trait for policies that pick which child to descend into.
pub trait SelectionPolicy<S: DecisionState>: Send + Sync {
    /// Returns the index of the child to descend into.
    ///
    /// Only called on nodes with at least one child.
    fn select_child(&self, node: &SearchNode<S>) -> usize;

    /// Creates a boxed clone of this policy.
    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>>;
}

/// Upper Confidence Bound 1 (UCB1) selection.
///
/// ```text
/// score = mean_reward + weight * sqrt(ln(parent_visits) / child_visits)
/// ```
///
/// Unvisited children score infinity and are always selected first when
/// present. A weight of 0 gives pure exploitation; large weights approach
/// uniform exploration.
#[derive(Debug, Clone)]
pub struct Ucb1 {
    /// Exploration weight.
    pub exploration_weight: f64,
}

impl Ucb1 {
    /// Creates a UCB1 policy with the given exploration weight.
    pub fn new(exploration_weight: f64) -> Self {
        Ucb1 { exploration_weight }
    }

    /// The UCB1 score for a child.
    pub fn score(&self, mean_reward: f64, child_visits: u64, parent_visits: u64) -> f64 {
        if child_visits == 0 {
            return f64::INFINITY;
        }
        if parent_visits == 0 {
            return mean_reward;
        }

        let exploration = self.exploration_weight
            * ((parent_visits as f64).ln() / child_visits as f64).sqrt();

        mean_reward + exploration
    }
}

impl<S: DecisionState> SelectionPolicy<S> for Ucb1 {
    fn select_child(&self, node: &SearchNode<S>) -> usize {
        let parent_visits = node.visits;
        let mut best_score = f64::NEG_INFINITY;
        let mut best_index = 0;

        for (i, child) in node.children.iter().enumerate() {
            let score = self.score(child.value(), child.visits, parent_visits);
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        best_index
    }

    fn clone_box(&self) -> Box<dyn SelectionPolicy<S>> {
        Box::new(self.clone())
    }
}
