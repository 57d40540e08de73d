//! Statistics and result types for decision searches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::state::Action;

/// Statistics collected during a single search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Number of completed iterations.
    pub iterations: usize,

    /// Total wall-clock time spent searching.
    pub total_time: Duration,

    /// Total number of nodes in the tree, root included.
    pub tree_size: usize,

    /// Maximum depth reached in the tree.
    pub max_depth: usize,

    /// Whether the search stopped early on its wall-clock budget.
    pub stopped_early: bool,
}

impl SearchStatistics {
    /// Creates statistics for a fresh search (a tree of just the root).
    pub fn new() -> Self {
        SearchStatistics {
            iterations: 0,
            total_time: Duration::from_secs(0),
            tree_size: 1,
            max_depth: 0,
            stopped_early: false,
        }
    }

    /// Average time per iteration in microseconds.
    pub fn avg_time_per_iteration_us(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_time.as_micros() as f64 / self.iterations as f64
    }

    /// Iterations per second.
    pub fn iterations_per_second(&self) -> f64 {
        if self.total_time.as_secs_f64() <= 0.0 {
            return 0.0;
        }
        self.iterations as f64 / self.total_time.as_secs_f64()
    }

    /// One-line summary, suitable for a log message.
    pub fn summary(&self) -> String {
        format!(
            "{} iterations in {:.3}s ({:.1} iter/s), {} nodes, max depth {}{}",
            self.iterations,
            self.total_time.as_secs_f64(),
            self.iterations_per_second(),
            self.tree_size,
            self.max_depth,
            if self.stopped_early {
                ", stopped early"
            } else {
                ""
            }
        )
    }
}

/// Diagnostic statistics for one root-level action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionStats<A: Action> {
    /// The root child's action.
    pub action: A,

    /// Visit count accumulated by the child.
    pub visits: u64,

    /// Sum of rewards backpropagated through the child.
    pub total_reward: f64,

    /// Mean reward, 0.0 when unvisited.
    pub mean_reward: f64,
}

/// The outcome of one decision search.
///
/// `action: None` is the valid "nothing to decide" outcome: the root state
/// was terminal or had no legal actions. Callers treat it as "this entity
/// has no decision to make this tick".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision<A: Action> {
    /// The winning action, chosen by the robust-child policy.
    pub action: Option<A>,

    /// Search-level statistics.
    pub stats: SearchStatistics,

    /// Per-root-child statistics, in discovery order.
    pub root_actions: Vec<ActionStats<A>>,
}
