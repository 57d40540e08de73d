//! # caravan-mcts
//!
//! A Monte Carlo Tree Search (MCTS) decision engine for persistent-world game
//! entities.
//!
//! Non-player entities in a persistent world (traders, settlements, factions)
//! must choose an action every simulation tick. This crate provides the
//! generic search core that makes those choices: an entity-agnostic MCTS
//! implementation over a pluggable state abstraction, plus the adapter layer
//! that connects the search to external snapshot and persistence
//! collaborators.
//!
//! ## Features
//!
//! - Generic [`DecisionState`] contract any entity type can implement
//! - UCB1 selection with configurable exploration weight
//! - Pluggable rollout policies (uniform random by default, preference
//!   weighted as an alternative)
//! - Iteration and wall-clock budgets, checked between iterations so the
//!   tree is never left in a half-updated state
//! - Robust-child result selection with per-action diagnostic statistics
//! - A [`coordinator::TickRunner`] that decides many entities per tick on a
//!   bounded worker pool
//!
//! ## Basic usage
//!
//! ```
//! use caravan_mcts::{Action, DecisionState, Result, SearchConfig, SearchEngine};
//!
//! // A toy decision problem: count down to zero in steps of one or two.
//! #[derive(Clone, Debug, PartialEq)]
//! struct Step(u8);
//!
//! impl Action for Step {}
//!
//! #[derive(Clone)]
//! struct Countdown {
//!     left: u8,
//! }
//!
//! impl DecisionState for Countdown {
//!     type Action = Step;
//!
//!     fn legal_actions(&self) -> Vec<Step> {
//!         if self.left == 0 {
//!             vec![]
//!         } else {
//!             vec![Step(1), Step(2)]
//!         }
//!     }
//!
//!     fn apply(&self, action: &Step) -> Result<Self> {
//!         if !self.legal_actions().contains(action) {
//!             return Err(caravan_mcts::DecisionError::InvalidAction(format!(
//!                 "{action:?}"
//!             )));
//!         }
//!         Ok(Countdown {
//!             left: self.left.saturating_sub(action.0),
//!         })
//!     }
//!
//!     fn is_terminal(&self) -> bool {
//!         self.left == 0
//!     }
//!
//!     fn reward(&self) -> f64 {
//!         1.0
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let config = SearchConfig::default()
//!         .with_max_iterations(200)
//!         .with_seed(7);
//!
//!     let mut engine = SearchEngine::new(Countdown { left: 4 }, config)?;
//!     let decision = engine.search()?;
//!
//!     assert!(decision.action.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## How a decision is made
//!
//! Each call builds a fresh tree from an immutable snapshot of the world and
//! repeats four phases until the budget runs out:
//!
//! 1. **Selection**: descend from the root through fully expanded nodes,
//!    picking children by UCB1.
//! 2. **Expansion**: apply one untried action, creating a new child node.
//! 3. **Simulation**: play the rollout policy from the new state until a
//!    terminal state or the depth cap.
//! 4. **Backpropagation**: add the simulated reward to every node on the
//!    path back to the root.
//!
//! The most-visited root child becomes the decision. The tree is discarded
//! afterwards; the next tick starts from a fresh snapshot.

pub mod config;
pub mod coordinator;
pub mod engine;
pub mod policy;
pub mod snapshot;
pub mod state;
pub mod states;
pub mod stats;
pub mod tree;

pub use config::SearchConfig;
pub use coordinator::{
    CommitSink, DecisionCoordinator, DecisionRecord, SnapshotProvider, StateBuilder, TickOutcome,
    TickRunner,
};
pub use engine::SearchEngine;
pub use policy::{RandomRollout, RolloutPolicy, SelectionPolicy, Ucb1, WeightedRollout};
pub use snapshot::{EntityId, EntityKind, WorldSnapshot};
pub use state::{Action, DecisionState};
pub use stats::{ActionStats, Decision, SearchStatistics};
pub use tree::{NodePath, SearchNode};

/// Error taxonomy for the decision engine.
///
/// A root with no legal actions is deliberately absent here: it is a valid
/// no-op outcome, reported as a [`Decision`] with `action: None`.
#[derive(thiserror::Error, Debug)]
pub enum DecisionError {
    /// An action outside the current state's legal set was applied.
    ///
    /// This indicates a programming error in an entity state implementation
    /// or its adapter; the search that hit it is aborted, not retried.
    #[error("action is not legal in this state: {0}")]
    InvalidAction(String),

    /// Upstream snapshot data is insufficient to build a decision state.
    ///
    /// The entity's tick is skipped and retried next scheduling cycle; the
    /// builder never fabricates defaults that could desync from persisted
    /// state.
    #[error("snapshot for entity {entity} is missing required field `{field}`")]
    SnapshotIncomplete {
        /// Entity whose snapshot was rejected.
        entity: EntityId,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The external persistence collaborator rejected the chosen action.
    ///
    /// The decision is discarded without partial world mutation and the
    /// entity is retried next tick from a fresh snapshot.
    #[error("commit rejected for entity {entity}: {reason}")]
    CommitFailed {
        /// Entity whose decision failed to commit.
        entity: EntityId,
        /// Collaborator-supplied rejection reason.
        reason: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for decision engine operations.
pub type Result<T> = std::result::Result<T, DecisionError>;
