//! Pluggable policies for the search phases.
//!
//! - Selection policies: which child to descend into during selection
//! - Rollout policies: how to play out a simulation from a fresh node
//!
//! Expansion and backpropagation are fixed by the engine: expansion picks a
//! uniformly random untried action, backpropagation adds the simulated
//! reward along the whole path.

pub mod rollout;
pub mod selection;

pub use rollout::{RandomRollout, RolloutPolicy, WeightedRollout};
pub use selection::{SelectionPolicy, Ucb1};
