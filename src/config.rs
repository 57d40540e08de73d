//! Configuration surface for the search engine and scheduler.
//!
//! Everything here is numeric or enumerable so a scheduler can read it from
//! plain configuration files; there is no dynamic code on this surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{DecisionError, Result};

/// Configuration for a decision search.
///
/// # Example
///
/// ```
/// use caravan_mcts::SearchConfig;
/// use std::time::Duration;
///
/// let config = SearchConfig::default()
///     .with_exploration_weight(1.4)
///     .with_max_iterations(5_000)
///     .with_max_time(Duration::from_millis(50));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Exploration weight for UCB1.
    ///
    /// 0 means pure exploitation; large values approach uniform exploration.
    pub exploration_weight: f64,

    /// Maximum number of search iterations per decision.
    pub max_iterations: usize,

    /// Wall-clock budget per decision.
    ///
    /// Checked at the start of every iteration, never mid-iteration, so each
    /// iteration completes atomically and the tree invariants hold. A search
    /// stopped by the deadline still returns the best action found so far.
    pub max_time: Option<Duration>,

    /// Rollout depth cap in plies.
    ///
    /// Bounds runaway simulations in state graphs that never terminate on
    /// their own.
    pub rollout_depth: usize,

    /// Reward substituted for a rollout that failed mid-simulation.
    ///
    /// A failed rollout contributes this value instead of discarding the
    /// whole search, so one bad branch cannot throw away all accumulated
    /// statistics.
    pub failed_rollout_reward: f64,

    /// Seed for the engine's random number generator.
    ///
    /// `None` seeds from OS entropy. Fix this to make expansion choices and
    /// rollouts reproducible in tests.
    pub seed: Option<u64>,

    /// Worker pool size for per-entity scheduling.
    ///
    /// Each entity's search is an independent computation over its own
    /// snapshot, so decisions parallelize without locking.
    pub parallelism: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            exploration_weight: 1.0,
            max_iterations: 10_000,
            max_time: None,
            rollout_depth: 1_000,
            failed_rollout_reward: 0.0,
            seed: None,
            parallelism: 4,
        }
    }
}

impl SearchConfig {
    /// Sets the exploration weight.
    pub fn with_exploration_weight(mut self, weight: f64) -> Self {
        self.exploration_weight = weight;
        self
    }

    /// Sets the maximum number of iterations.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_max_time(mut self, duration: Duration) -> Self {
        self.max_time = Some(duration);
        self
    }

    /// Sets the rollout depth cap.
    pub fn with_rollout_depth(mut self, plies: usize) -> Self {
        self.rollout_depth = plies;
        self
    }

    /// Sets the reward substituted for failed rollouts.
    pub fn with_failed_rollout_reward(mut self, reward: f64) -> Self {
        self.failed_rollout_reward = reward;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the worker pool size.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers;
        self
    }

    /// Checks every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err(DecisionError::InvalidConfiguration(format!(
                "exploration_weight must be finite and non-negative, got {}",
                self.exploration_weight
            )));
        }
        if self.max_iterations == 0 {
            return Err(DecisionError::InvalidConfiguration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.rollout_depth == 0 {
            return Err(DecisionError::InvalidConfiguration(
                "rollout_depth must be at least 1".to_string(),
            ));
        }
        if !self.failed_rollout_reward.is_finite() {
            return Err(DecisionError::InvalidConfiguration(format!(
                "failed_rollout_reward must be finite, got {}",
                self.failed_rollout_reward
            )));
        }
        if self.parallelism == 0 {
            return Err(DecisionError::InvalidConfiguration(
                "parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
