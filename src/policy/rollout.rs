//! Rollout policies: estimating a node's value by playing the state forward
//! to a terminal state.
//!
//! Rollouts are pure in-memory simulation over the snapshot captured at the
//! start of the decision; they never perform I/O.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::state::DecisionState;
use crate::Result;

/// Trait for policies that simulate from a state to estimate its value.
pub trait RolloutPolicy<S: DecisionState>: Send + Sync {
    /// Plays out from `state` and returns the final reward.
    ///
    /// The policy must stop after `depth_cap` plies even if no terminal
    /// state was reached, and report the reward of wherever it ended up.
    /// All randomness flows through `rng` so a seeded engine is fully
    /// reproducible.
    fn rollout(&self, state: &S, rng: &mut dyn RngCore, depth_cap: usize) -> Result<f64>;

    /// Creates a boxed clone of this policy.
    fn clone_box(&self) -> Box<dyn RolloutPolicy<S>>;
}

/// Uniform random rollout, the default.
#[derive(Debug, Clone, Default)]
pub struct RandomRollout;

impl RandomRollout {
    /// Creates a uniform random rollout policy.
    pub fn new() -> Self {
        RandomRollout
    }
}

impl<S: DecisionState> RolloutPolicy<S> for RandomRollout {
    fn rollout(&self, state: &S, rng: &mut dyn RngCore, depth_cap: usize) -> Result<f64> {
        let mut current = state.clone();

        for _ in 0..depth_cap {
            if current.is_terminal() {
                break;
            }

            let actions = current.legal_actions();
            let Some(action) = actions.choose(rng) else {
                break;
            };

            current = current.apply(action)?;
        }

        Ok(current.reward())
    }

    fn clone_box(&self) -> Box<dyn RolloutPolicy<S>> {
        Box::new(self.clone())
    }
}

/// Preference-weighted rollout.
///
/// Samples each rollout action proportionally to
/// [`DecisionState::action_weight`], so simulations spend more time on the
/// lines the entity would plausibly take. Falls back to a uniform pick when
/// the weights are degenerate (all zero, or non-finite).
#[derive(Debug, Clone, Default)]
pub struct WeightedRollout;

impl WeightedRollout {
    /// Creates a preference-weighted rollout policy.
    pub fn new() -> Self {
        WeightedRollout
    }
}

impl<S: DecisionState> RolloutPolicy<S> for WeightedRollout {
    fn rollout(&self, state: &S, rng: &mut dyn RngCore, depth_cap: usize) -> Result<f64> {
        let mut current = state.clone();

        for _ in 0..depth_cap {
            if current.is_terminal() {
                break;
            }

            let actions = current.legal_actions();
            if actions.is_empty() {
                break;
            }

            let picked = match actions.choose_weighted(rng, |a| {
                let w = current.action_weight(a);
                if w.is_finite() && w > 0.0 {
                    w
                } else {
                    0.0
                }
            }) {
                Ok(action) => action.clone(),
                // Degenerate weights; a uniform pick keeps the rollout alive.
                Err(_) => match actions.choose(rng) {
                    Some(action) => action.clone(),
                    None => break,
                },
            };

            current = current.apply(&picked)?;
        }

        Ok(current.reward())
    }

    fn clone_box(&self) -> Box<dyn RolloutPolicy<S>> {
        Box::new(self.clone())
    }
}
