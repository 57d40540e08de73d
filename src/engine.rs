//! The search engine: selection, expansion, simulation, backpropagation.
//!
//! One [`SearchEngine`] serves exactly one decision. It owns a fresh tree
//! built from the initial state, runs iterations until the budget is
//! exhausted, reports the winning root action, and is then discarded along
//! with the tree. Nothing persists across ticks; the next decision starts
//! from a fresh snapshot.

use std::time::Instant;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    config::SearchConfig,
    policy::{RandomRollout, RolloutPolicy, SelectionPolicy, Ucb1},
    state::DecisionState,
    stats::{ActionStats, Decision, SearchStatistics},
    tree::{NodePath, SearchNode},
    Result,
};

/// Monte Carlo Tree Search over a [`DecisionState`].
///
/// Defaults: UCB1 selection with the configured exploration weight, uniform
/// random rollouts, and uniform random expansion over the untried actions.
/// Backpropagation is fixed: one visit and the simulated reward added to
/// every node on the path.
pub struct SearchEngine<S: DecisionState> {
    /// Root of the search tree.
    root: SearchNode<S>,

    /// Configuration for this search.
    config: SearchConfig,

    /// Statistics gathered during the search.
    statistics: SearchStatistics,

    /// Policy for descending through fully expanded nodes.
    selection: Box<dyn SelectionPolicy<S>>,

    /// Policy for simulating from newly expanded nodes.
    rollout: Box<dyn RolloutPolicy<S>>,

    /// All randomness (expansion picks, rollouts) flows through here.
    rng: StdRng,
}

impl<S: DecisionState + 'static> SearchEngine<S> {
    /// Creates an engine for one decision over `initial_state`.
    ///
    /// Fails with [`DecisionError::InvalidConfiguration`] when the
    /// configuration is out of range.
    ///
    /// [`DecisionError::InvalidConfiguration`]: crate::DecisionError::InvalidConfiguration
    pub fn new(initial_state: S, config: SearchConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let selection: Box<dyn SelectionPolicy<S>> =
            Box::new(Ucb1::new(config.exploration_weight));
        let rollout: Box<dyn RolloutPolicy<S>> = Box::new(RandomRollout::new());

        Ok(SearchEngine {
            root: SearchNode::new(initial_state, None, 0),
            config,
            statistics: SearchStatistics::new(),
            selection,
            rollout,
            rng,
        })
    }

    /// Replaces the selection policy.
    pub fn with_selection_policy<P: SelectionPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.selection = Box::new(policy);
        self
    }

    /// Replaces the rollout policy.
    pub fn with_rollout_policy<P: RolloutPolicy<S> + 'static>(mut self, policy: P) -> Self {
        self.rollout = Box::new(policy);
        self
    }

    /// Runs the search and returns the decision.
    ///
    /// Iterates until the iteration budget or the wall-clock budget runs
    /// out, whichever comes first. If the root state is terminal or has no
    /// legal actions the engine returns immediately with `action: None` and
    /// zero iterations consumed.
    pub fn search(&mut self) -> Result<Decision<S::Action>> {
        self.statistics = SearchStatistics::new();

        if self.root.state.is_terminal()
            || (self.root.untried.is_empty() && self.root.children.is_empty())
        {
            debug!("root state is terminal or has no legal actions; nothing to decide");
            return Ok(Decision {
                action: None,
                stats: self.statistics.clone(),
                root_actions: Vec::new(),
            });
        }

        let start = Instant::now();

        for i in 0..self.config.max_iterations {
            // Deadline is only checked between iterations so every
            // iteration completes atomically and visit counts stay
            // consistent with reward sums.
            if let Some(budget) = self.config.max_time {
                if start.elapsed() >= budget {
                    self.statistics.stopped_early = true;
                    debug!("search stopped on time budget after {} iterations", i);
                    break;
                }
            }

            self.run_iteration()?;
            self.statistics.iterations = i + 1;
        }

        self.statistics.total_time = start.elapsed();
        debug!("search finished: {}", self.statistics.summary());

        Ok(Decision {
            action: self.best_action(),
            stats: self.statistics.clone(),
            root_actions: self.root_action_stats(),
        })
    }

    /// Executes one select / expand / simulate / backpropagate cycle.
    fn run_iteration(&mut self) -> Result<()> {
        let selected = self.select();
        let (path, state) = self.expand(&selected)?;

        let reward = match self
            .rollout
            .rollout(&state, &mut self.rng, self.config.rollout_depth)
        {
            Ok(reward) if reward.is_finite() => reward,
            Ok(reward) => {
                warn!(
                    "rollout produced non-finite reward {reward}; substituting {}",
                    self.config.failed_rollout_reward
                );
                self.config.failed_rollout_reward
            }
            // A failed rollout only forfeits its own contribution; the
            // statistics accumulated so far stay intact.
            Err(err) => {
                warn!(
                    "rollout aborted ({err}); substituting {}",
                    self.config.failed_rollout_reward
                );
                self.config.failed_rollout_reward
            }
        };

        self.backpropagate(&path, reward);
        Ok(())
    }

    /// Selection phase: descend while fully expanded and non-terminal.
    fn select(&mut self) -> NodePath {
        let mut path = NodePath::new();
        let mut current = &self.root;
        let mut depth = 0;

        while !current.state.is_terminal()
            && current.is_fully_expanded()
            && !current.children.is_empty()
        {
            let index = self.selection.select_child(current);
            path.push(index);
            current = &current.children[index];
            depth += 1;

            self.statistics.max_depth = self.statistics.max_depth.max(depth);
        }

        path
    }

    /// Expansion phase: grow one child under the selected node.
    ///
    /// Returns the path to the node the simulation starts from, plus a clone
    /// of its state. No child is created when the selected node is terminal;
    /// the simulation then starts from the selected node itself.
    fn expand(&mut self, path: &NodePath) -> Result<(NodePath, S)> {
        let mut node = &mut self.root;
        for &index in &path.indices {
            node = &mut node.children[index];
        }

        if node.state.is_terminal() {
            return Ok((path.clone(), node.state.clone()));
        }

        match node.expand_random(&mut self.rng)? {
            Some(child_index) => {
                let mut expanded_path = path.clone();
                expanded_path.push(child_index);

                self.statistics.tree_size += 1;
                let child = &node.children[child_index];
                self.statistics.max_depth = self.statistics.max_depth.max(child.depth);

                Ok((expanded_path, child.state.clone()))
            }
            // Fully expanded but childless: no legal actions, treat as leaf.
            None => Ok((path.clone(), node.state.clone())),
        }
    }

    /// Backpropagation phase: record the reward on every node of the path,
    /// root included.
    fn backpropagate(&mut self, path: &NodePath, reward: f64) {
        self.root.record(reward);

        let mut node = &mut self.root;
        for &index in &path.indices {
            node = &mut node.children[index];
            node.record(reward);
        }
    }

    /// Robust-child result selection: most visits, ties broken by higher
    /// mean reward, then by discovery order.
    fn best_action(&self) -> Option<S::Action> {
        if self.root.children.is_empty() {
            // The deadline elapsed before any expansion happened. The first
            // untried action is the best answer available.
            return self.root.untried.first().cloned();
        }

        let mut best: Option<&SearchNode<S>> = None;
        for child in &self.root.children {
            let better = match best {
                None => true,
                Some(incumbent) => {
                    child.visits > incumbent.visits
                        || (child.visits == incumbent.visits
                            && child.value() > incumbent.value())
                }
            };
            if better {
                best = Some(child);
            }
        }

        best.and_then(|child| child.action.clone())
    }

    /// Per-root-child diagnostics in discovery order.
    fn root_action_stats(&self) -> Vec<ActionStats<S::Action>> {
        self.root
            .children
            .iter()
            .filter_map(|child| {
                child.action.clone().map(|action| ActionStats {
                    action,
                    visits: child.visits,
                    total_reward: child.total_reward,
                    mean_reward: child.value(),
                })
            })
            .collect()
    }

    /// The statistics gathered by the last search.
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Read access to the root, mainly for tests and diagnostics.
    pub fn root(&self) -> &SearchNode<S> {
        &self.root
    }
}
