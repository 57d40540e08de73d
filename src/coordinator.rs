//! Adapter layer between the search core and the outside world.
//!
//! The core consumes two narrow contracts: a [`SnapshotProvider`] that
//! yields read-only world/entity data, and a [`CommitSink`] that durably
//! applies a chosen action. Implementations of both live outside this crate
//! (a relational store, an HTTP service, a test fake); the search core has
//! zero awareness of their concurrency control.
//!
//! [`DecisionCoordinator::decide`] is the sole public entry point a
//! scheduler calls per entity per tick, and [`TickRunner`] fans those calls
//! across a bounded worker pool. Each decision is a pure computation over
//! its own snapshot, so decisions parallelize without locking.

use std::time::SystemTime;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::SearchConfig,
    engine::SearchEngine,
    snapshot::{EntityId, WorldSnapshot},
    state::{Action, DecisionState},
    stats::{ActionStats, SearchStatistics},
    DecisionError, Result,
};

/// External collaborator producing read-only snapshots.
pub trait SnapshotProvider: Send + Sync {
    /// Returns a timestamped, internally consistent view of `entity` and
    /// the world facts relevant to its decisions.
    ///
    /// The view may be stale relative to concurrent commits; the next tick
    /// re-snapshots.
    fn snapshot(&self, entity: &EntityId) -> Result<WorldSnapshot>;
}

/// Per-entity-type adapter building a decision state from a snapshot.
pub trait StateBuilder: Send + Sync {
    /// The decision state this builder produces.
    type State: DecisionState + 'static;

    /// Builds the initial search state.
    ///
    /// Fails with [`DecisionError::SnapshotIncomplete`] when a required
    /// field is missing, rather than fabricating a default that could
    /// desync from persisted state.
    fn build(&self, snapshot: &WorldSnapshot) -> Result<Self::State>;
}

/// External collaborator durably applying a chosen action.
pub trait CommitSink<A: Action>: Send + Sync {
    /// Commits the action's real-world effect for `entity`.
    ///
    /// On failure the decision is discarded and the entity retried next
    /// tick from a fresh snapshot; the coordinator never retries
    /// synchronously.
    fn commit(&self, entity: &EntityId, action: &A) -> Result<()>;
}

/// The action type a [`StateBuilder`]'s state decides over.
pub type BuiltAction<B> = <<B as StateBuilder>::State as DecisionState>::Action;

/// One committed (or no-op) decision, with diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord<A: Action> {
    /// The entity this decision is for.
    pub entity_id: EntityId,
    /// When the decision was made.
    pub decided_at: SystemTime,
    /// The committed action; `None` when the entity had nothing to decide.
    pub action: Option<A>,
    /// Search-level statistics.
    pub stats: SearchStatistics,
    /// Per-root-action statistics, for observability tooling.
    pub root_actions: Vec<ActionStats<A>>,
}

/// Runs one entity's decision per tick: snapshot, search, commit.
pub struct DecisionCoordinator<P, B, C>
where
    P: SnapshotProvider,
    B: StateBuilder,
    C: CommitSink<BuiltAction<B>>,
{
    provider: P,
    builder: B,
    sink: C,
    config: SearchConfig,
}

impl<P, B, C> DecisionCoordinator<P, B, C>
where
    P: SnapshotProvider,
    B: StateBuilder,
    C: CommitSink<BuiltAction<B>>,
{
    /// Creates a coordinator.
    ///
    /// Fails when `config` is out of range.
    pub fn new(provider: P, builder: B, sink: C, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(DecisionCoordinator {
            provider,
            builder,
            sink,
            config,
        })
    }

    /// Decides one entity for this tick.
    ///
    /// Pulls a snapshot, builds the initial state, runs a fresh search, and
    /// commits the winning action. A terminal or action-less root skips the
    /// commit and records `action: None`. Any error aborts this entity's
    /// tick only; other entities are unaffected.
    pub fn decide(&self, entity: &EntityId) -> Result<DecisionRecord<BuiltAction<B>>> {
        let snapshot: WorldSnapshot = self.provider.snapshot(entity)?;
        let state = self.builder.build(&snapshot)?;

        let mut engine = SearchEngine::new(state, self.config.clone())?;
        let decision = engine.search()?;

        match &decision.action {
            Some(action) => {
                debug!(
                    "entity {entity}: chose {action:?} ({})",
                    decision.stats.summary()
                );
                self.sink.commit(entity, action)?;
            }
            None => {
                debug!("entity {entity}: no decision to make this tick");
            }
        }

        Ok(DecisionRecord {
            entity_id: entity.clone(),
            decided_at: SystemTime::now(),
            action: decision.action,
            stats: decision.stats,
            root_actions: decision.root_actions,
        })
    }

    /// The search configuration in force.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

/// Outcome of one entity's tick.
#[derive(Debug)]
pub struct TickOutcome<A: Action> {
    /// The entity that was decided.
    pub entity_id: EntityId,
    /// The decision record, or the error that skipped this tick.
    pub result: Result<DecisionRecord<A>>,
}

/// Fans per-entity decisions across a bounded worker pool.
///
/// Every entity's search owns its tree exclusively and reads only its own
/// snapshot, so the only shared state is behind the snapshot/commit
/// collaborators, which handle their own concurrency control.
pub struct TickRunner<P, B, C>
where
    P: SnapshotProvider,
    B: StateBuilder,
    C: CommitSink<BuiltAction<B>>,
{
    coordinator: DecisionCoordinator<P, B, C>,
    pool: rayon::ThreadPool,
}

impl<P, B, C> TickRunner<P, B, C>
where
    P: SnapshotProvider,
    B: StateBuilder,
    C: CommitSink<BuiltAction<B>>,
{
    /// Creates a runner with a pool sized by the configured parallelism.
    pub fn new(coordinator: DecisionCoordinator<P, B, C>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(coordinator.config.parallelism)
            .build()
            .map_err(|e| DecisionError::InvalidConfiguration(e.to_string()))?;

        Ok(TickRunner { coordinator, pool })
    }

    /// Decides every entity in `entities` for this tick.
    ///
    /// Decisions run independently; one entity's failure is logged and
    /// reported in its outcome without affecting the others.
    pub fn run_tick(&self, entities: &[EntityId]) -> Vec<TickOutcome<BuiltAction<B>>> {
        self.pool.install(|| {
            entities
                .par_iter()
                .map(|entity| {
                    let result = self.coordinator.decide(entity);
                    if let Err(err) = &result {
                        warn!("tick skipped for entity {entity}: {err}");
                    }
                    TickOutcome {
                        entity_id: entity.clone(),
                        result,
                    }
                })
                .collect()
        })
    }

    /// The coordinator driving each decision.
    pub fn coordinator(&self) -> &DecisionCoordinator<P, B, C> {
        &self.coordinator
    }
}
