//! Traits defining the decision state contract.
//!
//! [`DecisionState`] is the interface every entity-specific state must
//! implement to be searchable. States are logically immutable values: every
//! transition returns a new, fully independent state, and applying the same
//! action to equal states always yields equal successors.

use std::fmt::Debug;

use crate::Result;

/// Trait for actions an entity can take.
///
/// Actions are opaque, equality-comparable values describing one legal
/// choice from a state (move to a settlement, buy an item, wait). They must
/// carry enough data to be replayed outside the tree (a destination or item
/// identifier, a quantity) because the chosen action is handed to the
/// external commit collaborator verbatim.
///
/// Equality is how child nodes are keyed, so an action's value must be
/// stable for a given state.
pub trait Action: Clone + Debug + PartialEq + Send + Sync {}

/// Trait defining the state interface required by the search engine.
///
/// A state describes one hypothetical world configuration for one deciding
/// entity: its location, resources, goals, and a read-only view of the
/// world facts captured at snapshot time. All world data must be captured
/// into the state before search begins; implementations must never perform
/// I/O from these methods.
pub trait DecisionState: Clone + Send + Sync {
    /// The type of actions available from this state.
    type Action: Action;

    /// Returns the finite set of actions legal from this state.
    ///
    /// Must be deterministic: the same state always produces the same set.
    /// A stable order is not required but makes test runs reproducible, so
    /// implementations are encouraged to iterate ordered collections.
    /// Terminal states return an empty vector.
    fn legal_actions(&self) -> Vec<Self::Action>;

    /// Applies an action, returning the successor state.
    ///
    /// Callers only pass actions obtained from [`legal_actions`], but
    /// implementations must defend against misuse and fail with
    /// [`DecisionError::InvalidAction`] when handed anything else. The
    /// successor must not alias mutable data with `self`; shared immutable
    /// world facts (for example behind an `Arc`) are fine.
    ///
    /// [`legal_actions`]: DecisionState::legal_actions
    /// [`DecisionError::InvalidAction`]: crate::DecisionError::InvalidAction
    fn apply(&self, action: &Self::Action) -> Result<Self>;

    /// Returns true when no further meaningful simulation should occur.
    ///
    /// Goal reached, resources exhausted, or a fixed horizon hit.
    fn is_terminal(&self) -> bool;

    /// Scalar evaluation of this state from the deciding entity's
    /// perspective.
    ///
    /// Only consulted at or near terminal states and at the end of rollouts.
    /// The scale is entity-defined but must be finite; the engine treats
    /// rewards as opaque and only sums and averages them.
    fn reward(&self) -> f64;

    /// Relative weight of `action` for preference-biased rollouts.
    ///
    /// The default is uniform. [`WeightedRollout`] samples rollout actions
    /// proportionally to this value; it never affects which actions are
    /// legal, only how often simulations try them.
    ///
    /// [`WeightedRollout`]: crate::policy::WeightedRollout
    fn action_weight(&self, _action: &Self::Action) -> f64 {
        1.0
    }
}
