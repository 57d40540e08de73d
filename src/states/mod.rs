//! First-party entity state implementations.
//!
//! One module per entity type, each an adapter from [`WorldSnapshot`] data
//! to the [`DecisionState`] contract. Entity states are out-of-core from
//! the search's perspective: the engine never knows which one it is
//! running.
//!
//! [`WorldSnapshot`]: crate::snapshot::WorldSnapshot
//! [`DecisionState`]: crate::state::DecisionState

pub mod trader;

pub use trader::{TraderAction, TraderState, TraderStateBuilder};
