//! Read-only world snapshots feeding decision states.
//!
//! A snapshot is an immutable, timestamped view of one entity's attributes
//! and the world facts relevant to its decisions, captured by the external
//! snapshot provider before search begins. It must be internally consistent
//! (no partial writes visible) but may be stale relative to concurrent
//! commits; the core tolerates staleness by design, since the next tick
//! re-snapshots.
//!
//! Fields a state builder requires are modeled as `Option` so their absence
//! is reported as [`SnapshotIncomplete`] instead of being papered over with
//! defaults that could desync from persisted state.
//!
//! [`SnapshotIncomplete`]: crate::DecisionError::SnapshotIncomplete

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Identifier of a world entity (trader, settlement, faction).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl EntityId {
    /// Creates an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

/// The kind of entity a snapshot describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// A traveling merchant.
    Trader,
    /// A settlement deciding on production or policy.
    Settlement,
    /// A faction deciding on diplomacy or expansion.
    Faction,
}

/// A route from one settlement to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Settlement the route leads to.
    pub destination_id: EntityId,
    /// Display name of the destination.
    pub destination_name: String,
    /// Area identifiers traversed along the way.
    pub path: Vec<String>,
    /// Relative danger of the route, 0.0 = safe.
    pub danger: f64,
}

/// Static facts about one settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementInfo {
    /// Display name.
    pub name: String,
    /// Biome the settlement sits in, when known.
    pub biome: Option<String>,
    /// Routes leading out of this settlement.
    pub connections: Vec<Connection>,
}

/// Market prices at one settlement.
///
/// Ordered maps keep legal-action enumeration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInfo {
    /// Items the market sells, by unit price in coins.
    pub selling: BTreeMap<String, i64>,
    /// Items the market buys, by unit price in coins.
    pub buying: BTreeMap<String, i64>,
}

/// World facts relevant to a decision, shared read-only by every state the
/// search clones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldFacts {
    /// Settlements by identifier.
    pub settlements: BTreeMap<EntityId, SettlementInfo>,
    /// Markets by settlement identifier.
    pub markets: BTreeMap<EntityId, MarketInfo>,
    /// Base item values in coins, for inventory valuation.
    pub item_values: BTreeMap<String, f64>,
}

/// Trader attributes captured at snapshot time.
///
/// `location_id` and `gold` are required by the trader state builder; the
/// rest default sensibly because their absence cannot desync anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraderAttributes {
    /// Display name, for logs.
    pub name: Option<String>,
    /// Settlement the trader currently occupies. Required.
    pub location_id: Option<EntityId>,
    /// Settlement the trader is headed for, if any.
    pub destination_id: Option<EntityId>,
    /// Coins on hand. Required.
    pub gold: Option<i64>,
    /// Item counts carried.
    pub inventory: BTreeMap<String, u32>,
    /// Settlements this trader favors.
    pub preferred_settlements: Vec<EntityId>,
    /// Biomes this trader favors.
    pub preferred_biomes: Vec<String>,
    /// Settlements already visited.
    pub visited_settlements: Vec<EntityId>,
    /// Currently on the road between settlements.
    pub is_traveling: bool,
    /// Has settled down permanently.
    pub is_settled: bool,
    /// Has retired from trading.
    pub is_retired: bool,
    /// Owns a shop.
    pub has_shop: bool,
}

/// A read-only bundle of entity attributes and world facts for one decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// The deciding entity.
    pub entity_id: EntityId,
    /// What kind of entity this is.
    pub kind: EntityKind,
    /// When the provider captured this view.
    pub captured_at: SystemTime,
    /// Trader attributes, present when `kind` is [`EntityKind::Trader`].
    pub trader: Option<TraderAttributes>,
    /// World facts relevant to the decision.
    pub world: WorldFacts,
}

impl WorldSnapshot {
    /// Creates a trader snapshot captured now.
    pub fn for_trader(
        entity_id: impl Into<EntityId>,
        trader: TraderAttributes,
        world: WorldFacts,
    ) -> Self {
        WorldSnapshot {
            entity_id: entity_id.into(),
            kind: EntityKind::Trader,
            captured_at: SystemTime::now(),
            trader: Some(trader),
            world,
        }
    }
}
