//! Trader decision state.
//!
//! Traders move between settlements, trade on local markets, and eventually
//! settle down, open a shop, or retire. This module adapts a trader
//! snapshot into the [`DecisionState`] contract so the engine can search
//! over those choices.
//!
//! World facts (settlements, routes, markets) are shared between every
//! state the search clones via `Arc`; they are immutable for the lifetime
//! of the search, so sharing cannot alias mutable data.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::coordinator::StateBuilder;
use crate::snapshot::{EntityId, WorldFacts, WorldSnapshot};
use crate::state::{Action, DecisionState};
use crate::{DecisionError, Result};

/// Gold needed before settling down becomes an option.
const SETTLE_GOLD: i64 = 500;
/// Gold needed before opening a shop becomes an option.
const SHOP_GOLD: i64 = 1_000;
/// One-time cost of opening a shop.
const SHOP_COST: i64 = 500;
/// Gold needed before retirement becomes an option.
const RETIRE_GOLD: i64 = 2_000;
/// Gold past which retirement becomes strongly preferred in rollouts.
const WEALTHY_GOLD: i64 = 5_000;
/// Distinct item kinds counting as a full load.
const FULL_INVENTORY: usize = 5;
/// Simulated days before a playout is cut off.
const SIM_HORIZON_DAYS: u32 = 100;

/// One choice available to a trader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraderAction {
    /// Travel to a connected settlement.
    Move {
        /// Where to go.
        destination_id: EntityId,
    },
    /// Buy one unit from the local market.
    Buy {
        /// Item to buy.
        item_id: String,
        /// Unit price in coins.
        price: i64,
    },
    /// Sell one unit to the local market.
    Sell {
        /// Item to sell.
        item_id: String,
        /// Unit price in coins.
        price: i64,
    },
    /// Settle down in the current settlement.
    Settle,
    /// Open a shop in the current settlement.
    OpenShop,
    /// Retire from trading.
    Retire,
    /// Do nothing this day.
    Rest,
}

impl Action for TraderAction {}

impl fmt::Display for TraderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraderAction::Move { destination_id } => write!(f, "move to {destination_id}"),
            TraderAction::Buy { item_id, price } => write!(f, "buy {item_id} for {price}"),
            TraderAction::Sell { item_id, price } => write!(f, "sell {item_id} for {price}"),
            TraderAction::Settle => f.write_str("settle down"),
            TraderAction::OpenShop => f.write_str("open a shop"),
            TraderAction::Retire => f.write_str("retire"),
            TraderAction::Rest => f.write_str("rest"),
        }
    }
}

/// Immutable trader preferences, shared by every cloned state.
#[derive(Debug, Default, PartialEq)]
struct TraderProfile {
    preferred_settlements: Vec<EntityId>,
    preferred_biomes: Vec<String>,
}

/// A trader's hypothetical situation during search.
///
/// Equality compares the whole hypothetical situation, which is what the
/// transition-determinism property is stated over.
#[derive(Debug, Clone, PartialEq)]
pub struct TraderState {
    facts: Arc<WorldFacts>,
    profile: Arc<TraderProfile>,
    location_id: Option<EntityId>,
    destination_id: Option<EntityId>,
    gold: i64,
    inventory: BTreeMap<String, u32>,
    visited: Vec<EntityId>,
    is_traveling: bool,
    is_settled: bool,
    is_retired: bool,
    has_shop: bool,
    shop_location_id: Option<EntityId>,
    sim_days: u32,
}

impl TraderState {
    /// Builds the initial state from a snapshot.
    ///
    /// `trader`, `location_id` and `gold` are required; their absence fails
    /// with [`DecisionError::SnapshotIncomplete`].
    pub fn from_snapshot(snapshot: &WorldSnapshot) -> Result<Self> {
        let trader = snapshot
            .trader
            .as_ref()
            .ok_or_else(|| DecisionError::SnapshotIncomplete {
                entity: snapshot.entity_id.clone(),
                field: "trader",
            })?;

        let location_id =
            trader
                .location_id
                .clone()
                .ok_or_else(|| DecisionError::SnapshotIncomplete {
                    entity: snapshot.entity_id.clone(),
                    field: "location_id",
                })?;

        let gold = trader
            .gold
            .ok_or_else(|| DecisionError::SnapshotIncomplete {
                entity: snapshot.entity_id.clone(),
                field: "gold",
            })?;

        Ok(TraderState {
            facts: Arc::new(snapshot.world.clone()),
            profile: Arc::new(TraderProfile {
                preferred_settlements: trader.preferred_settlements.clone(),
                preferred_biomes: trader.preferred_biomes.clone(),
            }),
            location_id: Some(location_id),
            destination_id: trader.destination_id.clone(),
            gold,
            inventory: trader.inventory.clone(),
            visited: trader.visited_settlements.clone(),
            is_traveling: trader.is_traveling,
            is_settled: trader.is_settled,
            is_retired: trader.is_retired,
            has_shop: trader.has_shop,
            shop_location_id: None,
            sim_days: 0,
        })
    }

    /// Coins on hand.
    pub fn gold(&self) -> i64 {
        self.gold
    }

    /// Current settlement, if not on the road.
    pub fn location_id(&self) -> Option<&EntityId> {
        self.location_id.as_ref()
    }

    /// How desirable `settlement` is for this trader, in [0, 1].
    fn settlement_score(&self, settlement: &EntityId) -> f64 {
        let mut score: f64 = 0.5;

        if self.profile.preferred_settlements.contains(settlement) {
            score += 0.3;
        }

        if let Some(biome) = self
            .facts
            .settlements
            .get(settlement)
            .and_then(|s| s.biome.as_deref())
        {
            if self.profile.preferred_biomes.iter().any(|b| b == biome) {
                score += 0.2;
            }
        }

        if let Some(market) = self.facts.markets.get(settlement) {
            let market_size = market.selling.len() + market.buying.len();
            if market_size > 20 {
                score += 0.2;
            } else if market_size > 10 {
                score += 0.1;
            }
        }

        score.min(1.0)
    }

    fn item_value(&self, item_id: &str) -> f64 {
        self.facts.item_values.get(item_id).copied().unwrap_or(5.0)
    }

    fn biome_preferred(&self, settlement: &EntityId) -> bool {
        self.facts
            .settlements
            .get(settlement)
            .and_then(|s| s.biome.as_deref())
            .is_some_and(|biome| self.profile.preferred_biomes.iter().any(|b| b == biome))
    }

    /// Danger of the route from the current location to `destination`.
    fn route_danger(&self, destination: &EntityId) -> f64 {
        let Some(location) = &self.location_id else {
            return 0.0;
        };
        self.facts
            .settlements
            .get(location)
            .and_then(|s| {
                s.connections
                    .iter()
                    .find(|c| &c.destination_id == destination)
            })
            .map(|c| c.danger.max(0.0))
            .unwrap_or(0.0)
    }
}

impl DecisionState for TraderState {
    type Action = TraderAction;

    fn legal_actions(&self) -> Vec<TraderAction> {
        // A retired trader only waits.
        if self.is_retired {
            return vec![TraderAction::Rest];
        }

        let mut actions = Vec::new();

        if let Some(location) = &self.location_id {
            if !self.is_settled {
                if let Some(settlement) = self.facts.settlements.get(location) {
                    for connection in &settlement.connections {
                        if &connection.destination_id == location {
                            continue;
                        }
                        actions.push(TraderAction::Move {
                            destination_id: connection.destination_id.clone(),
                        });
                    }
                }
            }

            if let Some(market) = self.facts.markets.get(location) {
                for (item_id, &price) in &market.selling {
                    if self.gold >= price {
                        actions.push(TraderAction::Buy {
                            item_id: item_id.clone(),
                            price,
                        });
                    }
                }
                for (item_id, &count) in &self.inventory {
                    if count == 0 {
                        continue;
                    }
                    if let Some(&price) = market.buying.get(item_id) {
                        actions.push(TraderAction::Sell {
                            item_id: item_id.clone(),
                            price,
                        });
                    }
                }
            }

            let score = self.settlement_score(location);
            if !self.is_settled && self.gold >= SETTLE_GOLD && score >= 0.7 {
                actions.push(TraderAction::Settle);
            }
            if !self.has_shop && self.gold >= SHOP_GOLD && score >= 0.8 {
                actions.push(TraderAction::OpenShop);
            }
            if self.gold >= RETIRE_GOLD {
                actions.push(TraderAction::Retire);
            }
        }

        if !self.is_traveling {
            actions.push(TraderAction::Rest);
        }

        actions
    }

    fn apply(&self, action: &TraderAction) -> Result<Self> {
        if !self.legal_actions().contains(action) {
            return Err(DecisionError::InvalidAction(format!("{action:?}")));
        }

        let mut next = self.clone();
        next.sim_days += 1;

        match action {
            TraderAction::Move { destination_id } => {
                next.location_id = Some(destination_id.clone());
                if !next.visited.contains(destination_id) {
                    next.visited.push(destination_id.clone());
                }
                if next.destination_id.as_ref() == Some(destination_id) {
                    next.destination_id = None;
                }
                next.is_traveling = false;
            }
            TraderAction::Buy { item_id, price } => {
                next.gold -= price;
                *next.inventory.entry(item_id.clone()).or_insert(0) += 1;
            }
            TraderAction::Sell { item_id, price } => {
                next.gold += price;
                if let Some(count) = next.inventory.get_mut(item_id) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        next.inventory.remove(item_id);
                    }
                }
            }
            TraderAction::Settle => {
                next.is_settled = true;
                next.is_traveling = false;
            }
            TraderAction::OpenShop => {
                next.has_shop = true;
                next.shop_location_id = next.location_id.clone();
                next.is_settled = true;
                next.is_traveling = false;
                next.gold -= SHOP_COST;
            }
            TraderAction::Retire => {
                next.is_retired = true;
                next.is_traveling = false;
            }
            TraderAction::Rest => {}
        }

        Ok(next)
    }

    fn is_terminal(&self) -> bool {
        if self.is_retired || self.has_shop {
            return true;
        }

        // Full tour of the known world.
        let settlement_count = self.facts.settlements.len();
        if settlement_count > 0 && self.visited.len() >= settlement_count {
            return true;
        }

        // Reached the destination with a full load.
        if self.destination_id.is_some()
            && self.destination_id == self.location_id
            && self.inventory.len() >= FULL_INVENTORY
        {
            return true;
        }

        self.sim_days > SIM_HORIZON_DAYS
    }

    fn reward(&self) -> f64 {
        let mut reward = self.gold as f64 * 0.1;

        if self.is_retired {
            reward += 100.0 * (self.gold as f64 / 1_000.0);
        }

        if self.has_shop {
            let mut shop_bonus = 200.0;
            if let Some(shop_location) =
                self.shop_location_id.as_ref().or(self.location_id.as_ref())
            {
                shop_bonus *= self.settlement_score(shop_location);
            }
            reward += shop_bonus;
        }

        if self.is_settled && !self.has_shop {
            if let Some(location) = &self.location_id {
                reward += 50.0 * self.settlement_score(location);
            }
        }

        let inventory_value: f64 = self
            .inventory
            .iter()
            .map(|(item_id, &count)| self.item_value(item_id) * count as f64)
            .sum();
        reward += inventory_value * 0.05;

        if let Some(location) = &self.location_id {
            if self.profile.preferred_settlements.contains(location) {
                reward += 10.0;
            }
            if self.biome_preferred(location) {
                reward += 5.0;
            }
        }

        // Exploration bonus, destination bonus, and a small daily cost that
        // keeps simulated plans efficient.
        reward += self.visited.len() as f64 * 2.0;
        if self.destination_id.is_some() && self.destination_id == self.location_id {
            reward += 20.0;
        }
        reward -= self.sim_days as f64 * 0.1;

        reward
    }

    fn action_weight(&self, action: &TraderAction) -> f64 {
        match action {
            TraderAction::Move { destination_id } => {
                let mut weight = 1.0;
                if !self.visited.contains(destination_id) {
                    weight *= 1.5;
                }
                if self.biome_preferred(destination_id) {
                    weight *= 2.0;
                }
                if self.profile.preferred_settlements.contains(destination_id) {
                    weight *= 2.5;
                }
                if self.destination_id.as_ref() == Some(destination_id) {
                    weight *= 3.0;
                }
                weight / (1.0 + self.route_danger(destination_id))
            }
            TraderAction::Buy { .. } => 1.0,
            TraderAction::Sell { price, .. } => {
                if *price > 50 {
                    1.5
                } else {
                    1.0
                }
            }
            TraderAction::Rest => 0.3,
            TraderAction::Settle => 2.0,
            TraderAction::OpenShop => 2.5,
            TraderAction::Retire => {
                if self.gold > WEALTHY_GOLD {
                    3.0
                } else {
                    1.5
                }
            }
        }
    }
}

impl fmt::Display for TraderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_retired {
            "retired"
        } else if self.has_shop {
            "shopkeeper"
        } else if self.is_settled {
            "settled"
        } else if self.is_traveling {
            "traveling"
        } else {
            "active"
        };

        let location = self
            .location_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "on the road".to_string());

        write!(
            f,
            "trader ({status}) at {location} with {} gold",
            self.gold
        )
    }
}

/// Builds [`TraderState`]s from trader snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraderStateBuilder;

impl StateBuilder for TraderStateBuilder {
    type State = TraderState;

    fn build(&self, snapshot: &WorldSnapshot) -> Result<TraderState> {
        TraderState::from_snapshot(snapshot)
    }
}
