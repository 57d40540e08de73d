//! One simulated tick for a handful of traders.
//!
//! Builds a small three-settlement world, snapshots each trader, and runs
//! the tick runner the way a scheduler would.
//!
//! ```bash
//! RUST_LOG=debug cargo run --example trader_day
//! ```

use std::collections::HashMap;

use caravan_mcts::snapshot::{
    Connection, MarketInfo, SettlementInfo, TraderAttributes, WorldFacts,
};
use caravan_mcts::states::{TraderAction, TraderStateBuilder};
use caravan_mcts::{
    CommitSink, DecisionCoordinator, DecisionError, EntityId, SearchConfig, SnapshotProvider,
    TickRunner, WorldSnapshot,
};

struct InMemoryProvider {
    snapshots: HashMap<EntityId, WorldSnapshot>,
}

impl SnapshotProvider for InMemoryProvider {
    fn snapshot(&self, entity: &EntityId) -> caravan_mcts::Result<WorldSnapshot> {
        self.snapshots
            .get(entity)
            .cloned()
            .ok_or_else(|| DecisionError::SnapshotIncomplete {
                entity: entity.clone(),
                field: "snapshot",
            })
    }
}

/// Stands in for the persistence collaborator: prints instead of writing.
struct PrintingSink;

impl CommitSink<TraderAction> for PrintingSink {
    fn commit(&self, entity: &EntityId, action: &TraderAction) -> caravan_mcts::Result<()> {
        println!("commit: {entity} -> {action}");
        Ok(())
    }
}

fn connection(to: &str, name: &str, danger: f64) -> Connection {
    Connection {
        destination_id: EntityId::from(to),
        destination_name: name.to_string(),
        path: vec![],
        danger,
    }
}

fn build_world() -> WorldFacts {
    let mut world = WorldFacts::default();

    world.settlements.insert(
        EntityId::from("ashford"),
        SettlementInfo {
            name: "Ashford".to_string(),
            biome: Some("forest".to_string()),
            connections: vec![
                connection("dunmere", "Dunmere", 0.2),
                connection("caldris", "Caldris", 0.6),
            ],
        },
    );
    world.settlements.insert(
        EntityId::from("dunmere"),
        SettlementInfo {
            name: "Dunmere".to_string(),
            biome: Some("plains".to_string()),
            connections: vec![connection("ashford", "Ashford", 0.2)],
        },
    );
    world.settlements.insert(
        EntityId::from("caldris"),
        SettlementInfo {
            name: "Caldris".to_string(),
            biome: Some("mountain".to_string()),
            connections: vec![connection("ashford", "Ashford", 0.6)],
        },
    );

    let mut ashford_market = MarketInfo::default();
    ashford_market.selling.insert("grain".to_string(), 8);
    ashford_market.selling.insert("timber".to_string(), 25);
    ashford_market.buying.insert("ore".to_string(), 70);
    world.markets.insert(EntityId::from("ashford"), ashford_market);

    let mut caldris_market = MarketInfo::default();
    caldris_market.selling.insert("ore".to_string(), 45);
    caldris_market.buying.insert("grain".to_string(), 18);
    caldris_market.buying.insert("timber".to_string(), 50);
    world.markets.insert(EntityId::from("caldris"), caldris_market);

    world.item_values.insert("ore".to_string(), 55.0);
    world.item_values.insert("timber".to_string(), 30.0);
    world
}

fn trader(location: &str, gold: i64, preferred_biome: &str) -> TraderAttributes {
    TraderAttributes {
        location_id: Some(EntityId::from(location)),
        gold: Some(gold),
        preferred_biomes: vec![preferred_biome.to_string()],
        visited_settlements: vec![EntityId::from(location)],
        ..TraderAttributes::default()
    }
}

fn main() -> caravan_mcts::Result<()> {
    env_logger::init();

    let world = build_world();
    let traders = [
        ("brann", trader("ashford", 120, "mountain")),
        ("sella", trader("caldris", 900, "forest")),
        ("odric", trader("dunmere", 2_400, "plains")),
    ];

    let mut snapshots = HashMap::new();
    for (id, attrs) in traders {
        snapshots.insert(
            EntityId::from(id),
            WorldSnapshot::for_trader(id, attrs, world.clone()),
        );
    }
    let entities: Vec<EntityId> = snapshots.keys().cloned().collect();

    let config = SearchConfig::default()
        .with_max_iterations(2_000)
        .with_rollout_depth(60)
        .with_parallelism(2);

    let coordinator = DecisionCoordinator::new(
        InMemoryProvider { snapshots },
        TraderStateBuilder,
        PrintingSink,
        config,
    )?;
    let runner = TickRunner::new(coordinator)?;

    for outcome in runner.run_tick(&entities) {
        match outcome.result {
            Ok(record) => {
                println!("{}: {}", record.entity_id, record.stats.summary());
                for stats in &record.root_actions {
                    println!(
                        "  {:<30} visits {:>5}  mean {:>8.2}",
                        stats.action.to_string(),
                        stats.visits,
                        stats.mean_reward
                    );
                }
            }
            Err(err) => println!("{}: tick skipped ({err})", outcome.entity_id),
        }
    }

    Ok(())
}
