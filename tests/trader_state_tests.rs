//! Tests for the trader decision state.

use caravan_mcts::snapshot::{
    Connection, EntityId, MarketInfo, SettlementInfo, TraderAttributes, WorldFacts, WorldSnapshot,
};
use caravan_mcts::states::{TraderAction, TraderState};
use caravan_mcts::{DecisionError, DecisionState};

fn world() -> WorldFacts {
    let mut world = WorldFacts::default();

    world.settlements.insert(
        EntityId::from("harrowdell"),
        SettlementInfo {
            name: "Harrowdell".to_string(),
            biome: Some("forest".to_string()),
            connections: vec![
                Connection {
                    destination_id: EntityId::from("stonewake"),
                    destination_name: "Stonewake".to_string(),
                    path: vec!["pass".to_string()],
                    danger: 0.5,
                },
                Connection {
                    destination_id: EntityId::from("fenmarsh"),
                    destination_name: "Fenmarsh".to_string(),
                    path: vec![],
                    danger: 0.0,
                },
            ],
        },
    );
    world.settlements.insert(
        EntityId::from("stonewake"),
        SettlementInfo {
            name: "Stonewake".to_string(),
            biome: Some("mountain".to_string()),
            connections: vec![],
        },
    );
    world.settlements.insert(
        EntityId::from("fenmarsh"),
        SettlementInfo {
            name: "Fenmarsh".to_string(),
            biome: Some("swamp".to_string()),
            connections: vec![],
        },
    );

    let mut market = MarketInfo::default();
    market.selling.insert("grain".to_string(), 10);
    market.selling.insert("silk".to_string(), 150);
    market.buying.insert("furs".to_string(), 60);
    world.markets.insert(EntityId::from("harrowdell"), market);

    world.item_values.insert("silk".to_string(), 120.0);
    world
}

fn trader(gold: i64) -> TraderAttributes {
    TraderAttributes {
        name: Some("Isra".to_string()),
        location_id: Some(EntityId::from("harrowdell")),
        gold: Some(gold),
        inventory: [("furs".to_string(), 1)].into_iter().collect(),
        visited_settlements: vec![EntityId::from("harrowdell")],
        ..TraderAttributes::default()
    }
}

fn state(gold: i64) -> TraderState {
    let snapshot = WorldSnapshot::for_trader("isra", trader(gold), world());
    TraderState::from_snapshot(&snapshot).expect("snapshot is complete")
}

#[test]
fn every_legal_action_applies_cleanly() {
    let state = state(100);
    for action in state.legal_actions() {
        state
            .apply(&action)
            .unwrap_or_else(|e| panic!("legal action {action:?} rejected: {e}"));
    }
}

#[test]
fn transitions_are_deterministic() {
    let state = state(100);
    for action in state.legal_actions() {
        let once = state.apply(&action).expect("legal action applies");
        let twice = state.apply(&action).expect("legal action applies");
        assert_eq!(once, twice, "{action:?} is not deterministic");
    }
}

#[test]
fn illegal_actions_are_rejected() {
    let state = state(100);

    // Stonewake is connected, but a made-up settlement is not.
    let bogus = TraderAction::Move {
        destination_id: EntityId::from("nowhere"),
    };
    match state.apply(&bogus) {
        Err(DecisionError::InvalidAction(_)) => {}
        other => panic!("expected InvalidAction, got {other:?}"),
    }

    // Silk is on sale but unaffordable at 100 gold.
    let unaffordable = TraderAction::Buy {
        item_id: "silk".to_string(),
        price: 150,
    };
    assert!(state.apply(&unaffordable).is_err());
}

#[test]
fn affordability_gates_buying() {
    let poor = state(5);
    let actions = poor.legal_actions();
    assert!(
        !actions
            .iter()
            .any(|a| matches!(a, TraderAction::Buy { .. })),
        "5 gold cannot buy anything on this market: {actions:?}"
    );

    let rich = state(200);
    assert!(rich
        .legal_actions()
        .iter()
        .any(|a| matches!(a, TraderAction::Buy { item_id, .. } if item_id == "grain")));
}

#[test]
fn wealth_unlocks_late_game_actions() {
    let modest = state(100);
    let modest_actions = modest.legal_actions();
    assert!(!modest_actions.contains(&TraderAction::Retire));
    assert!(!modest_actions.contains(&TraderAction::OpenShop));

    let wealthy = state(3_000);
    let wealthy_actions = wealthy.legal_actions();
    assert!(wealthy_actions.contains(&TraderAction::Retire));
    // Harrowdell is not preferred and its market is small, so the
    // settlement score stays below the shop threshold.
    assert!(!wealthy_actions.contains(&TraderAction::OpenShop));
}

#[test]
fn preferences_raise_the_settlement_gate() {
    let mut attrs = trader(3_000);
    attrs.preferred_settlements = vec![EntityId::from("harrowdell")];
    attrs.preferred_biomes = vec!["forest".to_string()];
    let snapshot = WorldSnapshot::for_trader("isra", attrs, world());
    let state = TraderState::from_snapshot(&snapshot).expect("snapshot is complete");

    // Preferred settlement + preferred biome pushes the score to 1.0,
    // clearing both the settle and shop gates.
    let actions = state.legal_actions();
    assert!(actions.contains(&TraderAction::Settle));
    assert!(actions.contains(&TraderAction::OpenShop));
}

#[test]
fn retirement_is_terminal_and_final() {
    let state = state(3_000);
    let retired = state.apply(&TraderAction::Retire).expect("retire applies");

    assert!(retired.is_terminal());
    assert_eq!(retired.legal_actions(), vec![TraderAction::Rest]);
}

#[test]
fn opening_a_shop_costs_gold_and_ends_the_run() {
    let mut attrs = trader(3_000);
    attrs.preferred_settlements = vec![EntityId::from("harrowdell")];
    attrs.preferred_biomes = vec!["forest".to_string()];
    let snapshot = WorldSnapshot::for_trader("isra", attrs, world());
    let state = TraderState::from_snapshot(&snapshot).expect("snapshot is complete");

    let shopkeeper = state
        .apply(&TraderAction::OpenShop)
        .expect("open shop applies");

    assert!(shopkeeper.is_terminal());
    assert_eq!(shopkeeper.gold(), 2_500);
}

#[test]
fn trading_moves_gold_and_inventory() {
    let state = state(100);

    let bought = state
        .apply(&TraderAction::Buy {
            item_id: "grain".to_string(),
            price: 10,
        })
        .expect("buy applies");
    assert_eq!(bought.gold(), 90);

    let sold = state
        .apply(&TraderAction::Sell {
            item_id: "furs".to_string(),
            price: 60,
        })
        .expect("sell applies");
    assert_eq!(sold.gold(), 160);
    // The last fur is gone, so selling again is illegal.
    assert!(!sold
        .legal_actions()
        .iter()
        .any(|a| matches!(a, TraderAction::Sell { .. })));
}

#[test]
fn visiting_every_settlement_is_terminal() {
    let state = state(100);
    let toured = state
        .apply(&TraderAction::Move {
            destination_id: EntityId::from("stonewake"),
        })
        .expect("move applies");
    assert!(!toured.is_terminal());

    // Third settlement of three: full tour.
    let mut attrs = trader(100);
    attrs.visited_settlements = vec![
        EntityId::from("harrowdell"),
        EntityId::from("stonewake"),
    ];
    let snapshot = WorldSnapshot::for_trader("isra", attrs, world());
    let nearly_done = TraderState::from_snapshot(&snapshot).expect("snapshot is complete");
    let done = nearly_done
        .apply(&TraderAction::Move {
            destination_id: EntityId::from("fenmarsh"),
        })
        .expect("move applies");
    assert!(done.is_terminal());
}

#[test]
fn richer_outcomes_score_higher() {
    let poor = state(50);
    let rich = state(500);
    assert!(rich.reward() > poor.reward());

    let state = state(3_000);
    let retired = state.apply(&TraderAction::Retire).expect("retire applies");
    assert!(retired.reward() > state.reward());
}

#[test]
fn rollout_weights_follow_preferences() {
    let mut attrs = trader(100);
    attrs.preferred_biomes = vec!["mountain".to_string()];
    let snapshot = WorldSnapshot::for_trader("isra", attrs, world());
    let state = TraderState::from_snapshot(&snapshot).expect("snapshot is complete");

    let to_stonewake = TraderAction::Move {
        destination_id: EntityId::from("stonewake"),
    };
    let to_fenmarsh = TraderAction::Move {
        destination_id: EntityId::from("fenmarsh"),
    };

    // Stonewake: unvisited (1.5) and preferred biome (2.0), but its route
    // carries danger 0.5. Fenmarsh: unvisited only, safe road.
    let stonewake_weight = state.action_weight(&to_stonewake);
    let fenmarsh_weight = state.action_weight(&to_fenmarsh);
    assert!(stonewake_weight > fenmarsh_weight);

    // Resting is always deprioritized.
    assert!(state.action_weight(&TraderAction::Rest) < 1.0);
}

#[test]
fn missing_required_fields_are_reported_by_name() {
    let mut attrs = trader(100);
    attrs.location_id = None;
    let snapshot = WorldSnapshot::for_trader("isra", attrs, world());

    match TraderState::from_snapshot(&snapshot) {
        Err(DecisionError::SnapshotIncomplete { field, .. }) => {
            assert_eq!(field, "location_id")
        }
        other => panic!("expected SnapshotIncomplete, got {other:?}"),
    }

    let snapshot = WorldSnapshot {
        trader: None,
        ..WorldSnapshot::for_trader("isra", trader(100), world())
    };
    match TraderState::from_snapshot(&snapshot) {
        Err(DecisionError::SnapshotIncomplete { field, .. }) => assert_eq!(field, "trader"),
        other => panic!("expected SnapshotIncomplete, got {other:?}"),
    }
}
