//! Tests for the configuration surface.

use std::time::Duration;

use caravan_mcts::{DecisionError, SearchConfig};

#[test]
fn default_config_is_valid() {
    let config = SearchConfig::default();
    assert!(config.validate().is_ok());

    assert_eq!(config.exploration_weight, 1.0);
    assert_eq!(config.max_iterations, 10_000);
    assert!(config.max_time.is_none());
    assert_eq!(config.rollout_depth, 1_000);
    assert_eq!(config.failed_rollout_reward, 0.0);
    assert!(config.seed.is_none());
    assert_eq!(config.parallelism, 4);
}

#[test]
fn builder_methods_set_fields() {
    let config = SearchConfig::default()
        .with_exploration_weight(1.414)
        .with_max_iterations(500)
        .with_max_time(Duration::from_millis(20))
        .with_rollout_depth(64)
        .with_failed_rollout_reward(-1.0)
        .with_seed(42)
        .with_parallelism(8);

    assert_eq!(config.exploration_weight, 1.414);
    assert_eq!(config.max_iterations, 500);
    assert_eq!(config.max_time, Some(Duration::from_millis(20)));
    assert_eq!(config.rollout_depth, 64);
    assert_eq!(config.failed_rollout_reward, -1.0);
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.parallelism, 8);
    assert!(config.validate().is_ok());
}

#[test]
fn out_of_range_values_are_rejected() {
    let bad = [
        SearchConfig::default().with_exploration_weight(f64::NAN),
        SearchConfig::default().with_exploration_weight(-0.5),
        SearchConfig::default().with_max_iterations(0),
        SearchConfig::default().with_rollout_depth(0),
        SearchConfig::default().with_failed_rollout_reward(f64::INFINITY),
        SearchConfig::default().with_parallelism(0),
    ];

    for config in bad {
        match config.validate() {
            Err(DecisionError::InvalidConfiguration(_)) => {}
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }
}

#[test]
fn zero_exploration_weight_is_allowed() {
    // Pure exploitation is a legitimate setting.
    let config = SearchConfig::default().with_exploration_weight(0.0);
    assert!(config.validate().is_ok());
}

#[test]
fn config_round_trips_through_json() {
    let config = SearchConfig::default()
        .with_max_iterations(123)
        .with_seed(9)
        .with_max_time(Duration::from_secs(1));

    let json = serde_json::to_string(&config).expect("serializes");
    let back: SearchConfig = serde_json::from_str(&json).expect("deserializes");

    assert_eq!(back.max_iterations, 123);
    assert_eq!(back.seed, Some(9));
    assert_eq!(back.max_time, Some(Duration::from_secs(1)));
}
