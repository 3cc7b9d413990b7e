//! Concurrency tests
//!
//! The engine is shared across a multi-threaded tokio runtime the way a chat
//! transport would share it between handlers.

use std::sync::Arc;

use frontline::core::config::EngineConfig;
use frontline::combat::FixedVariance;
use frontline::{Engine, GameError, PlayerId};

const ADMIN: PlayerId = PlayerId(1);

fn shared_engine() -> Arc<Engine> {
    let config = EngineConfig {
        privileged_players: vec![ADMIN.0],
        ..EngineConfig::default()
    };
    Arc::new(
        Engine::new(config)
            .expect("engine")
            .with_variance(FixedVariance(1.0)),
    )
}

/// N parallel purchases against a budget covering K of them succeed K times
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_purchases_never_double_spend() {
    let engine = shared_engine();
    let buyer = PlayerId(42);
    engine.select_country(buyer, "Ukraine").unwrap();
    engine.set_money(ADMIN, buyer, 7 * 50_000).unwrap();
    engine.grant_munitions(ADMIN, buyer, 1_000_000).unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || engine.buy_units(buyer, "tank", 1))
        })
        .collect();

    let mut succeeded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(GameError::InsufficientFunds { .. }) => refused += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(succeeded, 7);
    assert_eq!(refused, 25);
    let player = engine.player(buyer);
    assert_eq!(player.budget, 0);
    assert_eq!(player.inventory.total_units(), 7);
}

/// Crossing attacks between the same players do not deadlock
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crossing_attacks_complete() {
    let engine = shared_engine();
    let a = PlayerId(10);
    let b = PlayerId(20);
    for player in [a, b] {
        engine.select_country(player, "Russia").unwrap();
        engine.grant_munitions(ADMIN, player, 1_000_000).unwrap();
        engine.buy_units(player, "infantry", 500).unwrap();
    }

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let (attacker, defender) = if i % 2 == 0 { (a, b) } else { (b, a) };
            tokio::task::spawn_blocking(move || engine.attack(attacker, defender))
        })
        .collect();

    let mut battles = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => battles += 1,
            Err(GameError::NoForces) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(battles >= 1);
    assert_eq!(engine.battle_history(a, Some(100)).len(), battles);
}

/// Concurrent grants to one player all land
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_grants_all_apply() {
    let engine = shared_engine();
    let player = PlayerId(5);

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || engine.grant_money(ADMIN, player, 10))
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(engine.player(player).budget, 1_000_000 + 500);
}
