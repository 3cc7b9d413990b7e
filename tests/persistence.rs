//! Integration tests for the JSON file backend
//!
//! State written through one engine must come back identically in a fresh
//! engine opened on the same directory.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use frontline::catalog::UnitKind;
use frontline::core::clock::ManualClock;
use frontline::core::config::EngineConfig;
use frontline::store::{Backend, JsonFileBackend};
use frontline::combat::FixedVariance;
use frontline::{Engine, PlayerId};

const ADMIN: PlayerId = PlayerId(1);
const ALICE: PlayerId = PlayerId(7);
const BOB: PlayerId = PlayerId(8);

fn open(dir: &std::path::Path, clock: Arc<ManualClock>) -> Engine {
    let config = EngineConfig {
        privileged_players: vec![ADMIN.0],
        data_dir: Some(dir.to_path_buf()),
        ..EngineConfig::default()
    };
    Engine::new(config)
        .expect("engine")
        .with_clock(clock)
        .with_variance(FixedVariance(1.0))
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    ));

    let (alice_before, bob_before) = {
        let engine = open(dir.path(), Arc::clone(&clock));
        engine.ensure_player(ALICE, "Alice").unwrap();
        engine.select_country(ALICE, "Ukraine").unwrap();
        engine.set_political_system(ADMIN, ALICE, "communism").unwrap();
        engine.set_region_damage(ADMIN, ALICE, "odesa", 3).unwrap();
        engine.build_facility(ALICE).unwrap();
        engine.grant_munitions(ADMIN, ALICE, 5_000).unwrap();
        engine.buy_units(ALICE, "tank", 2).unwrap();

        engine.select_country(BOB, "Belarus").unwrap();
        engine.grant_munitions(ADMIN, BOB, 1_000).unwrap();
        engine.buy_units(BOB, "infantry", 10).unwrap();

        clock.advance(Duration::minutes(5));
        engine.attack(ALICE, BOB).unwrap();

        (engine.player(ALICE), engine.player(BOB))
    };

    let engine = open(dir.path(), Arc::clone(&clock));
    assert_eq!(engine.player(ALICE), alice_before);
    assert_eq!(engine.player(BOB), bob_before);
    assert_eq!(engine.player(BOB).inventory.count(UnitKind::Infantry), 0);

    let history = engine.battle_history(BOB, None);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].winner, ALICE);
}

#[test]
fn test_unknown_players_are_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine = open(dir.path(), clock);

    let _ = engine.overview(ALICE);
    let _ = engine.collect_production(ALICE);
    assert!(engine.buy_units(ALICE, "tank", 1).is_err());

    let snapshot = JsonFileBackend::open(dir.path()).unwrap().load().unwrap();
    assert!(snapshot.players.is_empty());
    assert!(snapshot.battles.is_empty());
}

#[test]
fn test_reload_after_reset_country() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    {
        let engine = open(dir.path(), Arc::clone(&clock));
        engine.select_country(ALICE, "Ukraine").unwrap();
        engine.reset_country(ADMIN, ALICE).unwrap();
    }

    let engine = open(dir.path(), clock);
    let alice = engine.player(ALICE);
    assert!(alice.country.is_none());
    assert!(alice.regions.is_empty());
    assert!(engine.select_country(ALICE, "Russia").is_ok());
}

#[test]
fn test_failed_battle_write_leaves_disk_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    {
        let engine = open(dir.path(), Arc::clone(&clock));
        engine.select_country(ALICE, "Ukraine").unwrap();
        engine.grant_munitions(ADMIN, ALICE, 1_000).unwrap();
        engine.buy_units(ALICE, "infantry", 10).unwrap();
        engine.select_country(BOB, "Russia").unwrap();
        engine.grant_munitions(ADMIN, BOB, 1_000).unwrap();
        engine.buy_units(BOB, "tank", 1).unwrap();

        let bob_file = dir.path().join("players").join(format!("{}.json", BOB));
        std::fs::remove_file(&bob_file).unwrap();
        std::fs::create_dir(&bob_file).unwrap();

        assert!(engine.attack(ALICE, BOB).is_err());
        assert_eq!(engine.player(ALICE).inventory.count(UnitKind::Infantry), 10);
    }

    let engine = open(dir.path(), clock);
    assert_eq!(engine.player(ALICE).inventory.count(UnitKind::Infantry), 10);
    assert!(engine.battle_history(ALICE, None).is_empty());
    assert!(!dir.path().join("battles.jsonl").exists());
}
