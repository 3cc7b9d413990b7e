//! The shipped data and config files must parse and match the built-in defaults

use std::path::PathBuf;

use frontline::catalog::{UnitCatalog, UnitKind};
use frontline::core::config::EngineConfig;

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_units_file_matches_defaults() {
    let loaded = UnitCatalog::load_from_toml(&repo_file("data/units.toml")).expect("units.toml");
    let defaults = UnitCatalog::with_defaults();
    for kind in UnitKind::ALL {
        assert_eq!(loaded.get(kind).unwrap(), defaults.get(kind).unwrap());
    }
}

#[test]
fn test_sample_config_loads() {
    let config = EngineConfig::load(&repo_file("config/frontline.toml")).expect("frontline.toml");
    let expected = EngineConfig {
        privileged_players: vec![1],
        ..EngineConfig::default()
    };
    assert_eq!(config, expected);
}
