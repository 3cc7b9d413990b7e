//! Engine configuration with documented constants
//!
//! Every tunable number the rules use lives here. Values can be overridden
//! from a TOML file; missing keys fall back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Configuration for the game rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === ECONOMY ===
    /// Budget a newly created player starts with
    pub starting_budget: i64,

    /// Price of a single production facility
    pub factory_cost: i64,

    /// Munitions per hour a facility yields before modifiers
    pub factory_rate: i64,

    // === COMBAT ===
    /// Fraction of each unit kind the winning side loses (floored per kind)
    pub winner_loss_fraction: f64,

    /// Lower bound of the per-side strength variance draw
    pub variance_low: f64,

    /// Upper bound of the per-side strength variance draw
    pub variance_high: f64,

    // === REGIONS ===
    /// How much a region's contribution shrinks per damage level
    ///
    /// At 0.25, level 4 damage silences a region entirely.
    pub damage_attenuation_per_level: f64,

    /// Whether controlled regions feed into the live modifiers
    ///
    /// When off, region effects are still computed and shown as a
    /// potential bonus but never change production or combat.
    pub region_bonuses_enabled: bool,

    // === ADMINISTRATION ===
    /// Player ids allowed to run privileged operations
    pub privileged_players: Vec<u64>,

    /// Battles returned by a history query
    pub history_limit: usize,

    // === STORAGE ===
    /// Directory for the JSON file backend; in-memory when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_budget: 1_000_000,
            factory_cost: 100_000,
            factory_rate: 1000,

            winner_loss_fraction: 0.3,
            variance_low: 0.8,
            variance_high: 1.2,

            damage_attenuation_per_level: 0.25,
            region_bonuses_enabled: false,

            privileged_players: Vec::new(),
            history_limit: 5,

            data_dir: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse and validate config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_budget < 0 {
            return Err(ConfigError::Invalid(format!(
                "starting_budget ({}) must not be negative",
                self.starting_budget
            )));
        }

        if self.factory_cost <= 0 || self.factory_rate < 0 {
            return Err(ConfigError::Invalid(
                "factory_cost must be positive and factory_rate non-negative".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.winner_loss_fraction) {
            return Err(ConfigError::Invalid(format!(
                "winner_loss_fraction ({}) must be within [0, 1]",
                self.winner_loss_fraction
            )));
        }

        if self.variance_low <= 0.0 || self.variance_low > self.variance_high {
            return Err(ConfigError::Invalid(format!(
                "variance range [{}, {}] must be positive and ordered",
                self.variance_low, self.variance_high
            )));
        }

        if !(0.0..=0.25).contains(&self.damage_attenuation_per_level) {
            // Above 0.25, level 4 would go negative before the floor at zero
            return Err(ConfigError::Invalid(format!(
                "damage_attenuation_per_level ({}) must be within [0, 0.25]",
                self.damage_attenuation_per_level
            )));
        }

        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must be at least 1".into()));
        }

        Ok(())
    }

    /// Weight applied to region contributions in live modifiers
    pub fn region_weight(&self) -> f64 {
        if self.region_bonuses_enabled {
            1.0
        } else {
            0.0
        }
    }
}
