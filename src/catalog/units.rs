//! Unit catalog - purchasable military assets

use std::fmt;
use std::str::FromStr;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;
use crate::core::error::{GameError, Result};

/// Kinds of military unit a player can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Infantry,
    Artillery,
    Tank,
    Fighter,
    Assault,
    Bomber,
    Ship,
}

impl UnitKind {
    pub const ALL: [UnitKind; 7] = [
        UnitKind::Infantry,
        UnitKind::Artillery,
        UnitKind::Tank,
        UnitKind::Fighter,
        UnitKind::Assault,
        UnitKind::Bomber,
        UnitKind::Ship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Infantry => "infantry",
            UnitKind::Artillery => "artillery",
            UnitKind::Tank => "tank",
            UnitKind::Fighter => "fighter",
            UnitKind::Assault => "assault",
            UnitKind::Bomber => "bomber",
            UnitKind::Ship => "ship",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for UnitKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        UnitKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| GameError::UnknownUnit(s.to_string()))
    }
}

/// Static properties of a unit kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub kind: UnitKind,
    pub name: String,
    /// Budget cost per unit
    pub cost: i64,
    /// Munitions consumed per unit purchased
    pub munitions: u64,
    /// Combat power per unit
    pub power: u64,
}

/// Catalog of unit kinds available for purchase
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    units: AHashMap<UnitKind, UnitSpec>,
}

impl UnitCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard price list
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        let defaults = [
            (UnitKind::Infantry, "Infantry", 1_000, 100, 1),
            (UnitKind::Artillery, "Artillery", 10_000, 500, 10),
            (UnitKind::Tank, "Tank", 50_000, 1_000, 50),
            (UnitKind::Fighter, "Fighter", 100_000, 800, 80),
            (UnitKind::Assault, "Assault aircraft", 120_000, 1_500, 100),
            (UnitKind::Bomber, "Bomber", 150_000, 2_000, 150),
            (UnitKind::Ship, "Warship", 200_000, 3_000, 200),
        ];
        for (kind, name, cost, munitions, power) in defaults {
            catalog.add(UnitSpec {
                kind,
                name: name.into(),
                cost,
                munitions,
                power,
            });
        }
        catalog
    }

    /// Add or replace a unit spec
    pub fn add(&mut self, spec: UnitSpec) {
        self.units.insert(spec.kind, spec);
    }

    pub fn get(&self, kind: UnitKind) -> Result<&UnitSpec> {
        self.units
            .get(&kind)
            .ok_or_else(|| GameError::UnknownUnit(kind.as_str().to_string()))
    }

    /// Power of one unit; kinds missing from the catalog count as zero
    pub fn power(&self, kind: UnitKind) -> u64 {
        self.units.get(&kind).map(|spec| spec.power).unwrap_or(0)
    }

    /// All specs in catalog order
    pub fn all(&self) -> Vec<&UnitSpec> {
        let mut specs: Vec<_> = self.units.values().collect();
        specs.sort_by_key(|spec| spec.kind);
        specs
    }

    /// Load units from a TOML file
    pub fn load_from_toml(path: &std::path::Path) -> std::result::Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse_toml(&content)
    }

    /// Parse units from TOML string
    pub fn parse_toml(content: &str) -> std::result::Result<Self, ConfigError> {
        let toml_data: TomlUnits =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for unit in toml_data.units {
            catalog.add(unit.into_spec()?);
        }
        Ok(catalog)
    }
}

/// TOML representation of a units file
#[derive(Debug, Deserialize)]
struct TomlUnits {
    units: Vec<TomlUnit>,
}

#[derive(Debug, Deserialize)]
struct TomlUnit {
    kind: String,
    name: String,
    cost: i64,
    #[serde(default)]
    munitions: u64,
    power: u64,
}

impl TomlUnit {
    fn into_spec(self) -> std::result::Result<UnitSpec, ConfigError> {
        let kind: UnitKind = self
            .kind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown unit kind '{}'", self.kind)))?;
        if self.cost <= 0 {
            return Err(ConfigError::Invalid(format!(
                "unit '{}' must have a positive cost",
                self.kind
            )));
        }
        Ok(UnitSpec {
            kind,
            name: self.name,
            cost: self.cost,
            munitions: self.munitions,
            power: self.power,
        })
    }
}
