//! Modifier resolution
//!
//! Each channel multiplier is `1.0 + sum(contributions)`. Contributions come
//! from the political system and from controlled regions; a damaged region
//! contributes `max(0, 1 - level * attenuation)` of its effect. Results are
//! never clamped, so a heavy negative stack can drop below zero.

use serde::{Deserialize, Serialize};

use crate::catalog::PoliticalSystem;
use crate::core::config::EngineConfig;
use crate::core::types::{Channel, Effect};

/// Per-channel multipliers, 1.0 meaning no change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub production: f64,
    pub economy: f64,
    pub military: f64,
}

impl Modifiers {
    pub const NEUTRAL: Modifiers = Modifiers {
        production: 1.0,
        economy: 1.0,
        military: 1.0,
    };

    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Production => self.production,
            Channel::Economy => self.economy,
            Channel::Military => self.military,
        }
    }

    fn add(&mut self, channel: Channel, value: f64) {
        match channel {
            Channel::Production => self.production += value,
            Channel::Economy => self.economy += value,
            Channel::Military => self.military += value,
        }
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// One controlled region's effects and its damage state
#[derive(Debug, Clone, Copy)]
pub struct RegionContribution {
    pub effects: &'static [Effect],
    pub damaged: bool,
    pub damage_level: u8,
}

impl RegionContribution {
    /// Fraction of the region's effects still applied
    pub fn attenuation(&self, per_level: f64) -> f64 {
        if self.damaged {
            (1.0 - f64::from(self.damage_level) * per_level).max(0.0)
        } else {
            1.0
        }
    }
}

/// Turns political system and controlled regions into channel multipliers
#[derive(Debug, Clone, Copy)]
pub struct ModifierResolver {
    /// Weight on region contributions; 0.0 disables them
    region_weight: f64,
    attenuation_per_level: f64,
}

impl ModifierResolver {
    pub fn new(region_weight: f64, attenuation_per_level: f64) -> Self {
        Self {
            region_weight,
            attenuation_per_level,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.region_weight(), config.damage_attenuation_per_level)
    }

    /// Multipliers the rules actually apply
    pub fn resolve(
        &self,
        system: Option<PoliticalSystem>,
        regions: &[RegionContribution],
    ) -> Modifiers {
        self.resolve_weighted(system, regions, self.region_weight)
    }

    /// Multipliers with every controlled region counted in full weight
    pub fn resolve_potential(
        &self,
        system: Option<PoliticalSystem>,
        regions: &[RegionContribution],
    ) -> Modifiers {
        self.resolve_weighted(system, regions, 1.0)
    }

    fn resolve_weighted(
        &self,
        system: Option<PoliticalSystem>,
        regions: &[RegionContribution],
        region_weight: f64,
    ) -> Modifiers {
        let mut modifiers = Modifiers::NEUTRAL;

        if let Some(system) = system {
            for effect in system.effects() {
                modifiers.add(effect.channel, effect.value);
            }
        }

        for region in regions {
            let scale = region_weight * region.attenuation(self.attenuation_per_level);
            for effect in region.effects {
                modifiers.add(effect.channel, effect.value * scale);
            }
        }

        modifiers
    }
}

impl Default for ModifierResolver {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
