//! Region control ledger
//!
//! Per-player control and damage state for the regions of the player's
//! country. The same records feed the modifier resolver, so control changes
//! take effect on the next resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Country, RegionSpec};
use crate::core::error::{GameError, Result};
use crate::modifiers::RegionContribution;

pub const MAX_DAMAGE_LEVEL: u8 = 4;

/// Control and damage state of one region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionControl {
    pub controlled: bool,
    pub damaged: bool,
    pub damage_level: u8,
}

impl RegionControl {
    pub fn intact(controlled: bool) -> Self {
        Self {
            controlled,
            damaged: false,
            damage_level: 0,
        }
    }
}

/// A region record joined with its catalog entry
#[derive(Debug, Clone, Copy)]
pub struct RegionView {
    pub spec: &'static RegionSpec,
    pub control: RegionControl,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionCounts {
    pub total: usize,
    pub controlled: usize,
    pub damaged: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLedger {
    records: BTreeMap<String, RegionControl>,
}

impl RegionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Control every catalog region of the country; existing records are kept
    ///
    /// Returns how many records were created.
    pub fn grant_country(&mut self, country: Country) -> usize {
        let mut created = 0;
        for spec in country.regions() {
            self.records.entry(spec.id.to_string()).or_insert_with(|| {
                created += 1;
                RegionControl::intact(true)
            });
        }
        created
    }

    pub fn get(&self, region: &str) -> Option<&RegionControl> {
        self.records.get(region)
    }

    /// Set control of a region, returns whether anything changed
    pub fn set_control(&mut self, country: Country, region: &str, controlled: bool) -> Result<bool> {
        let spec = country.region(region)?;
        match self.records.get_mut(spec.id) {
            Some(record) => {
                let changed = record.controlled != controlled;
                record.controlled = controlled;
                Ok(changed)
            }
            None => {
                self.records
                    .insert(spec.id.to_string(), RegionControl::intact(controlled));
                Ok(true)
            }
        }
    }

    /// Set damage of a controlled region; level 0 repairs
    pub fn set_damage(&mut self, country: Country, region: &str, level: u8) -> Result<bool> {
        if level > MAX_DAMAGE_LEVEL {
            return Err(GameError::InvalidDamageLevel(i64::from(level)));
        }
        let spec = country.region(region)?;
        let record = self
            .records
            .get_mut(spec.id)
            .filter(|r| r.controlled)
            .ok_or_else(|| GameError::NotControlled(spec.id.to_string()))?;

        let updated = RegionControl {
            controlled: true,
            damaged: level > 0,
            damage_level: level,
        };
        let changed = *record != updated;
        *record = updated;
        Ok(changed)
    }

    pub fn repair(&mut self, country: Country, region: &str) -> Result<bool> {
        self.set_damage(country, region, 0)
    }

    /// Controlled regions as resolver input
    pub fn contributions(&self, country: Option<Country>) -> Vec<RegionContribution> {
        self.view(country)
            .into_iter()
            .filter(|v| v.control.controlled)
            .map(|v| RegionContribution {
                effects: v.spec.effects,
                damaged: v.control.damaged,
                damage_level: v.control.damage_level,
            })
            .collect()
    }

    /// Records joined with catalog data, in catalog order
    pub fn view(&self, country: Option<Country>) -> Vec<RegionView> {
        let Some(country) = country else {
            return Vec::new();
        };
        country
            .regions()
            .iter()
            .filter_map(|spec| {
                self.records.get(spec.id).map(|control| RegionView {
                    spec,
                    control: *control,
                })
            })
            .collect()
    }

    pub fn counts(&self) -> RegionCounts {
        RegionCounts {
            total: self.records.len(),
            controlled: self.records.values().filter(|r| r.controlled).count(),
            damaged: self.records.values().filter(|r| r.damaged).count(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
