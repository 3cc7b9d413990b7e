//! Persistent per-player state

use serde::{Deserialize, Serialize};

use crate::catalog::{Country, PoliticalSystem};
use crate::core::types::{PlayerId, Timestamp};
use crate::production::Facility;
use crate::player::Inventory;
use crate::territory::RegionLedger;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    /// Never negative
    pub budget: i64,
    pub country: Option<Country>,
    pub political_system: Option<PoliticalSystem>,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub facilities: Vec<Facility>,
    #[serde(default)]
    pub regions: RegionLedger,
    pub created_at: Timestamp,
}

impl PlayerRecord {
    /// Fresh player with the starting budget and nothing else
    pub fn new(id: PlayerId, name: impl Into<String>, starting_budget: i64, now: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            budget: starting_budget,
            country: None,
            political_system: None,
            inventory: Inventory::new(),
            facilities: Vec::new(),
            regions: RegionLedger::new(),
            created_at: now,
        }
    }

    /// Debit the budget if it covers `amount`
    pub fn spend(&mut self, amount: i64) -> bool {
        if amount >= 0 && self.budget >= amount {
            self.budget -= amount;
            true
        } else {
            false
        }
    }

    pub fn earn(&mut self, amount: i64) {
        self.budget = self.budget.saturating_add(amount);
    }
}
