//! Plain result types returned to the command layer

use serde::Serialize;

use crate::catalog::{Country, PoliticalSystem, UnitKind};
use crate::core::types::PlayerId;
use crate::modifiers::Modifiers;
use crate::territory::RegionCounts;
use crate::combat::{BattleOutcome, BattleRecord};

/// A completed unit purchase
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub kind: UnitKind,
    pub amount: u64,
    pub cost: i64,
    pub munitions_spent: u64,
    pub budget_after: i64,
    pub munitions_after: u64,
}

/// A resolved attack: the stored record plus the full per-side breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub record: BattleRecord,
    pub outcome: BattleOutcome,
}

/// Read-only summary of a player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub id: PlayerId,
    pub name: String,
    pub budget: i64,
    pub munitions: u64,
    pub country: Option<Country>,
    pub political_system: Option<PoliticalSystem>,
    pub units: Vec<(UnitKind, u64)>,
    pub raw_power: u64,
    pub facilities: usize,
    /// Munitions per hour at the applied production modifier
    pub hourly_output: i64,
    /// Modifiers the rules currently apply
    pub modifiers: Modifiers,
    /// Modifiers with region bonuses counted in full
    pub potential: Modifiers,
    pub regions: RegionCounts,
}
