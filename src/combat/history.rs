//! Battle history - append-only log of resolved battles

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, PlayerId, Timestamp};
use crate::combat::resolver::{BattleOutcome, Victor};

/// One resolved battle as stored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleRecord {
    pub id: BattleId,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    /// Raw power before losses
    pub attacker_power: u64,
    pub defender_power: u64,
    pub attacker_losses: u64,
    pub defender_losses: u64,
    pub winner: PlayerId,
    pub timestamp: Timestamp,
}

impl BattleRecord {
    pub fn from_outcome(
        attacker: PlayerId,
        defender: PlayerId,
        outcome: &BattleOutcome,
        timestamp: Timestamp,
    ) -> Self {
        let winner = match outcome.victor {
            Victor::Attacker => attacker,
            Victor::Defender => defender,
        };
        Self {
            id: BattleId::new(),
            attacker,
            defender,
            attacker_power: outcome.attacker.raw_power,
            defender_power: outcome.defender.raw_power,
            attacker_losses: outcome.attacker.total_losses,
            defender_losses: outcome.defender.total_losses,
            winner,
            timestamp,
        }
    }

    pub fn involves(&self, player: PlayerId) -> bool {
        self.attacker == player || self.defender == player
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BattleHistory {
    records: Vec<BattleRecord>,
}

impl BattleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<BattleRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: BattleRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> &[BattleRecord] {
        &self.records
    }

    /// Battles the player fought on either side, newest first
    pub fn for_player(&self, player: PlayerId, limit: usize) -> Vec<BattleRecord> {
        let mut battles: Vec<_> = self
            .records
            .iter()
            .rev()
            .filter(|r| r.involves(player))
            .cloned()
            .collect();
        // Later appends win ties on equal timestamps
        battles.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        battles.truncate(limit);
        battles
    }
}
