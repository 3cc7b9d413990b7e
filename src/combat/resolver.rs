//! Battle resolution between two inventories
//!
//! Power is the sum of count times unit power, scaled by the side's military
//! modifier and one variance draw. The attacker needs strictly more final
//! power to win. The winner loses a fixed fraction of each unit kind
//! (floored), the loser loses everything.

use serde::{Deserialize, Serialize};

use crate::catalog::{UnitCatalog, UnitKind};
use crate::core::config::EngineConfig;
use crate::core::error::{GameError, Result};
use crate::player::Inventory;
use crate::combat::variance::VarianceSource;

/// Tunable combat constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatRules {
    pub winner_loss_fraction: f64,
    pub variance_low: f64,
    pub variance_high: f64,
}

impl CombatRules {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            winner_loss_fraction: config.winner_loss_fraction,
            variance_low: config.variance_low,
            variance_high: config.variance_high,
        }
    }
}

impl Default for CombatRules {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// One participant as the resolver sees it
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub inventory: &'a Inventory,
    pub military_modifier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Victor {
    Attacker,
    Defender,
}

/// Per-side numbers of a resolved battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideReport {
    /// Power before modifiers and losses
    pub raw_power: u64,
    pub variance: f64,
    pub final_power: f64,
    /// Units lost per kind, zero entries omitted
    pub losses: Vec<(UnitKind, u64)>,
    pub total_losses: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub victor: Victor,
    pub attacker: SideReport,
    pub defender: SideReport,
}

impl BattleOutcome {
    pub fn attacker_won(&self) -> bool {
        self.victor == Victor::Attacker
    }
}

/// Losses for every kind present in the inventory
fn compute_losses(inventory: &Inventory, won: bool, fraction: f64) -> Vec<(UnitKind, u64)> {
    inventory
        .units()
        .into_iter()
        .map(|(kind, count)| {
            let lost = if won {
                ((count as f64 * fraction).floor() as u64).min(count)
            } else {
                count
            };
            (kind, lost)
        })
        .filter(|(_, lost)| *lost > 0)
        .collect()
}

fn report(raw_power: u64, variance: f64, final_power: f64, losses: Vec<(UnitKind, u64)>) -> SideReport {
    let total_losses = losses.iter().map(|(_, lost)| lost).sum();
    SideReport {
        raw_power,
        variance,
        final_power,
        losses,
        total_losses,
    }
}

/// Resolve a battle without mutating either side
///
/// Fails with `NoForces` when the attacker has no units. Draws attacker
/// variance first, then defender.
pub fn resolve_battle(
    catalog: &UnitCatalog,
    attacker: Side<'_>,
    defender: Side<'_>,
    rules: &CombatRules,
    variance: &mut dyn VarianceSource,
) -> Result<BattleOutcome> {
    if attacker.inventory.is_empty() {
        return Err(GameError::NoForces);
    }

    let attacker_raw = attacker.inventory.raw_power(catalog);
    let defender_raw = defender.inventory.raw_power(catalog);

    let attacker_variance = variance.draw(rules.variance_low, rules.variance_high);
    let defender_variance = variance.draw(rules.variance_low, rules.variance_high);

    let attacker_final = attacker_raw as f64 * attacker.military_modifier * attacker_variance;
    let defender_final = defender_raw as f64 * defender.military_modifier * defender_variance;

    // Ties go to the defender
    let victor = if attacker_final > defender_final {
        Victor::Attacker
    } else {
        Victor::Defender
    };

    let attacker_won = victor == Victor::Attacker;
    let fraction = rules.winner_loss_fraction;

    Ok(BattleOutcome {
        victor,
        attacker: report(
            attacker_raw,
            attacker_variance,
            attacker_final,
            compute_losses(attacker.inventory, attacker_won, fraction),
        ),
        defender: report(
            defender_raw,
            defender_variance,
            defender_final,
            compute_losses(defender.inventory, !attacker_won, fraction),
        ),
    })
}

/// Remove reported losses from an inventory
pub fn apply_losses(inventory: &mut Inventory, losses: &[(UnitKind, u64)]) {
    for (kind, lost) in losses {
        inventory.remove(*kind, *lost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::variance::{FixedVariance, ScriptedVariance};

    fn army(units: &[(UnitKind, u64)]) -> Inventory {
        let mut inventory = Inventory::new();
        for (kind, count) in units {
            inventory.add(*kind, *count);
        }
        inventory
    }

    fn side(inventory: &Inventory) -> Side<'_> {
        Side {
            inventory,
            military_modifier: 1.0,
        }
    }

    #[test]
    fn test_infantry_loses_to_tank() {
        let catalog = UnitCatalog::with_defaults();
        let mut attacker = army(&[(UnitKind::Infantry, 10)]);
        let mut defender = army(&[(UnitKind::Tank, 1)]);

        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            side(&defender),
            &CombatRules::default(),
            &mut FixedVariance(1.0),
        )
        .unwrap();

        assert_eq!(outcome.victor, Victor::Defender);
        assert_eq!(outcome.attacker.raw_power, 10);
        assert_eq!(outcome.defender.raw_power, 50);
        assert_eq!(outcome.attacker.total_losses, 10);
        // floor(1 * 0.3) = 0
        assert_eq!(outcome.defender.total_losses, 0);

        apply_losses(&mut attacker, &outcome.attacker.losses);
        apply_losses(&mut defender, &outcome.defender.losses);
        assert_eq!(attacker.count(UnitKind::Infantry), 0);
        assert_eq!(defender.count(UnitKind::Tank), 1);
    }

    #[test]
    fn test_tie_goes_to_defender() {
        let catalog = UnitCatalog::with_defaults();
        let attacker = army(&[(UnitKind::Artillery, 5)]);
        let defender = army(&[(UnitKind::Tank, 1)]);

        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            side(&defender),
            &CombatRules::default(),
            &mut FixedVariance(1.0),
        )
        .unwrap();
        assert_eq!(outcome.victor, Victor::Defender);
    }

    #[test]
    fn test_winner_loses_thirty_percent_per_kind() {
        let catalog = UnitCatalog::with_defaults();
        let attacker = army(&[(UnitKind::Infantry, 10), (UnitKind::Tank, 7)]);
        let defender = army(&[(UnitKind::Infantry, 5)]);

        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            side(&defender),
            &CombatRules::default(),
            &mut FixedVariance(1.0),
        )
        .unwrap();

        assert!(outcome.attacker_won());
        assert_eq!(
            outcome.attacker.losses,
            vec![(UnitKind::Infantry, 3), (UnitKind::Tank, 2)]
        );
        assert_eq!(outcome.attacker.total_losses, 5);
        assert_eq!(outcome.defender.losses, vec![(UnitKind::Infantry, 5)]);
    }

    #[test]
    fn test_empty_defender_loses() {
        let catalog = UnitCatalog::with_defaults();
        let attacker = army(&[(UnitKind::Infantry, 1)]);
        let defender = Inventory::new();

        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            side(&defender),
            &CombatRules::default(),
            &mut FixedVariance(0.8),
        )
        .unwrap();
        assert!(outcome.attacker_won());
        assert_eq!(outcome.defender.total_losses, 0);
    }

    #[test]
    fn test_no_forces() {
        let catalog = UnitCatalog::with_defaults();
        let empty = Inventory::new();
        let defender = army(&[(UnitKind::Tank, 1)]);
        let result = resolve_battle(
            &catalog,
            side(&empty),
            side(&defender),
            &CombatRules::default(),
            &mut FixedVariance(1.0),
        );
        assert!(matches!(result, Err(GameError::NoForces)));
    }

    #[test]
    fn test_variance_and_modifier_swing_result() {
        let catalog = UnitCatalog::with_defaults();
        let attacker = army(&[(UnitKind::Infantry, 45)]);
        let defender = army(&[(UnitKind::Tank, 1)]);

        // 45 * 1.2 = 54 beats 50 * 0.8 = 40
        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            side(&defender),
            &CombatRules::default(),
            &mut ScriptedVariance::new([1.2, 0.8]),
        )
        .unwrap();
        assert!(outcome.attacker_won());
        assert_eq!(outcome.attacker.variance, 1.2);

        // A defender military modifier of 1.5 turns it around: 54 < 60
        let outcome = resolve_battle(
            &catalog,
            side(&attacker),
            Side {
                inventory: &defender,
                military_modifier: 1.5,
            },
            &CombatRules::default(),
            &mut ScriptedVariance::new([1.2, 0.8]),
        )
        .unwrap();
        assert_eq!(outcome.victor, Victor::Defender);
    }
}
