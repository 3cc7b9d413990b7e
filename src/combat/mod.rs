//! Combat between players

pub mod history;
pub mod resolver;
pub mod variance;

pub use history::{BattleHistory, BattleRecord};
pub use resolver::{apply_losses, resolve_battle, BattleOutcome, CombatRules, Side, SideReport, Victor};
pub use variance::{FixedVariance, ScriptedVariance, SeededVariance, VarianceSource};
