//! Inventory - a player's units and munitions

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{UnitCatalog, UnitKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Unit counts; kinds never bought are absent
    units: AHashMap<UnitKind, u64>,
    /// Munitions on hand
    pub munitions: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of one unit kind
    pub fn count(&self, kind: UnitKind) -> u64 {
        self.units.get(&kind).copied().unwrap_or(0)
    }

    pub fn add(&mut self, kind: UnitKind, amount: u64) {
        if amount == 0 {
            return;
        }
        let entry = self.units.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Remove up to `amount`, returns amount actually removed
    pub fn remove(&mut self, kind: UnitKind, amount: u64) -> u64 {
        match self.units.get_mut(&kind) {
            Some(count) => {
                let removed = amount.min(*count);
                *count -= removed;
                if *count == 0 {
                    self.units.remove(&kind);
                }
                removed
            }
            None => 0,
        }
    }

    pub fn total_units(&self) -> u64 {
        self.units.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_units() == 0
    }

    /// Non-zero counts in catalog order
    pub fn units(&self) -> Vec<(UnitKind, u64)> {
        UnitKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }

    /// Sum of count times unit power
    pub fn raw_power(&self, catalog: &UnitCatalog) -> u64 {
        self.units
            .iter()
            .map(|(kind, count)| count.saturating_mul(catalog.power(*kind)))
            .fold(0u64, u64::saturating_add)
    }

    pub fn add_munitions(&mut self, amount: u64) {
        self.munitions = self.munitions.saturating_add(amount);
    }

    /// Consume munitions if enough are on hand
    pub fn take_munitions(&mut self, amount: u64) -> bool {
        if self.munitions >= amount {
            self.munitions -= amount;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut inventory = Inventory::new();
        assert_eq!(inventory.count(UnitKind::Tank), 0);
        inventory.add(UnitKind::Tank, 3);
        inventory.add(UnitKind::Tank, 2);
        assert_eq!(inventory.count(UnitKind::Tank), 5);
        assert_eq!(inventory.total_units(), 5);
    }

    #[test]
    fn test_remove_caps_at_count() {
        let mut inventory = Inventory::new();
        inventory.add(UnitKind::Infantry, 10);
        assert_eq!(inventory.remove(UnitKind::Infantry, 3), 3);
        assert_eq!(inventory.remove(UnitKind::Infantry, 50), 7);
        assert_eq!(inventory.count(UnitKind::Infantry), 0);
        assert!(inventory.is_empty());
        assert_eq!(inventory.remove(UnitKind::Ship, 1), 0);
    }

    #[test]
    fn test_raw_power() {
        let catalog = UnitCatalog::with_defaults();
        let mut inventory = Inventory::new();
        inventory.add(UnitKind::Infantry, 10);
        inventory.add(UnitKind::Tank, 2);
        assert_eq!(inventory.raw_power(&catalog), 10 + 100);
    }

    #[test]
    fn test_units_in_catalog_order() {
        let mut inventory = Inventory::new();
        inventory.add(UnitKind::Ship, 1);
        inventory.add(UnitKind::Infantry, 4);
        assert_eq!(
            inventory.units(),
            vec![(UnitKind::Infantry, 4), (UnitKind::Ship, 1)]
        );
    }

    #[test]
    fn test_munitions() {
        let mut inventory = Inventory::new();
        inventory.add_munitions(500);
        assert!(!inventory.take_munitions(600));
        assert_eq!(inventory.munitions, 500);
        assert!(inventory.take_munitions(500));
        assert_eq!(inventory.munitions, 0);
    }
}
