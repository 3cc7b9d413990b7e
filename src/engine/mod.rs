//! Engine facade - the operations the command layer calls
//!
//! Every operation validates its inputs, then runs a read-modify-write
//! through the player store. Privileged operations check the injected
//! authorization policy before touching any state.

pub mod auth;
pub mod report;

use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::catalog::{Country, PoliticalSystem, UnitCatalog, UnitKind};
use crate::combat::{
    apply_losses, resolve_battle, BattleRecord, CombatRules, SeededVariance, Side, VarianceSource,
};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::EngineConfig;
use crate::core::error::{GameError, Result};
use crate::core::types::PlayerId;
use crate::modifiers::{ModifierResolver, Modifiers};
use crate::player::PlayerRecord;
use crate::production::{self, Facility};
use crate::store::{Backend, JsonFileBackend, MemoryBackend, PlayerStore};
use crate::territory::{RegionView, MAX_DAMAGE_LEVEL};

pub use auth::{AllowList, AuthorizationPolicy};
pub use report::{BattleReport, Overview, Receipt};

pub struct Engine {
    config: EngineConfig,
    units: UnitCatalog,
    resolver: ModifierResolver,
    rules: CombatRules,
    store: PlayerStore,
    auth: Box<dyn AuthorizationPolicy>,
    clock: Box<dyn Clock>,
    variance: Mutex<Box<dyn VarianceSource>>,
}

impl Engine {
    /// Engine with a JSON file backend when `data_dir` is set, in memory otherwise
    pub fn new(config: EngineConfig) -> Result<Self> {
        let backend: Box<dyn Backend> = match &config.data_dir {
            Some(dir) => Box::new(JsonFileBackend::open(dir)?),
            None => Box::new(MemoryBackend::new()),
        };
        Self::with_backend(config, backend)
    }

    /// Engine over an explicit backend, restoring whatever it holds
    pub fn with_backend(config: EngineConfig, backend: Box<dyn Backend>) -> Result<Self> {
        config.validate()?;
        let store = PlayerStore::open(backend)?;
        info!(
            players = store.player_ids().len(),
            battles = store.battle_count(),
            "engine ready"
        );
        Ok(Self {
            units: UnitCatalog::with_defaults(),
            resolver: ModifierResolver::from_config(&config),
            rules: CombatRules::from_config(&config),
            auth: Box::new(AllowList::from_config(&config.privileged_players)),
            clock: Box::new(SystemClock),
            variance: Mutex::new(Box::new(SeededVariance::from_entropy())),
            store,
            config,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_variance(mut self, variance: impl VarianceSource + 'static) -> Self {
        self.variance = Mutex::new(Box::new(variance));
        self
    }

    pub fn with_authorization(mut self, policy: impl AuthorizationPolicy + 'static) -> Self {
        self.auth = Box::new(policy);
        self
    }

    pub fn with_units(mut self, units: UnitCatalog) -> Self {
        self.units = units;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn units(&self) -> &UnitCatalog {
        &self.units
    }

    // === HELPERS ===

    fn seed(&self, id: PlayerId) -> PlayerRecord {
        PlayerRecord::new(id, id.to_string(), self.config.starting_budget, self.clock.now())
    }

    fn modifiers_for(&self, player: &PlayerRecord) -> Modifiers {
        self.resolver.resolve(
            player.political_system,
            &player.regions.contributions(player.country),
        )
    }

    fn require_privileged(&self, actor: PlayerId, operation: &str) -> Result<()> {
        if self.auth.is_privileged(actor) {
            Ok(())
        } else {
            warn!(actor = %actor, operation, "rejected privileged call");
            Err(GameError::Unauthorized(actor))
        }
    }

    fn positive(amount: i64) -> Result<u64> {
        if amount > 0 {
            Ok(amount as u64)
        } else {
            Err(GameError::InvalidAmount(amount))
        }
    }

    fn update<T>(
        &self,
        player: PlayerId,
        f: impl FnOnce(&mut PlayerRecord) -> Result<T>,
    ) -> Result<T> {
        self.store.update(player, || self.seed(player), f)
    }

    // === PLAYER OPERATIONS ===

    /// Create the player on first interaction; existing players are returned as-is
    pub fn ensure_player(&self, player: PlayerId, name: &str) -> Result<PlayerRecord> {
        let (record, created) = self.store.ensure(player, || {
            PlayerRecord::new(player, name, self.config.starting_budget, self.clock.now())
        })?;
        if created {
            info!(player = %player, name, "player created");
        }
        Ok(record)
    }

    /// Current state, or the defaults of a new player when unknown
    pub fn player(&self, player: PlayerId) -> PlayerRecord {
        self.store.get(player).unwrap_or_else(|| self.seed(player))
    }

    pub fn select_country(&self, player: PlayerId, name: &str) -> Result<Country> {
        let country: Country = name.parse()?;
        let granted = self.update(player, |p| {
            if let Some(existing) = p.country {
                return Err(GameError::AlreadySet(existing));
            }
            p.country = Some(country);
            Ok(p.regions.grant_country(country))
        })?;
        info!(player = %player, country = %country, regions = granted, "country selected");
        Ok(country)
    }

    pub fn buy_units(&self, player: PlayerId, kind: &str, amount: i64) -> Result<Receipt> {
        let amount = Self::positive(amount)?;
        let kind: UnitKind = kind.parse()?;
        let spec = self.units.get(kind)?;

        let receipt = self.update(player, |p| {
            if p.country.is_none() {
                return Err(GameError::NoCountry);
            }

            let cost = i64::try_from(amount)
                .ok()
                .and_then(|n| spec.cost.checked_mul(n))
                .ok_or(GameError::InsufficientFunds {
                    required: i64::MAX,
                    available: p.budget,
                })?;
            if p.budget < cost {
                return Err(GameError::InsufficientFunds {
                    required: cost,
                    available: p.budget,
                });
            }

            let munitions = spec
                .munitions
                .checked_mul(amount)
                .ok_or(GameError::InsufficientResource {
                    required: u64::MAX,
                    available: p.inventory.munitions,
                })?;
            if !p.inventory.take_munitions(munitions) {
                return Err(GameError::InsufficientResource {
                    required: munitions,
                    available: p.inventory.munitions,
                });
            }

            p.budget -= cost;
            p.inventory.add(kind, amount);

            Ok(Receipt {
                kind,
                amount,
                cost,
                munitions_spent: munitions,
                budget_after: p.budget,
                munitions_after: p.inventory.munitions,
            })
        })?;

        info!(player = %player, kind = %kind, amount, cost = receipt.cost, "units purchased");
        Ok(receipt)
    }

    pub fn build_facility(&self, player: PlayerId) -> Result<Facility> {
        let cost = self.config.factory_cost;
        let now = self.clock.now();
        let facility = self.update(player, |p| {
            if p.country.is_none() {
                return Err(GameError::NoCountry);
            }
            if !p.spend(cost) {
                return Err(GameError::InsufficientFunds {
                    required: cost,
                    available: p.budget,
                });
            }
            let facility = Facility::new(self.config.factory_rate, now);
            p.facilities.push(facility.clone());
            Ok(facility)
        })?;
        info!(player = %player, facility = %facility.id.0, "facility built");
        Ok(facility)
    }

    /// Pay out all facilities into munitions; returns the amount collected
    pub fn collect_production(&self, player: PlayerId) -> Result<i64> {
        let has_facilities = self
            .store
            .get(player)
            .map(|p| !p.facilities.is_empty())
            .unwrap_or(false);
        if !has_facilities {
            return Ok(0);
        }

        let now = self.clock.now();
        let collected = self.update(player, |p| {
            let modifier = self.modifiers_for(p).production;
            let collection = production::collect(&mut p.facilities, now, modifier);
            debug!(player = %p.id, modifier, facilities = collection.per_facility.len(), "accrued production");
            p.inventory.add_munitions(collection.total.max(0) as u64);
            Ok(collection.total)
        })?;
        info!(player = %player, amount = collected, "production collected");
        Ok(collected)
    }

    pub fn attack(&self, attacker: PlayerId, defender: PlayerId) -> Result<BattleReport> {
        if attacker == defender {
            return match self.player(attacker).country {
                None => Err(GameError::NoCountry),
                Some(_) => Err(GameError::SelfTarget),
            };
        }

        let now = self.clock.now();
        let report = self.store.update_pair(
            attacker,
            defender,
            |id| self.seed(id),
            |a, d| {
                if a.country.is_none() {
                    return Err(GameError::NoCountry);
                }
                if d.country.is_none() {
                    return Err(GameError::TargetNoCountry);
                }

                let attacker_side = Side {
                    inventory: &a.inventory,
                    military_modifier: self.modifiers_for(a).military,
                };
                let defender_side = Side {
                    inventory: &d.inventory,
                    military_modifier: self.modifiers_for(d).military,
                };

                let outcome = {
                    let mut variance = self.variance.lock().unwrap_or_else(PoisonError::into_inner);
                    resolve_battle(
                        &self.units,
                        attacker_side,
                        defender_side,
                        &self.rules,
                        &mut **variance,
                    )?
                };
                debug!(
                    attacker_final = outcome.attacker.final_power,
                    defender_final = outcome.defender.final_power,
                    "battle powers"
                );

                apply_losses(&mut a.inventory, &outcome.attacker.losses);
                apply_losses(&mut d.inventory, &outcome.defender.losses);

                let record = BattleRecord::from_outcome(a.id, d.id, &outcome, now);
                Ok((
                    BattleReport {
                        record: record.clone(),
                        outcome,
                    },
                    Some(record),
                ))
            },
        )?;

        info!(
            attacker = %attacker,
            defender = %defender,
            winner = %report.record.winner,
            attacker_losses = report.record.attacker_losses,
            defender_losses = report.record.defender_losses,
            "battle resolved"
        );
        Ok(report)
    }

    /// Battles the player fought, newest first; `None` uses the configured limit
    pub fn battle_history(&self, player: PlayerId, limit: Option<usize>) -> Vec<BattleRecord> {
        self.store
            .battles_for(player, limit.unwrap_or(self.config.history_limit))
    }

    pub fn regions(&self, player: PlayerId) -> Vec<RegionView> {
        let record = self.player(player);
        record.regions.view(record.country)
    }

    pub fn overview(&self, player: PlayerId) -> Overview {
        let p = self.player(player);
        let contributions = p.regions.contributions(p.country);
        let modifiers = self.resolver.resolve(p.political_system, &contributions);
        let potential = self.resolver.resolve_potential(p.political_system, &contributions);
        debug!(player = %player, ?modifiers, ?potential, "resolved modifiers");

        Overview {
            id: p.id,
            name: p.name.clone(),
            budget: p.budget,
            munitions: p.inventory.munitions,
            country: p.country,
            political_system: p.political_system,
            units: p.inventory.units(),
            raw_power: p.inventory.raw_power(&self.units),
            facilities: p.facilities.len(),
            hourly_output: production::hourly_output(&p.facilities, modifiers.production),
            modifiers,
            potential,
            regions: p.regions.counts(),
        }
    }

    // === PRIVILEGED OPERATIONS ===

    pub fn set_political_system(
        &self,
        actor: PlayerId,
        player: PlayerId,
        system: &str,
    ) -> Result<PoliticalSystem> {
        self.require_privileged(actor, "set_political_system")?;
        let system: PoliticalSystem = system.parse()?;
        self.update(player, |p| {
            p.political_system = Some(system);
            Ok(())
        })?;
        info!(actor = %actor, player = %player, system = system.id(), "political system set");
        Ok(system)
    }

    /// Returns whether the control flag changed
    pub fn set_region_control(
        &self,
        actor: PlayerId,
        player: PlayerId,
        region: &str,
        controlled: bool,
    ) -> Result<bool> {
        self.require_privileged(actor, "set_region_control")?;
        let changed = self.update(player, |p| {
            let country = p.country.ok_or(GameError::NoCountry)?;
            p.regions.set_control(country, region, controlled)
        })?;
        info!(actor = %actor, player = %player, region, controlled, changed, "region control set");
        Ok(changed)
    }

    /// Level 0 repairs; returns whether the record changed
    pub fn set_region_damage(
        &self,
        actor: PlayerId,
        player: PlayerId,
        region: &str,
        level: i64,
    ) -> Result<bool> {
        self.require_privileged(actor, "set_region_damage")?;
        let level = u8::try_from(level)
            .ok()
            .filter(|l| *l <= MAX_DAMAGE_LEVEL)
            .ok_or(GameError::InvalidDamageLevel(level))?;
        let changed = self.update(player, |p| {
            let country = p.country.ok_or(GameError::NoCountry)?;
            p.regions.set_damage(country, region, level)
        })?;
        info!(actor = %actor, player = %player, region, level, changed, "region damage set");
        Ok(changed)
    }

    pub fn repair_region(&self, actor: PlayerId, player: PlayerId, region: &str) -> Result<bool> {
        self.set_region_damage(actor, player, region, 0)
    }

    /// Returns the new budget
    pub fn grant_money(&self, actor: PlayerId, player: PlayerId, amount: i64) -> Result<i64> {
        self.require_privileged(actor, "grant_money")?;
        let amount = Self::positive(amount)? as i64;
        let budget = self.update(player, |p| {
            p.earn(amount);
            Ok(p.budget)
        })?;
        info!(actor = %actor, player = %player, amount, budget, "money granted");
        Ok(budget)
    }

    pub fn set_money(&self, actor: PlayerId, player: PlayerId, amount: i64) -> Result<i64> {
        self.require_privileged(actor, "set_money")?;
        if amount < 0 {
            return Err(GameError::InvalidAmount(amount));
        }
        self.update(player, |p| {
            p.budget = amount;
            Ok(())
        })?;
        info!(actor = %actor, player = %player, amount, "money set");
        Ok(amount)
    }

    /// Returns the new munitions total
    pub fn grant_munitions(&self, actor: PlayerId, player: PlayerId, amount: i64) -> Result<u64> {
        self.require_privileged(actor, "grant_munitions")?;
        let amount = Self::positive(amount)?;
        let munitions = self.update(player, |p| {
            p.inventory.add_munitions(amount);
            Ok(p.inventory.munitions)
        })?;
        info!(actor = %actor, player = %player, amount, munitions, "munitions granted");
        Ok(munitions)
    }

    /// Override the player's country; switching country drops the old regions
    pub fn set_country(&self, actor: PlayerId, player: PlayerId, country: &str) -> Result<Country> {
        self.require_privileged(actor, "set_country")?;
        let country: Country = country.parse()?;
        self.update(player, |p| {
            if p.country != Some(country) {
                p.regions.clear();
            }
            p.country = Some(country);
            p.regions.grant_country(country);
            Ok(())
        })?;
        info!(actor = %actor, player = %player, country = %country, "country overridden");
        Ok(country)
    }

    /// Clear the player's country so it can be chosen again; returns the old one
    pub fn reset_country(&self, actor: PlayerId, player: PlayerId) -> Result<Option<Country>> {
        self.require_privileged(actor, "reset_country")?;
        let previous = self.update(player, |p| {
            p.regions.clear();
            Ok(p.country.take())
        })?;
        info!(actor = %actor, player = %player, previous = ?previous, "country reset");
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::combat::FixedVariance;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    const ADMIN: PlayerId = PlayerId(1);
    const ALICE: PlayerId = PlayerId(10);
    const BOB: PlayerId = PlayerId(20);

    fn engine() -> (Engine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let config = EngineConfig {
            privileged_players: vec![ADMIN.0],
            ..EngineConfig::default()
        };
        let engine = Engine::new(config)
            .unwrap()
            .with_clock(Arc::clone(&clock))
            .with_variance(FixedVariance(1.0));
        (engine, clock)
    }

    #[test]
    fn test_unknown_player_reads_defaults() {
        let (engine, _) = engine();
        let overview = engine.overview(ALICE);
        assert_eq!(overview.budget, 1_000_000);
        assert!(overview.country.is_none());
        assert!(overview.units.is_empty());
        assert!(engine.store.get(ALICE).is_none());
    }

    #[test]
    fn test_select_country_once() {
        let (engine, _) = engine();
        assert_eq!(engine.select_country(ALICE, "Ukraine").unwrap(), Country::Ukraine);
        assert!(matches!(
            engine.select_country(ALICE, "Russia"),
            Err(GameError::AlreadySet(Country::Ukraine))
        ));
        assert!(matches!(
            engine.select_country(BOB, "Mordor"),
            Err(GameError::InvalidCountry(_))
        ));
        assert_eq!(engine.regions(ALICE).len(), 27);
    }

    #[test]
    fn test_buy_units_requires_country() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.buy_units(ALICE, "infantry", 1),
            Err(GameError::NoCountry)
        ));
        assert!(matches!(
            engine.buy_units(ALICE, "infantry", 0),
            Err(GameError::InvalidAmount(0))
        ));
        assert!(matches!(
            engine.buy_units(ALICE, "wizard", 1),
            Err(GameError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_buy_units_debits_budget_and_munitions() {
        let (engine, _) = engine();
        engine.select_country(ALICE, "Russia").unwrap();
        engine.grant_munitions(ADMIN, ALICE, 1000).unwrap();

        let receipt = engine.buy_units(ALICE, "infantry", 5).unwrap();
        assert_eq!(receipt.cost, 5000);
        assert_eq!(receipt.munitions_spent, 500);
        assert_eq!(receipt.budget_after, 995_000);
        assert_eq!(receipt.munitions_after, 500);

        assert!(matches!(
            engine.buy_units(ALICE, "infantry", 6),
            Err(GameError::InsufficientResource { required: 600, available: 500 })
        ));
        assert_eq!(engine.player(ALICE).inventory.count(UnitKind::Infantry), 5);
    }

    #[test]
    fn test_buy_units_overflow_is_insufficient_funds() {
        let (engine, _) = engine();
        engine.select_country(ALICE, "Belarus").unwrap();
        assert!(matches!(
            engine.buy_units(ALICE, "ship", i64::MAX),
            Err(GameError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_collect_with_democracy() {
        let (engine, clock) = engine();
        engine.select_country(ALICE, "Ukraine").unwrap();
        engine.set_political_system(ADMIN, ALICE, "democracy").unwrap();
        engine.build_facility(ALICE).unwrap();

        clock.advance(Duration::hours(1));
        assert_eq!(engine.collect_production(ALICE).unwrap(), 1100);
        assert_eq!(engine.collect_production(ALICE).unwrap(), 0);
        assert_eq!(engine.player(ALICE).inventory.munitions, 1100);
        assert_eq!(engine.overview(ALICE).hourly_output, 1100);
    }

    #[test]
    fn test_collect_without_facilities() {
        let (engine, _) = engine();
        assert_eq!(engine.collect_production(ALICE).unwrap(), 0);
        assert!(engine.store.get(ALICE).is_none());
    }

    #[test]
    fn test_privileged_ops_require_admin() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.grant_money(ALICE, ALICE, 100),
            Err(GameError::Unauthorized(ALICE))
        ));
        assert!(matches!(
            engine.set_political_system(BOB, ALICE, "monarchy"),
            Err(GameError::Unauthorized(BOB))
        ));
        assert!(engine.store.get(ALICE).is_none());
    }

    #[test]
    fn test_money_admin() {
        let (engine, _) = engine();
        assert_eq!(engine.grant_money(ADMIN, ALICE, 500).unwrap(), 1_000_500);
        assert!(matches!(
            engine.grant_money(ADMIN, ALICE, -1),
            Err(GameError::InvalidAmount(-1))
        ));
        assert_eq!(engine.set_money(ADMIN, ALICE, 0).unwrap(), 0);
        assert!(matches!(
            engine.set_money(ADMIN, ALICE, -5),
            Err(GameError::InvalidAmount(-5))
        ));
        assert_eq!(engine.player(ALICE).budget, 0);
    }

    #[test]
    fn test_region_damage_validation_order() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.set_region_damage(ADMIN, ALICE, "lviv", 7),
            Err(GameError::InvalidDamageLevel(7))
        ));
        assert!(matches!(
            engine.set_region_damage(ADMIN, ALICE, "lviv", 2),
            Err(GameError::NoCountry)
        ));
        engine.select_country(ALICE, "Ukraine").unwrap();
        assert!(matches!(
            engine.set_region_damage(ADMIN, ALICE, "atlantis", 2),
            Err(GameError::UnknownRegion(_))
        ));
        assert!(engine.set_region_damage(ADMIN, ALICE, "lviv", 2).unwrap());
        assert!(engine.repair_region(ADMIN, ALICE, "lviv").unwrap());
    }

    #[test]
    fn test_set_and_reset_country() {
        let (engine, _) = engine();
        engine.select_country(ALICE, "Ukraine").unwrap();
        engine.set_country(ADMIN, ALICE, "Russia").unwrap();
        assert_eq!(engine.player(ALICE).country, Some(Country::Russia));
        assert!(engine.regions(ALICE).is_empty());
        assert!(engine.player(ALICE).regions.is_empty());

        assert_eq!(
            engine.reset_country(ADMIN, ALICE).unwrap(),
            Some(Country::Russia)
        );
        assert_eq!(engine.select_country(ALICE, "Ukraine").unwrap(), Country::Ukraine);
        assert_eq!(engine.regions(ALICE).len(), 27);
    }
}
