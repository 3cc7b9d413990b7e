//! Player store - per-player locking over a persistence backend
//!
//! Each player lives behind its own mutex. Mutations run on a clone of the
//! record; the clone replaces the stored record only after the closure
//! succeeds and the backend has persisted it. Two-player mutations lock in
//! ascending id order.

pub mod backend;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use ahash::AHashMap;
use tracing::warn;

use crate::core::error::{GameError, Result};
use crate::core::types::PlayerId;
use crate::player::PlayerRecord;
use crate::combat::{BattleHistory, BattleRecord};

pub use backend::{Backend, Batch, JsonFileBackend, MemoryBackend, Snapshot};

type Slot = Arc<Mutex<Option<PlayerRecord>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<PlayerRecord>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PlayerStore {
    players: RwLock<AHashMap<PlayerId, Slot>>,
    history: Mutex<BattleHistory>,
    backend: Box<dyn Backend>,
}

impl PlayerStore {
    /// In-memory store with no prior state
    pub fn in_memory() -> Self {
        Self {
            players: RwLock::new(AHashMap::new()),
            history: Mutex::new(BattleHistory::new()),
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Store seeded with whatever the backend already holds
    pub fn open(backend: Box<dyn Backend>) -> Result<Self> {
        let snapshot = backend.load()?;
        let players = snapshot
            .players
            .into_iter()
            .map(|p| (p.id, Arc::new(Mutex::new(Some(p)))))
            .collect();
        Ok(Self {
            players: RwLock::new(players),
            history: Mutex::new(BattleHistory::from_records(snapshot.battles)),
            backend,
        })
    }

    fn slot(&self, id: PlayerId) -> Slot {
        if let Some(slot) = self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(slot);
        }
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(players.entry(id).or_insert_with(|| Arc::new(Mutex::new(None))))
    }

    /// Forget the slot of a player that was never created
    ///
    /// Called with the slot still locked. A slot is only dropped while the
    /// map and the caller hold the sole references, so no other caller can be
    /// waiting on it.
    fn discard_if_vacant(&self, id: PlayerId, slot: &Slot, record: &Option<PlayerRecord>) {
        if record.is_some() {
            return;
        }
        let mut players = self.players.write().unwrap_or_else(PoisonError::into_inner);
        let vacant = Arc::strong_count(slot) == 2
            && players.get(&id).map_or(false, |live| Arc::ptr_eq(live, slot));
        if vacant {
            players.remove(&id);
        }
    }

    /// Snapshot of a player, if one has been created
    pub fn get(&self, id: PlayerId) -> Option<PlayerRecord> {
        let slot = self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()?;
        let guard = lock(&slot);
        guard.clone()
    }

    /// Ids of every created player, ascending
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let slots: Vec<(PlayerId, Slot)> = self
            .players
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, slot)| (*id, Arc::clone(slot)))
            .collect();
        let mut ids: Vec<_> = slots
            .into_iter()
            .filter(|(_, slot)| lock(slot).is_some())
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    fn persist(&self, batch: &Batch<'_>) -> Result<()> {
        self.backend.commit(batch).map_err(|e| {
            warn!(error = %e, "persistence failed, change discarded");
            e
        })
    }

    /// Create the player from `seed` unless it exists; returns the record and
    /// whether it was created
    pub fn ensure(
        &self,
        id: PlayerId,
        seed: impl FnOnce() -> PlayerRecord,
    ) -> Result<(PlayerRecord, bool)> {
        let slot = self.slot(id);
        let mut guard = lock(&slot);
        if let Some(existing) = guard.as_ref() {
            return Ok((existing.clone(), false));
        }
        let record = seed();
        if let Err(e) = self.persist(&Batch {
            players: vec![&record],
            battle: None,
        }) {
            self.discard_if_vacant(id, &slot, &guard);
            return Err(e);
        }
        *guard = Some(record.clone());
        Ok((record, true))
    }

    /// Read-modify-write one player
    ///
    /// Unknown players start from `seed`. Nothing is stored when `f` or the
    /// backend fails.
    pub fn update<T>(
        &self,
        id: PlayerId,
        seed: impl FnOnce() -> PlayerRecord,
        f: impl FnOnce(&mut PlayerRecord) -> Result<T>,
    ) -> Result<T> {
        let slot = self.slot(id);
        let mut guard = lock(&slot);
        let mut working = guard.clone().unwrap_or_else(seed);
        let outcome = match f(&mut working) {
            Ok(value) => self
                .persist(&Batch {
                    players: vec![&working],
                    battle: None,
                })
                .map(|()| value),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(value) => {
                *guard = Some(working);
                Ok(value)
            }
            Err(e) => {
                self.discard_if_vacant(id, &slot, &guard);
                Err(e)
            }
        }
    }

    /// Read-modify-write two distinct players and optionally log a battle
    pub fn update_pair<T>(
        &self,
        first: PlayerId,
        second: PlayerId,
        seed: impl Fn(PlayerId) -> PlayerRecord,
        f: impl FnOnce(&mut PlayerRecord, &mut PlayerRecord) -> Result<(T, Option<BattleRecord>)>,
    ) -> Result<T> {
        if first == second {
            return Err(GameError::SelfTarget);
        }

        let first_slot = self.slot(first);
        let second_slot = self.slot(second);
        let (mut first_guard, mut second_guard) = if first < second {
            let a = lock(&first_slot);
            let b = lock(&second_slot);
            (a, b)
        } else {
            let b = lock(&second_slot);
            let a = lock(&first_slot);
            (a, b)
        };

        let mut first_working = first_guard.clone().unwrap_or_else(|| seed(first));
        let mut second_working = second_guard.clone().unwrap_or_else(|| seed(second));

        let outcome = match f(&mut first_working, &mut second_working) {
            Ok((value, battle)) => self
                .persist(&Batch {
                    players: vec![&first_working, &second_working],
                    battle: battle.as_ref(),
                })
                .map(|()| (value, battle)),
            Err(e) => Err(e),
        };
        let (value, battle) = match outcome {
            Ok(done) => done,
            Err(e) => {
                self.discard_if_vacant(first, &first_slot, &first_guard);
                self.discard_if_vacant(second, &second_slot, &second_guard);
                return Err(e);
            }
        };

        *first_guard = Some(first_working);
        *second_guard = Some(second_working);
        if let Some(battle) = battle {
            self.history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .append(battle);
        }
        Ok(value)
    }

    /// Battles involving the player, newest first
    pub fn battles_for(&self, id: PlayerId, limit: usize) -> Vec<BattleRecord> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .for_player(id, limit)
    }

    pub fn battle_count(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
