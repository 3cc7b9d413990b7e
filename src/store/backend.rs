//! Persistence backends
//!
//! The store hands every validated mutation to a backend before committing
//! it in memory. A backend error aborts the operation.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::Result;
use crate::core::types::PlayerId;
use crate::player::PlayerRecord;
use crate::combat::BattleRecord;

/// Records changed by one operation
#[derive(Debug, Default)]
pub struct Batch<'a> {
    pub players: Vec<&'a PlayerRecord>,
    pub battle: Option<&'a BattleRecord>,
}

/// Everything a backend holds, used at start-up
#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub players: Vec<PlayerRecord>,
    pub battles: Vec<BattleRecord>,
}

pub trait Backend: Send + Sync {
    fn commit(&self, batch: &Batch<'_>) -> Result<()>;

    fn load(&self) -> Result<Snapshot>;
}

/// Keeps committed records in memory only
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    players: AHashMap<PlayerId, PlayerRecord>,
    battles: Vec<BattleRecord>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn commit(&self, batch: &Batch<'_>) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        for player in &batch.players {
            state.players.insert(player.id, (*player).clone());
        }
        if let Some(battle) = batch.battle {
            state.battles.push(battle.clone());
        }
        Ok(())
    }

    fn load(&self) -> Result<Snapshot> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut players: Vec<_> = state.players.values().cloned().collect();
        players.sort_by_key(|p| p.id);
        Ok(Snapshot {
            players,
            battles: state.battles.clone(),
        })
    }
}

/// One JSON document per player plus a JSON-lines battle log
///
/// Layout under the root directory:
/// - `players/<id>.json`
/// - `battles.jsonl`
/// - `commit.journal` while a multi-record commit is in flight
///
/// A commit touching more than one record first saves an undo journal with
/// the previous contents. If applying the batch fails, the journal is used
/// to restore the old state, either at once or on the next `load`.
#[derive(Debug)]
pub struct JsonFileBackend {
    root: PathBuf,
    /// Serializes writers of the shared battle log
    write_lock: Mutex<()>,
}

/// Undo information for one in-flight commit
#[derive(Debug, Serialize, Deserialize)]
struct Journal {
    players: Vec<PriorFile>,
    /// Length of `battles.jsonl` before the commit
    battles_len: u64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PriorFile {
    id: PlayerId,
    /// `None` when the player had no file yet
    contents: Option<String>,
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn remove_optional(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Write `bytes` to `path` through a synced temp file and a rename
fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(&tmp, path)?;
    Ok(())
}

impl JsonFileBackend {
    /// Open (and create if needed) a data directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("players"))?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn player_path(&self, id: PlayerId) -> PathBuf {
        self.root.join("players").join(format!("{}.json", id))
    }

    fn battles_path(&self) -> PathBuf {
        self.root.join("battles.jsonl")
    }

    fn journal_path(&self) -> PathBuf {
        self.root.join("commit.journal")
    }

    fn write_player(&self, player: &PlayerRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(player)?;
        replace_file(&self.player_path(player.id), &json)
    }

    fn append_battle(&self, battle: &BattleRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.battles_path())?;
        let line = serde_json::to_string(battle)?;
        writeln!(file, "{}", line)?;
        file.sync_data()?;
        Ok(())
    }

    fn battles_len(&self) -> Result<u64> {
        match fs::metadata(self.battles_path()) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn apply(&self, batch: &Batch<'_>) -> Result<()> {
        for player in &batch.players {
            self.write_player(player)?;
        }
        if let Some(battle) = batch.battle {
            self.append_battle(battle)?;
        }
        Ok(())
    }

    /// Put back everything the journal remembers, then drop the journal
    fn undo(&self, journal: &Journal) -> Result<()> {
        for prior in &journal.players {
            let path = self.player_path(prior.id);
            match &prior.contents {
                Some(contents) => replace_file(&path, contents.as_bytes())?,
                None => remove_optional(&path)?,
            }
        }
        if self.battles_len()? > journal.battles_len {
            let file = OpenOptions::new().write(true).open(self.battles_path())?;
            file.set_len(journal.battles_len)?;
            file.sync_data()?;
        }
        remove_optional(&self.journal_path())
    }

    /// Roll back a commit that was interrupted before it finished
    fn recover(&self) -> Result<()> {
        let Some(contents) = read_optional(&self.journal_path())? else {
            return Ok(());
        };
        let journal: Journal = serde_json::from_str(&contents)?;
        warn!(players = journal.players.len(), "rolling back interrupted commit");
        self.undo(&journal)
    }
}

impl Backend for JsonFileBackend {
    fn commit(&self, batch: &Batch<'_>) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.recover()?;

        let writes = batch.players.len() + usize::from(batch.battle.is_some());
        if writes <= 1 {
            return self.apply(batch);
        }

        let mut players = Vec::with_capacity(batch.players.len());
        for player in &batch.players {
            players.push(PriorFile {
                id: player.id,
                contents: read_optional(&self.player_path(player.id))?,
            });
        }
        let journal = Journal {
            players,
            battles_len: self.battles_len()?,
        };
        replace_file(&self.journal_path(), &serde_json::to_vec(&journal)?)?;

        if let Err(e) = self.apply(batch) {
            if let Err(undo_error) = self.undo(&journal) {
                warn!(error = %undo_error, "rollback failed, journal kept for next load");
            }
            return Err(e);
        }
        remove_optional(&self.journal_path())
    }

    fn load(&self) -> Result<Snapshot> {
        self.recover()?;

        let mut players = Vec::new();
        for entry in fs::read_dir(self.root.join("players"))? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            players.push(serde_json::from_str::<PlayerRecord>(&content)?);
        }
        players.sort_by_key(|p| p.id);

        let mut battles = Vec::new();
        let path = self.battles_path();
        if path.exists() {
            let reader = BufReader::new(fs::File::open(&path)?);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                battles.push(serde_json::from_str(&line)?);
            }
        }

        Ok(Snapshot { players, battles })
    }
}
