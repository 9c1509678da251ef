//! Hand-log and fact storage.
//!
//! The ETL only sees three narrow traits: a source of raw hand logs, a sink
//! for facts and a checkpoint store. [`SqliteStore`] implements all three on
//! one database file; [`MemoryStore`] backs tests.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use handfact_engine::fact::{HandFact, fact_id};
use handfact_engine::record::RawLogRecord;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io_utils::ensure_parent_dir;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// One hand's raw log as imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandLog {
    #[serde(alias = "gameId")]
    pub game_id: String,
    #[serde(alias = "handNumber")]
    pub hand_number: u32,
    #[serde(default, alias = "rawLogs")]
    pub raw_logs: Vec<RawLogRecord>,
}

/// A persisted fact with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFact {
    pub fact: HandFact,
    pub create_time: String,
    pub update_time: String,
}

/// "Given a hand number, fetch its raw log lines."
pub trait HandLogSource {
    fn count_hands(&self, game_id: &str) -> Result<u64, StoreError>;
    /// Hand numbers in ascending order, paged.
    fn hand_numbers(&self, game_id: &str, offset: u64, limit: u32) -> Result<Vec<u32>, StoreError>;
    fn fetch_logs(&self, game_id: &str, hand_number: u32) -> Result<Option<Vec<RawLogRecord>>, StoreError>;
}

/// Idempotent fact persistence keyed by `gameId_handNumber`.
pub trait FactSink {
    /// Full overwrite; only the original creation time survives.
    fn upsert_fact(&self, fact: &HandFact) -> Result<(), StoreError>;
    fn load_fact(&self, game_id: &str, hand_number: u32) -> Result<Option<StoredFact>, StoreError>;
    /// Every fact of a game, ordered by hand number.
    fn load_facts(&self, game_id: &str) -> Result<Vec<HandFact>, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SavedCheckpoint {
    pub next_offset: u64,
    pub done: bool,
}

pub trait CheckpointStore {
    fn load_checkpoint(&self, game_id: &str) -> Result<Option<SavedCheckpoint>, StoreError>;
    fn save_checkpoint(&self, game_id: &str, saved: SavedCheckpoint) -> Result<(), StoreError>;
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn sqlite_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(info, _)
            if matches!(
                info.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            )
    )
}

fn map_sqlite(e: rusqlite::Error) -> StoreError {
    if sqlite_busy(&e) {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Sqlite(e)
    }
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS match_hands (
    game_id TEXT NOT NULL,
    hand_number INTEGER NOT NULL,
    raw_logs TEXT NOT NULL,
    PRIMARY KEY (game_id, hand_number)
);
CREATE TABLE IF NOT EXISTS match_hand_facts (
    id TEXT NOT NULL PRIMARY KEY,
    game_id TEXT NOT NULL,
    hand_number INTEGER NOT NULL,
    fact_json TEXT NOT NULL,
    create_time TEXT NOT NULL,
    update_time TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_facts_game_hand ON match_hand_facts (game_id, hand_number);
CREATE TABLE IF NOT EXISTS etl_checkpoints (
    game_id TEXT NOT NULL PRIMARY KEY,
    next_offset INTEGER NOT NULL,
    done INTEGER NOT NULL,
    update_time TEXT NOT NULL
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StoreError> {
        ensure_parent_dir(Path::new(path)).map_err(StoreError::Unavailable)?;
        let conn = Connection::open(path).map_err(map_sqlite)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(2000))?;
        conn.execute_batch(SCHEMA).map_err(map_sqlite)?;
        Ok(Self { conn })
    }

    /// Inserts or replaces hand logs in one transaction. Returns the
    /// number of hands written.
    pub fn import_hand_logs(&mut self, logs: &[HandLog]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction().map_err(map_sqlite)?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO match_hands (game_id, hand_number, raw_logs) VALUES (?1, ?2, ?3)
                 ON CONFLICT(game_id, hand_number) DO UPDATE SET raw_logs = excluded.raw_logs",
            )?;
            for log in logs {
                let raw = serde_json::to_string(&log.raw_logs)?;
                stmt.execute(params![log.game_id, log.hand_number, raw])
                    .map_err(map_sqlite)?;
            }
        }
        tx.commit().map_err(map_sqlite)?;
        Ok(logs.len())
    }
}

impl HandLogSource for SqliteStore {
    fn count_hands(&self, game_id: &str) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM match_hands WHERE game_id = ?1",
            params![game_id],
            |row| row.get(0),
        )?;
        Ok(n.max(0) as u64)
    }

    fn hand_numbers(&self, game_id: &str, offset: u64, limit: u32) -> Result<Vec<u32>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT hand_number FROM match_hands WHERE game_id = ?1
             ORDER BY hand_number ASC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![game_id, limit, offset as i64], |row| row.get(0))?;
        rows.collect::<Result<Vec<u32>, _>>().map_err(map_sqlite)
    }

    fn fetch_logs(&self, game_id: &str, hand_number: u32) -> Result<Option<Vec<RawLogRecord>>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT raw_logs FROM match_hands WHERE game_id = ?1 AND hand_number = ?2",
                params![game_id, hand_number],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sqlite)?;
        raw.map(|s| serde_json::from_str(&s).map_err(StoreError::from))
            .transpose()
    }
}

impl FactSink for SqliteStore {
    fn upsert_fact(&self, fact: &HandFact) -> Result<(), StoreError> {
        let json = serde_json::to_string(fact)?;
        let ts = now();
        self.conn
            .execute(
                "INSERT INTO match_hand_facts (id, game_id, hand_number, fact_json, create_time, update_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    game_id = excluded.game_id,
                    hand_number = excluded.hand_number,
                    fact_json = excluded.fact_json,
                    update_time = excluded.update_time",
                params![fact.id, fact.game_id, fact.hand_number, json, ts],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }

    fn load_fact(&self, game_id: &str, hand_number: u32) -> Result<Option<StoredFact>, StoreError> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT fact_json, create_time, update_time FROM match_hand_facts WHERE id = ?1",
                params![fact_id(game_id, hand_number)],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(map_sqlite)?;
        let Some((json, create_time, update_time)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredFact {
            fact: serde_json::from_str(&json)?,
            create_time,
            update_time,
        }))
    }

    fn load_facts(&self, game_id: &str) -> Result<Vec<HandFact>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT fact_json FROM match_hand_facts WHERE game_id = ?1 ORDER BY hand_number ASC",
        )?;
        let rows = stmt.query_map(params![game_id], |row| row.get::<_, String>(0))?;
        let mut facts = Vec::new();
        for json in rows {
            facts.push(serde_json::from_str(&json.map_err(map_sqlite)?)?);
        }
        Ok(facts)
    }
}

impl CheckpointStore for SqliteStore {
    fn load_checkpoint(&self, game_id: &str) -> Result<Option<SavedCheckpoint>, StoreError> {
        self.conn
            .query_row(
                "SELECT next_offset, done FROM etl_checkpoints WHERE game_id = ?1",
                params![game_id],
                |row| {
                    Ok(SavedCheckpoint {
                        next_offset: row.get::<_, i64>(0)?.max(0) as u64,
                        done: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(map_sqlite)
    }

    fn save_checkpoint(&self, game_id: &str, saved: SavedCheckpoint) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO etl_checkpoints (game_id, next_offset, done, update_time)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(game_id) DO UPDATE SET
                    next_offset = excluded.next_offset,
                    done = excluded.done,
                    update_time = excluded.update_time",
                params![game_id, saved.next_offset as i64, saved.done, now()],
            )
            .map_err(map_sqlite)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    logs: BTreeMap<(String, u32), Vec<RawLogRecord>>,
    facts: BTreeMap<String, StoredFact>,
    checkpoints: BTreeMap<String, SavedCheckpoint>,
    upserts: usize,
}

/// In-process store. `fail_upsert_for` makes the sink reject one hand so
/// batch-abort behaviour can be exercised.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    fail_upsert_for: Option<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(hand_number: u32) -> Self {
        Self {
            fail_upsert_for: Some(hand_number),
            ..Self::default()
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }

    pub fn insert_hand(&self, game_id: &str, hand_number: u32, logs: Vec<RawLogRecord>) {
        if let Ok(mut inner) = self.lock() {
            inner.logs.insert((game_id.to_string(), hand_number), logs);
        }
    }

    /// Number of successful upserts so far.
    pub fn upsert_count(&self) -> usize {
        self.lock().map(|i| i.upserts).unwrap_or(0)
    }
}

impl HandLogSource for MemoryStore {
    fn count_hands(&self, game_id: &str) -> Result<u64, StoreError> {
        Ok(self.lock()?.logs.keys().filter(|(g, _)| g == game_id).count() as u64)
    }

    fn hand_numbers(&self, game_id: &str, offset: u64, limit: u32) -> Result<Vec<u32>, StoreError> {
        Ok(self
            .lock()?
            .logs
            .keys()
            .filter(|(g, _)| g == game_id)
            .map(|(_, n)| *n)
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    fn fetch_logs(&self, game_id: &str, hand_number: u32) -> Result<Option<Vec<RawLogRecord>>, StoreError> {
        Ok(self
            .lock()?
            .logs
            .get(&(game_id.to_string(), hand_number))
            .cloned())
    }
}

impl FactSink for MemoryStore {
    fn upsert_fact(&self, fact: &HandFact) -> Result<(), StoreError> {
        if self.fail_upsert_for == Some(fact.hand_number) {
            return Err(StoreError::Unavailable(format!("rejected write for {}", fact.id)));
        }
        let mut inner = self.lock()?;
        let ts = now();
        let create_time = inner
            .facts
            .get(&fact.id)
            .map(|f| f.create_time.clone())
            .unwrap_or_else(|| ts.clone());
        inner.facts.insert(
            fact.id.clone(),
            StoredFact {
                fact: fact.clone(),
                create_time,
                update_time: ts,
            },
        );
        inner.upserts += 1;
        Ok(())
    }

    fn load_fact(&self, game_id: &str, hand_number: u32) -> Result<Option<StoredFact>, StoreError> {
        Ok(self.lock()?.facts.get(&fact_id(game_id, hand_number)).cloned())
    }

    fn load_facts(&self, game_id: &str) -> Result<Vec<HandFact>, StoreError> {
        let mut facts: Vec<HandFact> = self
            .lock()?
            .facts
            .values()
            .filter(|f| f.fact.game_id == game_id)
            .map(|f| f.fact.clone())
            .collect();
        facts.sort_by_key(|f| f.hand_number);
        Ok(facts)
    }
}

impl CheckpointStore for MemoryStore {
    fn load_checkpoint(&self, game_id: &str) -> Result<Option<SavedCheckpoint>, StoreError> {
        Ok(self.lock()?.checkpoints.get(game_id).copied())
    }

    fn save_checkpoint(&self, game_id: &str, saved: SavedCheckpoint) -> Result<(), StoreError> {
        self.lock()?.checkpoints.insert(game_id.to_string(), saved);
        Ok(())
    }
}
