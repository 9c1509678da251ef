//! Resumable hand-fact ETL.
//!
//! [`EtlJob::run`] processes one bounded batch starting at a checkpoint and
//! returns the next checkpoint plus a completion flag. The wall-clock limit
//! lives only in the [`Budget`] handed in by the caller. [`RelayDriver`]
//! keeps re-invoking the job with the returned checkpoint until the game is
//! done, each round with a fresh budget.

use std::time::{Duration, Instant};

use handfact_engine::errors::SkipReason;
use handfact_engine::fact::build_hand_fact;
use serde::Serialize;

use crate::config::EtlConfig;
use crate::error::CliError;
use crate::store::{CheckpointStore, FactSink, HandLogSource, SavedCheckpoint, StoreError};

/// Per-hand outcomes kept in a summary.
pub const DETAIL_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkpoint {
    pub game_id: String,
    pub offset: u64,
}

impl Checkpoint {
    pub fn new(game_id: impl Into<String>, offset: u64) -> Self {
        Self {
            game_id: game_id.into(),
            offset,
        }
    }
}

/// Checked between hands; once exhausted the batch stops and reports
/// `time_up`.
pub trait Budget {
    fn exhausted(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(max_runtime_ms: u64) -> Self {
        Self {
            started: Instant::now(),
            limit: Duration::from_millis(max_runtime_ms),
        }
    }
}

impl Budget for Deadline {
    fn exhausted(&self) -> bool {
        self.started.elapsed() >= self.limit
    }
}

/// A budget that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Budget for Unbounded {
    fn exhausted(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HandOutcome {
    Processed {
        hand_number: u32,
        id: String,
        players: usize,
    },
    Skipped {
        hand_number: u32,
        reason: SkipReason,
        message: String,
    },
}

impl HandOutcome {
    fn skipped(hand_number: u32, reason: SkipReason) -> Self {
        HandOutcome::Skipped {
            hand_number,
            message: reason.to_string(),
            reason,
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, HandOutcome::Processed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchLimits {
    pub max_runtime_ms: u64,
    pub max_hands_per_run: u32,
    pub page_size: u32,
}

impl From<&EtlConfig> for BatchLimits {
    fn from(cfg: &EtlConfig) -> Self {
        Self {
            max_runtime_ms: cfg.max_runtime_ms,
            max_hands_per_run: cfg.max_hands_per_run,
            page_size: cfg.page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub game_id: String,
    pub start: u64,
    pub processed: u32,
    pub skipped: u32,
    pub empty_player_hands: u32,
    pub total: u64,
    pub next: u64,
    pub done: bool,
    pub time_up: bool,
    pub limits: BatchLimits,
    pub details: Vec<HandOutcome>,
}

impl BatchSummary {
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint::new(self.game_id.clone(), self.next)
    }
}

pub struct EtlJob<'a, S> {
    store: &'a S,
    limits: BatchLimits,
}

impl<'a, S> EtlJob<'a, S>
where
    S: HandLogSource + FactSink + CheckpointStore,
{
    pub fn new(store: &'a S, limits: BatchLimits) -> Self {
        Self { store, limits }
    }

    /// Builds and upserts one hand. Skips are outcomes; only store
    /// failures are errors.
    pub fn process_hand(&self, game_id: &str, hand_number: u32) -> Result<HandOutcome, StoreError> {
        let Some(logs) = self.store.fetch_logs(game_id, hand_number)? else {
            tracing::warn!(game_id, hand_number, "hand log not found");
            return Ok(HandOutcome::skipped(hand_number, SkipReason::HandNotFound));
        };
        match build_hand_fact(game_id, hand_number, &logs) {
            Ok(fact) => {
                self.store.upsert_fact(&fact)?;
                Ok(HandOutcome::Processed {
                    hand_number,
                    players: fact.player_count,
                    id: fact.id,
                })
            }
            Err(reason) => {
                tracing::warn!(game_id, hand_number, reason = %reason, "hand skipped");
                Ok(HandOutcome::skipped(hand_number, reason))
            }
        }
    }

    /// Runs one batch from `checkpoint`. The first hand is always attempted
    /// so a relayed run makes progress even under a spent budget.
    pub fn run(&self, checkpoint: &Checkpoint, budget: &dyn Budget) -> Result<BatchSummary, CliError> {
        let game_id = checkpoint.game_id.as_str();
        let total = self.store.count_hands(game_id)?;
        let start = checkpoint.offset;
        let mut next = start;
        let mut processed = 0u32;
        let mut skipped = 0u32;
        let mut empty_player_hands = 0u32;
        let mut handled = 0u32;
        let mut time_up = false;
        let mut details: Vec<HandOutcome> = Vec::new();

        'pages: while next < total && handled < self.limits.max_hands_per_run {
            let want = self
                .limits
                .page_size
                .min(self.limits.max_hands_per_run - handled);
            let page = self.store.hand_numbers(game_id, next, want)?;
            if page.is_empty() {
                break;
            }
            for hand_number in page {
                if handled > 0 && budget.exhausted() {
                    time_up = true;
                    break 'pages;
                }
                let outcome = self.process_hand(game_id, hand_number)?;
                match &outcome {
                    HandOutcome::Processed { .. } => processed += 1,
                    HandOutcome::Skipped { reason, .. } => {
                        skipped += 1;
                        if *reason == SkipReason::NoPlayerActions {
                            empty_player_hands += 1;
                        }
                    }
                }
                details.push(outcome);
                if details.len() > DETAIL_LIMIT {
                    details.remove(0);
                }
                next += 1;
                handled += 1;
                if handled >= self.limits.max_hands_per_run {
                    break 'pages;
                }
            }
        }

        let done = next >= total;
        self.store
            .save_checkpoint(game_id, SavedCheckpoint { next_offset: next, done })?;
        tracing::info!(
            game_id,
            start,
            next,
            total,
            processed,
            skipped,
            done,
            time_up,
            "etl batch finished"
        );
        Ok(BatchSummary {
            game_id: game_id.to_string(),
            start,
            processed,
            skipped,
            empty_player_hands,
            total,
            next,
            done,
            time_up,
            limits: self.limits,
            details,
        })
    }
}

/// Totals over every batch a relay produced for one game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelayReport {
    pub game_id: String,
    pub batches: u32,
    pub processed: u32,
    pub skipped: u32,
    pub empty_player_hands: u32,
    pub next: u64,
    pub done: bool,
    pub last: BatchSummary,
}

pub struct RelayDriver<'a, S> {
    job: EtlJob<'a, S>,
    relay: bool,
}

impl<'a, S> RelayDriver<'a, S>
where
    S: HandLogSource + FactSink + CheckpointStore,
{
    pub fn new(job: EtlJob<'a, S>, relay: bool) -> Self {
        Self { job, relay }
    }

    /// Runs batches until done. Without relay only the first batch runs.
    /// `budget` is called once per batch.
    pub fn drive<B, F>(&self, start: Checkpoint, mut budget: F) -> Result<RelayReport, CliError>
    where
        B: Budget,
        F: FnMut() -> B,
    {
        let mut checkpoint = start;
        let mut batches = 0u32;
        let mut processed = 0u32;
        let mut skipped = 0u32;
        let mut empty_player_hands = 0u32;
        loop {
            let summary = self.job.run(&checkpoint, &budget())?;
            batches += 1;
            processed += summary.processed;
            skipped += summary.skipped;
            empty_player_hands += summary.empty_player_hands;
            let stalled = summary.next == checkpoint.offset;
            if summary.done || !self.relay || stalled {
                if stalled && !summary.done {
                    tracing::warn!(game_id = %summary.game_id, next = summary.next, "relay made no progress");
                }
                return Ok(RelayReport {
                    game_id: summary.game_id.clone(),
                    batches,
                    processed,
                    skipped,
                    empty_player_hands,
                    next: summary.next,
                    done: summary.done,
                    last: summary,
                });
            }
            tracing::debug!(game_id = %summary.game_id, next = summary.next, "relaying");
            checkpoint = summary.checkpoint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use handfact_engine::record::RawLogRecord;

    fn hand(players: &[&str]) -> Vec<RawLogRecord> {
        players
            .iter()
            .enumerate()
            .map(|(i, p)| RawLogRecord::at(format!(r#""{}" calls 10"#, p), format!("{:02}", i)))
            .collect()
    }

    fn limits(max_hands: u32, page: u32) -> BatchLimits {
        BatchLimits {
            max_runtime_ms: 2200,
            max_hands_per_run: max_hands,
            page_size: page,
        }
    }

    struct Spent;
    impl Budget for Spent {
        fn exhausted(&self) -> bool {
            true
        }
    }

    #[test]
    fn batch_stops_at_hand_limit() {
        let store = MemoryStore::new();
        for n in 1..=5 {
            store.insert_hand("g", n, hand(&["a@1", "b@2"]));
        }
        let job = EtlJob::new(&store, limits(2, 50));
        let s = job.run(&Checkpoint::new("g", 0), &Unbounded).unwrap();
        assert_eq!((s.processed, s.next, s.done, s.time_up), (2, 2, false, false));
        assert_eq!(
            store.load_checkpoint("g").unwrap(),
            Some(SavedCheckpoint {
                next_offset: 2,
                done: false
            })
        );
    }

    #[test]
    fn spent_budget_still_advances_one_hand() {
        let store = MemoryStore::new();
        for n in 1..=3 {
            store.insert_hand("g", n, hand(&["a@1"]));
        }
        let job = EtlJob::new(&store, limits(12, 50));
        let s = job.run(&Checkpoint::new("g", 0), &Spent).unwrap();
        assert_eq!(s.next, 1);
        assert!(s.time_up);
        assert!(!s.done);
    }

    #[test]
    fn empty_hands_are_counted_and_skipped() {
        let store = MemoryStore::new();
        store.insert_hand("g", 1, vec![RawLogRecord::new("Flop: [Ah 7c 2d]")]);
        store.insert_hand("g", 2, hand(&["a@1"]));
        let job = EtlJob::new(&store, limits(12, 50));
        let s = job.run(&Checkpoint::new("g", 0), &Unbounded).unwrap();
        assert_eq!((s.processed, s.skipped, s.empty_player_hands), (1, 1, 1));
        assert!(s.done);
        assert_eq!(s.details.len(), 2);
        assert!(!s.details[0].is_processed());
    }

    #[test]
    fn store_failure_aborts_batch_without_checkpoint() {
        let store = MemoryStore::failing_on(2);
        for n in 1..=3 {
            store.insert_hand("g", n, hand(&["a@1"]));
        }
        let job = EtlJob::new(&store, limits(12, 50));
        assert!(job.run(&Checkpoint::new("g", 0), &Unbounded).is_err());
        assert_eq!(store.load_checkpoint("g").unwrap(), None);
        assert_eq!(store.upsert_count(), 1);
    }

    #[test]
    fn relay_drives_to_completion() {
        let store = MemoryStore::new();
        for n in 1..=7 {
            store.insert_hand("g", n, hand(&["a@1", "b@2"]));
        }
        let driver = RelayDriver::new(EtlJob::new(&store, limits(3, 2)), true);
        let report = driver.drive(Checkpoint::new("g", 0), || Unbounded).unwrap();
        assert_eq!(report.batches, 3);
        assert_eq!(report.processed, 7);
        assert!(report.done);
        assert_eq!(report.next, 7);
    }

    #[test]
    fn relay_disabled_runs_one_batch() {
        let store = MemoryStore::new();
        for n in 1..=7 {
            store.insert_hand("g", n, hand(&["a@1"]));
        }
        let driver = RelayDriver::new(EtlJob::new(&store, limits(3, 50)), false);
        let report = driver.drive(Checkpoint::new("g", 0), || Unbounded).unwrap();
        assert_eq!((report.batches, report.next, report.done), (1, 3, false));
    }

    #[test]
    fn offset_past_end_is_done_without_regressing() {
        let store = MemoryStore::new();
        store.insert_hand("g", 1, hand(&["a@1"]));
        let job = EtlJob::new(&store, limits(12, 50));
        let s = job.run(&Checkpoint::new("g", 9), &Unbounded).unwrap();
        assert_eq!((s.next, s.done, s.processed), (9, true, 0));
    }
}
