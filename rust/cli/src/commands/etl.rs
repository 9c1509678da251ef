//! `handfact etl`: build hand facts.
//!
//! Single-hand mode (`--hand N`) rebuilds one fact and prints its outcome.
//! Batch mode prints one JSON report line per game.

use std::io::Write;

use crate::config::{self, Overrides};
use crate::error::CliError;
use crate::etl::{BatchLimits, Checkpoint, Deadline, EtlJob, RelayDriver};
use crate::store::{CheckpointStore, SqliteStore};

pub struct EtlArgs {
    pub games: Vec<String>,
    pub start: Option<u64>,
    pub hand: Option<u32>,
    pub resume: bool,
    pub overrides: Overrides,
}

pub fn handle_etl_command(args: EtlArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let cfg = config::load_with_overrides(&args.overrides)?.config;
    let store = SqliteStore::open(&cfg.database)?;
    let limits = BatchLimits::from(&cfg);

    if let Some(hand_number) = args.hand {
        let [game_id] = args.games.as_slice() else {
            return Err(CliError::InvalidInput(
                "--hand takes exactly one game id".into(),
            ));
        };
        let outcome = EtlJob::new(&store, limits).process_hand(game_id, hand_number)?;
        writeln!(
            out,
            "{}",
            serde_json::to_string(&outcome).map_err(std::io::Error::other)?
        )?;
        return Ok(());
    }

    let driver = RelayDriver::new(EtlJob::new(&store, limits), cfg.relay);
    for game_id in &args.games {
        let offset = if args.resume {
            store
                .load_checkpoint(game_id)?
                .map(|c| c.next_offset)
                .unwrap_or(0)
        } else {
            args.start.unwrap_or(0)
        };
        let report = driver.drive(Checkpoint::new(game_id.clone(), offset), || {
            Deadline::start(cfg.max_runtime_ms)
        })?;
        writeln!(
            out,
            "{}",
            serde_json::to_string(&report).map_err(std::io::Error::other)?
        )?;
    }
    Ok(())
}
