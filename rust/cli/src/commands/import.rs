//! `handfact import`: load raw hand logs into the hand-log store.
//!
//! Input is JSONL, one hand per line:
//! `{"game_id":"g1","hand_number":7,"raw_logs":[{"msg":"...","created_at":"..."}]}`.
//! Files ending in `.zst` are decompressed first. Malformed lines are
//! reported as warnings and skipped.

use std::io::Write;

use crate::error::CliError;
use crate::io_utils::read_text_auto;
use crate::store::{HandLog, SqliteStore};
use crate::ui;

pub fn handle_import_command(
    input: &str,
    database: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let content = read_text_auto(input).map_err(|e| {
        CliError::InvalidInput(format!("Failed to read {}: {}", input, e))
    })?;

    let mut logs = Vec::new();
    let mut bad_lines = 0usize;
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HandLog>(line) {
            Ok(log) => logs.push(log),
            Err(e) => {
                bad_lines += 1;
                ui::display_warning(err, &format!("line {}: {}", idx + 1, e))?;
            }
        }
    }

    let mut store = SqliteStore::open(database)?;
    let imported = store.import_hand_logs(&logs)?;
    tracing::info!(input, imported, bad_lines, "hand logs imported");

    let summary = serde_json::json!({
        "imported": imported,
        "skipped_lines": bad_lines,
        "database": database,
    });
    writeln!(out, "{}", summary)?;
    Ok(())
}
