use std::io::Write;

use crate::error::CliError;
use crate::store::{FactSink, SqliteStore};

/// Prints the stored fact for `game`/`hand` as pretty JSON.
pub fn handle_show_command(
    game: &str,
    hand: u32,
    database: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let store = SqliteStore::open(database)?;
    let Some(stored) = store.load_fact(game, hand)? else {
        return Err(CliError::InvalidInput(format!(
            "no hand fact for {} hand {}",
            game, hand
        )));
    };
    let json = serde_json::to_string_pretty(&stored).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}
