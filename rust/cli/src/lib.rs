//! # handfact CLI Library
//!
//! Command-line surface, storage and the resumable ETL for turning raw
//! poker hand logs into persisted hand facts.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments and dispatches to a subcommand handler,
//! writing to the given output and error streams.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["handfact", "etl", "g1", "--db", "facts.sqlite"];
//! let code = handfact_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `import`: load JSONL(.zst) hand logs into the hand-log store
//! - `etl`: build hand facts, one hand or resumable batches per game
//! - `show`: print one stored hand fact
//! - `stats`: aggregate per-player statistics for a game
//! - `evaluate`: score 5-7 cards or classify 2 hole cards
//! - `cfg`: display resolved configuration

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
pub mod error;
pub mod etl;
pub mod exit_code;
pub mod io_utils;
pub mod logging;
pub mod store;
pub mod ui;

use cli::{Commands, HandfactCli};
use commands::{
    EtlArgs, handle_cfg_command, handle_etl_command, handle_evaluate_command,
    handle_import_command, handle_show_command, handle_stats_command,
};
use config::Overrides;

pub use commands::stats::aggregate_players;
pub use error::CliError;

/// Parses `args` and runs the selected command.
///
/// Returns `0` on success and `2` on any error. Help and version output go
/// to `out` and count as success; errors are printed to `err` as
/// `Error: ...`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["import", "etl", "show", "stats", "evaluate", "cfg"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let parsed = HandfactCli::try_parse_from(&argv);
    match parsed {
        Err(e) => {
            use clap::error::ErrorKind;

            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    if writeln!(err, "{}", e).is_err()
                        || writeln!(err).is_err()
                        || writeln!(err, "handfact: poker hand-log ETL").is_err()
                        || writeln!(err, "Usage: handfact <command> [options]\n").is_err()
                        || writeln!(err, "Commands:").is_err()
                    {
                        return exit_code::ERROR;
                    }
                    for c in COMMANDS {
                        if writeln!(err, "  {}", c).is_err() {
                            return exit_code::ERROR;
                        }
                    }
                    if writeln!(err, "\nFor full help, run: handfact --help").is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::ERROR
                }
            }
        }
        Ok(cli) => {
            let result = match cli.cmd {
                Commands::Cfg => handle_cfg_command(out),
                Commands::Import { input, db } => resolve_database(db)
                    .and_then(|database| handle_import_command(&input, &database, out, err)),
                Commands::Etl {
                    games,
                    start,
                    hand,
                    resume,
                    db,
                    max_runtime_ms,
                    max_hands,
                    page_size,
                    no_relay,
                } => handle_etl_command(
                    EtlArgs {
                        games,
                        start,
                        hand,
                        resume,
                        overrides: Overrides {
                            database: db,
                            max_runtime_ms,
                            max_hands_per_run: max_hands,
                            page_size,
                            no_relay,
                        },
                    },
                    out,
                ),
                Commands::Show { game, hand, db } => resolve_database(db)
                    .and_then(|database| handle_show_command(&game, hand, &database, out)),
                Commands::Stats { game, player, db } => resolve_database(db).and_then(|database| {
                    handle_stats_command(&game, player.as_deref(), &database, out)
                }),
                Commands::Evaluate { cards } => handle_evaluate_command(&cards, out),
            };
            match result {
                Ok(()) => exit_code::SUCCESS,
                Err(e) => {
                    if writeln!(err, "Error: {}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::ERROR
                }
            }
        }
    }
}

fn resolve_database(db: Option<String>) -> Result<String, CliError> {
    let overrides = Overrides {
        database: db,
        ..Overrides::default()
    };
    Ok(config::load_with_overrides(&overrides)?.config.database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_lists_commands() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(["handfact", "bogus"], &mut out, &mut err);
        assert_eq!(code, exit_code::ERROR);
        let stderr = String::from_utf8(err).unwrap();
        for c in ["import", "etl", "show", "stats", "evaluate", "cfg"] {
            assert!(stderr.contains(&format!("  {}", c)));
        }
    }

    #[test]
    fn help_goes_to_stdout() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(["handfact", "--help"], &mut out, &mut err), 0);
        assert!(String::from_utf8(out).unwrap().contains("etl"));
        assert!(err.is_empty());
    }

    #[test]
    fn start_and_resume_conflict() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(
            ["handfact", "etl", "g", "--start", "3", "--resume"],
            &mut out,
            &mut err,
        );
        assert_eq!(code, 2);
    }
}
