//! Command-line definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "handfact",
    version,
    about = "Turn raw poker hand logs into structured hand facts"
)]
pub struct HandfactCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load raw hand logs (JSONL, optionally .zst) into the hand-log store
    Import {
        #[arg(long)]
        input: String,
        #[arg(long)]
        db: Option<String>,
    },
    /// Build hand facts for one or more games
    Etl {
        /// Game ids, processed in order
        #[arg(required = true, num_args = 1..)]
        games: Vec<String>,
        /// Offset into the game's hands, ordered by hand number
        #[arg(long, conflicts_with = "resume")]
        start: Option<u64>,
        /// Rebuild a single hand instead of a batch
        #[arg(long, conflicts_with_all = ["start", "resume"])]
        hand: Option<u32>,
        /// Continue from the stored checkpoint
        #[arg(long)]
        resume: bool,
        #[arg(long)]
        db: Option<String>,
        #[arg(long = "max-runtime-ms")]
        max_runtime_ms: Option<u64>,
        #[arg(long = "max-hands")]
        max_hands: Option<u32>,
        #[arg(long = "page-size")]
        page_size: Option<u32>,
        /// Run a single batch and stop
        #[arg(long = "no-relay")]
        no_relay: bool,
    },
    /// Print one stored hand fact
    Show {
        game: String,
        hand: u32,
        #[arg(long)]
        db: Option<String>,
    },
    /// Aggregate per-player statistics across a game's facts
    Stats {
        game: String,
        #[arg(long)]
        player: Option<String>,
        #[arg(long)]
        db: Option<String>,
    },
    /// Evaluate 5-7 cards, or classify 2 hole cards
    Evaluate {
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },
    /// Display resolved configuration and where each value came from
    Cfg,
}
