//! # handfact-engine: Poker Hand-Log ETL Core
//!
//! Turns a hand's free-text event log into a structured, deterministic
//! [`fact::HandFact`]: actions, board, positions, stack-to-pot ratios,
//! per-player statistic counters and best-hand/range metadata for every
//! player who showed cards. Pure computation; storage and scheduling live
//! in the CLI crate.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and strict card parsing
//! - [`parser`] - Action parsing and card extraction from free-text log lines
//! - [`action`] - Canonical verbs and typed actions
//! - [`record`] - Raw log records, streets and chronological ordering
//! - [`hand`] - Best-of-N hand evaluation and comparison
//! - [`range`] - 169-bucket starting-hand classification
//! - [`position`] - Deterministic seat labelling
//! - [`state`] - Per-hand replay: street, board, pot and contributions
//! - [`stats`] - Opportunity/count statistic triggers
//! - [`fact`] - HandFact assembly
//! - [`errors`] - Error and skip types
//!
//! ## Quick Start
//!
//! ```rust
//! use handfact_engine::cards::parse_cards;
//! use handfact_engine::hand::{evaluate_best, Category};
//!
//! let cards = parse_cards("Ah Kh Qh Jh Th 2c 3d").unwrap();
//! let strength = evaluate_best(&cards).unwrap();
//! assert_eq!(strength.category, Category::StraightFlush);
//! assert_eq!(strength.label(), "Royal Flush");
//! ```
//!
//! ## Building a Hand Fact
//!
//! ```rust
//! use handfact_engine::fact::build_hand_fact;
//! use handfact_engine::record::RawLogRecord;
//!
//! let logs = vec![
//!     RawLogRecord::at(r#""ann@p1" posts a small blind of 10"#, "001"),
//!     RawLogRecord::at(r#""bob@p2" posts a big blind of 20"#, "002"),
//!     RawLogRecord::at(r#""ann@p1" raises to 60"#, "003"),
//!     RawLogRecord::at(r#""bob@p2" folds"#, "004"),
//!     RawLogRecord::at(r#""ann@p1" collected 80 from pot"#, "005"),
//! ];
//! let fact = build_hand_fact("g1", 7, &logs).unwrap();
//! assert_eq!(fact.id, "g1_7");
//! assert_eq!(fact.player("p1").unwrap().pfr_hands, 1);
//! ```

pub mod action;
pub mod cards;
pub mod errors;
pub mod fact;
pub mod hand;
pub mod parser;
pub mod position;
pub mod range;
pub mod record;
pub mod state;
pub mod stats;
