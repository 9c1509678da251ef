use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("Invalid card token: {0}")]
    InvalidToken(String),
    #[error("Expected {expected} cards, got {actual}")]
    WrongCount { expected: &'static str, actual: usize },
}

/// Hand-level outcome that is reported instead of producing a fact.
///
/// These are data-quality signals, not failures: the orchestrator counts
/// them and moves on to the next hand.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    #[error("no player actions parsed")]
    NoPlayerActions,
    #[error("raw log is empty")]
    EmptyLog,
    #[error("hand not found in log store")]
    HandNotFound,
}
