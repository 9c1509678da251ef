use serde::{Deserialize, Serialize};

use crate::record::Street;

/// Canonical action verb. Log synonyms (`called`, `won`, ...) collapse
/// onto these.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Posts,
    Calls,
    Bets,
    Raises,
    Checks,
    Folds,
    Shows,
    Collected,
}

impl Verb {
    pub fn from_word(word: &str) -> Option<Verb> {
        let verb = match word.to_ascii_lowercase().as_str() {
            "post" | "posts" | "posted" => Verb::Posts,
            "call" | "calls" | "called" => Verb::Calls,
            "bet" | "bets" => Verb::Bets,
            "raise" | "raises" | "raised" => Verb::Raises,
            "check" | "checks" | "checked" => Verb::Checks,
            "fold" | "folds" | "folded" => Verb::Folds,
            "show" | "shows" | "showed" => Verb::Shows,
            "collected" | "win" | "wins" | "won" => Verb::Collected,
            _ => return None,
        };
        Some(verb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Posts => "posts",
            Verb::Calls => "calls",
            Verb::Bets => "bets",
            Verb::Raises => "raises",
            Verb::Checks => "checks",
            Verb::Folds => "folds",
            Verb::Shows => "shows",
            Verb::Collected => "collected",
        }
    }

    /// Verbs that put chips into the pot.
    pub fn is_wager(self) -> bool {
        matches!(self, Verb::Posts | Verb::Calls | Verb::Bets | Verb::Raises)
    }

    pub fn is_aggressive(self) -> bool {
        matches!(self, Verb::Bets | Verb::Raises)
    }

    /// Voluntary preflop money: call, bet or raise (blinds excluded).
    pub fn is_voluntary(self) -> bool {
        matches!(self, Verb::Calls | Verb::Bets | Verb::Raises)
    }

    /// A decision taken in turn. Posting blinds, showing cards and
    /// collecting the pot are not decisions.
    pub fn is_decision(self) -> bool {
        !matches!(self, Verb::Posts | Verb::Shows | Verb::Collected)
    }
}

/// One typed action parsed from a log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub player_id: String,
    pub player_name: String,
    pub verb: Verb,
    pub street: Street,
    /// First amount after the verb, or the raise target; 0 when absent
    pub amount: f64,
    /// Absolute raise target from "raises to X"
    pub to_amount: Option<f64>,
    pub is_all_in: bool,
}

impl Action {
    /// Compact text used in per-street action histories.
    pub fn text(&self) -> String {
        match (self.verb, self.to_amount) {
            (Verb::Raises, Some(to)) if to > 0.0 => format!("raises to {}", fmt_amount(to)),
            (v, _) if v.is_wager() && self.amount > 0.0 => {
                format!("{} {}", v.as_str(), fmt_amount(self.amount))
            }
            (v, _) => v.as_str().to_string(),
        }
    }
}

/// Integers print without a decimal point.
pub fn fmt_amount(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
