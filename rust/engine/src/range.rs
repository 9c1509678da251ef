//! Canonical starting-hand classification.
//!
//! Every two-card holding maps onto one of 169 buckets: 13 pairs, 78 suited
//! and 78 offsuit combinations. Each bucket carries a static strength
//! percentile, an all-in equity figure against a random hand and a tier.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Strength bucket derived from the cumulative percentile.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RangeTier {
    S,
    A,
    B,
    C,
    D,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl RangeTier {
    pub fn from_percent(percent: f64) -> RangeTier {
        if percent <= 5.0 {
            RangeTier::S
        } else if percent <= 12.0 {
            RangeTier::A
        } else if percent <= 25.0 {
            RangeTier::B
        } else if percent <= 40.0 {
            RangeTier::C
        } else {
            RangeTier::D
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RangeTier::S => "Premium",
            RangeTier::A => "Strong",
            RangeTier::B => "Playable",
            RangeTier::C => "Marginal",
            RangeTier::D => "Weak",
            RangeTier::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeInfo {
    /// `AA`, `AKs`, `AKo`; empty when the input could not be classified
    pub key: String,
    pub tier: RangeTier,
    pub label: String,
    /// 1 = strongest, 169 = weakest, 999 = unknown
    pub rank: u16,
    /// Cumulative percentile including this bucket
    pub percentile: f64,
    pub equity: f64,
    pub combo_count: u8,
}

impl RangeInfo {
    pub fn unknown() -> Self {
        RangeInfo {
            key: String::new(),
            tier: RangeTier::Unknown,
            label: RangeTier::Unknown.label().to_string(),
            rank: 999,
            percentile: 100.0,
            equity: 0.0,
            combo_count: 0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.tier == RangeTier::Unknown
    }
}

/// Canonical key for two hole cards: higher rank, lower rank, then `s` or
/// `o` (no suffix for pairs).
pub fn range_key(a: Card, b: Card) -> String {
    let (high, low) = if a.rank >= b.rank { (a, b) } else { (b, a) };
    let mut key = String::with_capacity(3);
    key.push(high.rank.to_char());
    key.push(low.rank.to_char());
    if high.rank != low.rank {
        key.push(if high.suit == low.suit { 's' } else { 'o' });
    }
    key
}

/// Classifies hole cards. Anything other than two distinct cards yields
/// the `UNKNOWN` sentinel.
pub fn classify(cards: &[Card]) -> RangeInfo {
    let [a, b] = cards else {
        return RangeInfo::unknown();
    };
    if a == b {
        return RangeInfo::unknown();
    }
    classify_key(&range_key(*a, *b))
}

pub fn classify_key(key: &str) -> RangeInfo {
    range_table()
        .get(key)
        .cloned()
        .unwrap_or_else(RangeInfo::unknown)
}

fn range_table() -> &'static HashMap<&'static str, RangeInfo> {
    static TABLE: OnceLock<HashMap<&'static str, RangeInfo>> = OnceLock::new();
    TABLE.get_or_init(|| {
        RANGE_ROWS
            .iter()
            .enumerate()
            .map(|(idx, &(key, combo_count, equity, percentile))| {
                let tier = RangeTier::from_percent(percentile);
                let info = RangeInfo {
                    key: key.to_string(),
                    tier,
                    label: tier.label().to_string(),
                    rank: idx as u16 + 1,
                    percentile,
                    equity,
                    combo_count,
                };
                (key, info)
            })
            .collect()
    })
}

/// Buckets ordered strongest first: (key, combos, equity %, cumulative percentile).
/// Equities come from Monte Carlo runs against a random hand.
const RANGE_ROWS: [(&str, u8, f64, f64); 169] = [
    ("AA", 6, 85.33, 0.5),
    ("KK", 6, 82.03, 0.9),
    ("QQ", 6, 80.35, 1.4),
    ("JJ", 6, 77.79, 1.8),
    ("TT", 6, 75.03, 2.3),
    ("99", 6, 72.42, 2.7),
    ("88", 6, 69.35, 3.2),
    ("AKs", 4, 67.23, 3.5),
    ("77", 6, 66.51, 3.9),
    ("AJs", 4, 66.27, 4.2),
    ("AQs", 4, 65.59, 4.5),
    ("AKo", 12, 65.26, 5.4),
    ("ATs", 4, 64.52, 5.7),
    ("AQo", 12, 64.06, 6.6),
    ("KQs", 4, 63.35, 6.9),
    ("AJo", 12, 63.34, 7.8),
    ("A9s", 4, 62.88, 8.1),
    ("66", 6, 62.69, 8.6),
    ("KJs", 4, 62.59, 8.9),
    ("KTs", 4, 62.28, 9.2),
    ("ATo", 12, 61.92, 10.1),
    ("A8s", 4, 61.58, 10.4),
    ("KQo", 12, 61.40, 11.3),
    ("A7s", 4, 61.26, 11.6),
    ("KJo", 12, 61.19, 12.5),
    ("A8o", 12, 60.30, 13.4),
    ("A5s", 4, 60.03, 13.7),
    ("K9s", 4, 59.94, 14.0),
    ("55", 6, 59.86, 14.5),
    ("KTo", 12, 59.80, 15.4),
    ("A9o", 12, 59.72, 16.3),
    ("QJs", 4, 59.54, 16.6),
    ("A6s", 4, 59.47, 16.9),
    ("QTs", 4, 59.23, 17.2),
    ("A4s", 4, 58.79, 17.5),
    ("A3s", 4, 58.29, 17.8),
    ("A7o", 12, 58.26, 18.7),
    ("QJo", 12, 58.15, 19.6),
    ("K8s", 4, 57.84, 19.9),
    ("A2s", 4, 57.73, 20.2),
    ("A6o", 12, 57.65, 21.1),
    ("K9o", 12, 57.43, 22.0),
    ("QTo", 12, 57.30, 22.9),
    ("K7s", 4, 57.17, 23.2),
    ("JTs", 4, 57.11, 23.5),
    ("A5o", 12, 56.96, 24.4),
    ("A4o", 12, 56.86, 25.3),
    ("Q9s", 4, 56.70, 25.6),
    ("44", 6, 56.65, 26.1),
    ("K6s", 4, 56.34, 26.4),
    ("Q8s", 4, 56.02, 26.7),
    ("JTo", 12, 55.93, 27.6),
    ("K8o", 12, 55.81, 28.5),
    ("K5s", 4, 55.78, 28.8),
    ("A3o", 12, 55.65, 29.7),
    ("J9s", 4, 55.35, 30.0),
    ("A2o", 12, 55.06, 30.9),
    ("Q9o", 12, 55.04, 31.8),
    ("K4s", 4, 55.02, 32.1),
    ("K6o", 12, 54.96, 33.0),
    ("K7o", 12, 54.69, 33.9),
    ("K3s", 4, 54.55, 34.2),
    ("Q6s", 4, 54.43, 34.5),
    ("Q7s", 4, 54.22, 34.8),
    ("T9s", 4, 54.02, 35.1),
    ("K2s", 4, 53.83, 35.4),
    ("Q8o", 12, 53.74, 36.3),
    ("33", 6, 53.31, 36.8),
    ("J8s", 4, 53.19, 37.1),
    ("K5o", 12, 53.18, 38.0),
    ("K4o", 12, 52.76, 38.9),
    ("Q7o", 12, 52.71, 39.8),
    ("J9o", 12, 52.70, 40.7),
    ("T9o", 12, 52.19, 41.6),
    ("J7s", 4, 52.13, 41.9),
    ("K2o", 12, 52.03, 42.8),
    ("T8s", 4, 51.90, 43.1),
    ("Q5s", 4, 51.86, 43.4),
    ("Q3s", 4, 51.46, 43.7),
    ("K3o", 12, 51.42, 44.6),
    ("J8o", 12, 51.38, 45.6),
    ("Q6o", 12, 51.00, 46.5),
    ("Q4s", 4, 50.86, 46.8),
    ("J6s", 4, 50.81, 47.1),
    ("98s", 4, 50.40, 47.4),
    ("Q5o", 12, 50.21, 48.3),
    ("T8o", 12, 50.18, 49.2),
    ("22", 6, 50.15, 49.6),
    ("T7s", 4, 50.11, 49.9),
    ("J5s", 4, 49.99, 50.2),
    ("Q2s", 4, 49.77, 50.5),
    ("J7o", 12, 49.56, 51.4),
    ("J4s", 4, 48.52, 51.7),
    ("97s", 4, 48.50, 52.0),
    ("J6o", 12, 48.50, 52.9),
    ("98o", 12, 48.43, 53.8),
    ("96s", 4, 48.39, 54.1),
    ("J3s", 4, 48.27, 54.4),
    ("T6s", 4, 48.25, 54.8),
    ("Q3o", 12, 48.10, 55.7),
    ("Q4o", 12, 48.04, 56.6),
    ("T7o", 12, 48.02, 57.5),
    ("Q2o", 12, 47.96, 58.4),
    ("87s", 4, 47.48, 58.7),
    ("J5o", 12, 47.06, 59.6),
    ("J2s", 4, 46.85, 59.9),
    ("T5s", 4, 46.68, 60.2),
    ("86s", 4, 46.50, 60.5),
    ("J4o", 12, 46.41, 61.4),
    ("T4s", 4, 46.37, 61.7),
    ("97o", 12, 46.31, 62.6),
    ("76s", 4, 46.15, 62.9),
    ("95s", 4, 45.93, 63.2),
    ("T6o", 12, 45.78, 64.1),
    ("T3s", 4, 45.60, 64.4),
    ("T2s", 4, 45.60, 64.7),
    ("85s", 4, 44.83, 65.0),
    ("J2o", 12, 44.42, 65.9),
    ("T5o", 12, 44.39, 66.8),
    ("75s", 4, 44.23, 67.1),
    ("87o", 12, 44.20, 68.0),
    ("T4o", 12, 44.05, 68.9),
    ("J3o", 12, 44.04, 69.8),
    ("96o", 12, 43.92, 70.7),
    ("94s", 4, 43.75, 71.0),
    ("93s", 4, 43.35, 71.3),
    ("76o", 12, 43.17, 72.2),
    ("65s", 4, 43.05, 72.5),
    ("95o", 12, 42.64, 73.5),
    ("84s", 4, 42.57, 73.8),
    ("74s", 4, 42.50, 74.1),
    ("86o", 12, 42.49, 75.0),
    ("T2o", 12, 42.37, 75.9),
    ("T3o", 12, 42.33, 76.8),
    ("92s", 4, 42.18, 77.1),
    ("54s", 4, 41.34, 77.4),
    ("83s", 4, 41.07, 77.7),
    ("85o", 12, 40.98, 78.6),
    ("64s", 4, 40.44, 78.9),
    ("75o", 12, 40.22, 79.8),
    ("53s", 4, 40.17, 80.1),
    ("94o", 12, 40.17, 81.0),
    ("82s", 4, 40.14, 81.3),
    ("65o", 12, 39.78, 82.2),
    ("73s", 4, 39.77, 82.5),
    ("63s", 4, 39.57, 82.8),
    ("93o", 12, 39.57, 83.7),
    ("84o", 12, 39.08, 84.6),
    ("92o", 12, 38.82, 85.5),
    ("74o", 12, 38.57, 86.4),
    ("43s", 4, 38.28, 86.7),
    ("83o", 12, 38.05, 87.6),
    ("54o", 12, 37.86, 88.5),
    ("62s", 4, 37.81, 88.8),
    ("52s", 4, 37.70, 89.1),
    ("72s", 4, 37.60, 89.4),
    ("64o", 12, 37.27, 90.3),
    ("63o", 12, 37.07, 91.3),
    ("82o", 12, 37.01, 92.2),
    ("73o", 12, 36.81, 93.1),
    ("42s", 4, 36.33, 93.4),
    ("53o", 12, 36.01, 94.3),
    ("32s", 4, 35.93, 94.6),
    ("43o", 12, 35.25, 95.5),
    ("72o", 12, 34.98, 96.4),
    ("52o", 12, 34.55, 97.3),
    ("42o", 12, 34.06, 98.2),
    ("62o", 12, 33.68, 99.1),
    ("32o", 12, 32.57, 100.0),
];
