use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Seat label derived from blind posts, the button marker and preflop
/// action order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "SB")]
    SmallBlind,
    #[serde(rename = "BB")]
    BigBlind,
    /// Heads-up seat that posted both blinds
    #[serde(rename = "SB/BB")]
    SmallBigBlind,
    /// First seat to act after the blinds
    #[serde(rename = "UTG")]
    UnderTheGun,
    #[serde(rename = "EP")]
    Early,
    #[serde(rename = "LP")]
    Late,
    #[serde(rename = "BTN")]
    Button,
}

impl Position {
    pub fn label(self) -> &'static str {
        match self {
            Position::SmallBlind => "SB",
            Position::BigBlind => "BB",
            Position::SmallBigBlind => "SB/BB",
            Position::UnderTheGun => "UTG",
            Position::Early => "EP",
            Position::Late => "LP",
            Position::Button => "BTN",
        }
    }
}

pub type PositionMap = BTreeMap<String, Position>;

/// Everything the assigner needs from one hand.
#[derive(Debug, Clone, Default)]
pub struct SeatingInput<'a> {
    /// Every player who acted, in first-appearance order
    pub players: &'a [String],
    pub small_blind: Option<&'a str>,
    pub big_blind: Option<&'a str>,
    /// Explicit button/dealer marker
    pub button: Option<&'a str>,
    /// Players in order of their first voluntary preflop decision
    pub preflop_order: &'a [String],
}

/// Labels for the non-blind, non-button seats. The first seat is always
/// UTG; the rest split between early and late, growing the early bucket
/// first.
pub fn middle_labels(count: usize) -> Vec<Position> {
    match count {
        0 => Vec::new(),
        1 => vec![Position::UnderTheGun],
        2 => vec![Position::UnderTheGun, Position::Early],
        3 => vec![Position::UnderTheGun, Position::Early, Position::Late],
        _ => {
            let mut early = 1;
            let mut late = 1;
            let mut filled = 3;
            while filled < count {
                early += 1;
                filled += 1;
                if filled < count {
                    late += 1;
                    filled += 1;
                }
            }
            let mut labels = vec![Position::UnderTheGun];
            labels.extend(std::iter::repeat_n(Position::Early, early));
            labels.extend(std::iter::repeat_n(Position::Late, late));
            labels
        }
    }
}

/// Deterministic position assignment. Blinds are labelled first and left
/// out of the middle ordering; the button falls back to the last player
/// in that ordering when no usable marker exists.
pub fn assign_positions(input: &SeatingInput<'_>) -> PositionMap {
    let mut positions = PositionMap::new();
    let mut excluded: HashSet<&str> = HashSet::new();

    if let Some(sb) = input.small_blind {
        positions.insert(sb.to_string(), Position::SmallBlind);
        excluded.insert(sb);
    }
    if let Some(bb) = input.big_blind {
        let label = if positions.get(bb) == Some(&Position::SmallBlind) {
            Position::SmallBigBlind
        } else {
            Position::BigBlind
        };
        positions.insert(bb.to_string(), label);
        excluded.insert(bb);
    }

    let mut ordered: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for pid in input.preflop_order.iter().chain(input.players) {
        let pid = pid.as_str();
        if pid.is_empty() || excluded.contains(pid) {
            continue;
        }
        if seen.insert(pid) {
            ordered.push(pid);
        }
    }

    let button = match input.button {
        Some(b) if !excluded.contains(b) && input.players.iter().any(|p| p == b) => Some(b),
        _ => ordered.last().copied(),
    };

    let middle: Vec<&str> = ordered.iter().copied().filter(|p| Some(*p) != button).collect();
    let labels = middle_labels(middle.len());
    for (idx, pid) in middle.iter().enumerate() {
        let label = labels.get(idx).copied().unwrap_or(Position::Early);
        positions.insert(pid.to_string(), label);
    }
    if let Some(b) = button {
        positions.insert(b.to_string(), Position::Button);
    }

    for pid in input.players {
        positions.entry(pid.clone()).or_insert(Position::Late);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn middle_label_growth() {
        use Position::*;
        assert_eq!(middle_labels(4), vec![UnderTheGun, Early, Early, Late]);
        assert_eq!(middle_labels(5), vec![UnderTheGun, Early, Early, Late, Late]);
        assert_eq!(middle_labels(6), vec![UnderTheGun, Early, Early, Early, Late, Late]);
    }

    #[test]
    fn six_handed_with_marker() {
        let players = ids(&["sb", "bb", "u", "m", "c", "b"]);
        let order = ids(&["u", "m", "c", "b", "sb", "bb"]);
        let map = assign_positions(&SeatingInput {
            players: &players,
            small_blind: Some("sb"),
            big_blind: Some("bb"),
            button: Some("b"),
            preflop_order: &order,
        });
        assert_eq!(map["sb"], Position::SmallBlind);
        assert_eq!(map["bb"], Position::BigBlind);
        assert_eq!(map["u"], Position::UnderTheGun);
        assert_eq!(map["m"], Position::Early);
        assert_eq!(map["c"], Position::Late);
        assert_eq!(map["b"], Position::Button);
    }

    #[test]
    fn button_falls_back_to_last_actor() {
        let players = ids(&["sb", "bb", "x", "y"]);
        let order = ids(&["x", "y"]);
        let map = assign_positions(&SeatingInput {
            players: &players,
            small_blind: Some("sb"),
            big_blind: Some("bb"),
            button: None,
            preflop_order: &order,
        });
        assert_eq!(map["y"], Position::Button);
        assert_eq!(map["x"], Position::UnderTheGun);
        assert_eq!(map.values().filter(|p| **p == Position::Button).count(), 1);
    }

    #[test]
    fn heads_up_dual_blind() {
        let players = ids(&["a", "b"]);
        let order = ids(&["b"]);
        let map = assign_positions(&SeatingInput {
            players: &players,
            small_blind: Some("a"),
            big_blind: Some("a"),
            button: None,
            preflop_order: &order,
        });
        assert_eq!(map["a"], Position::SmallBigBlind);
        assert_eq!(map["b"], Position::Button);
    }

    #[test]
    fn marker_on_a_blind_is_ignored() {
        let players = ids(&["sb", "bb", "x"]);
        let order = ids(&["x"]);
        let map = assign_positions(&SeatingInput {
            players: &players,
            small_blind: Some("sb"),
            big_blind: Some("bb"),
            button: Some("sb"),
            preflop_order: &order,
        });
        assert_eq!(map["sb"], Position::SmallBlind);
        assert_eq!(map["x"], Position::Button);
    }

    #[test]
    fn marker_on_a_non_actor_is_ignored() {
        let players = ids(&["sb", "bb", "x", "y"]);
        let order = ids(&["x", "y"]);
        let map = assign_positions(&SeatingInput {
            players: &players,
            small_blind: Some("sb"),
            big_blind: Some("bb"),
            button: Some("ghost"),
            preflop_order: &order,
        });
        assert!(!map.contains_key("ghost"));
        assert_eq!(map.len(), 4);
        assert_eq!(map["y"], Position::Button);
        assert_eq!(map["x"], Position::UnderTheGun);
    }

    #[test]
    fn deterministic_for_same_input() {
        let players = ids(&["a", "b", "c", "d", "e"]);
        let order = ids(&["c", "d", "e"]);
        let input = SeatingInput {
            players: &players,
            small_blind: Some("a"),
            big_blind: Some("b"),
            button: None,
            preflop_order: &order,
        };
        assert_eq!(assign_positions(&input), assign_positions(&input));
    }
}
