//! Assembles one [`HandFact`] from a hand's raw log.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};
use crate::errors::SkipReason;
use crate::hand::street_hand_label;
use crate::parser;
use crate::position::{PositionMap, SeatingInput, assign_positions};
use crate::range::{RangeInfo, classify};
use crate::record::{RawLogRecord, Street, sort_records};
use crate::state::{HandStateTracker, PlayerState, StreetSpr};
use crate::stats::{PlayerHandStat, StatAccumulator};

/// Document id under which a fact is stored.
pub fn fact_id(game_id: &str, hand_number: u32) -> String {
    format!("{}_{}", game_id, hand_number)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub flop: Vec<String>,
    pub turn: Vec<String>,
    pub river: Vec<String>,
    /// Streets rebuilt from a short street header
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recovered: Vec<Street>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetSprSet {
    pub flop: StreetSpr,
    pub turn: StreetSpr,
    pub river: StreetSpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCard {
    pub rank: Rank,
    pub suit: Suit,
}

impl From<Card> for RawCard {
    fn from(c: Card) -> Self {
        RawCard {
            rank: c.rank,
            suit: c.suit,
        }
    }
}

/// A player who showed hole cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowdownFact {
    pub player_id: String,
    pub player_name: String,
    pub hole_cards: Vec<String>,
    pub hole_cards_raw: Vec<RawCard>,
    pub range: RangeInfo,
    pub all_in_hand: bool,
    pub is_all_in_player: bool,
    pub all_in_street: Option<Street>,
    pub flop_hand_type: String,
    pub flop_spr: Option<f64>,
    pub flop_action: String,
    pub turn_hand_type: String,
    pub turn_spr: Option<f64>,
    pub turn_action: String,
    pub river_hand_type: String,
    pub river_spr: Option<f64>,
    pub river_action: String,
}

/// The persisted record of one hand. Rebuilding from the same log yields
/// an identical value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFact {
    pub id: String,
    pub game_id: String,
    pub hand_number: u32,
    pub player_count: usize,
    pub board: BoardSnapshot,
    pub positions: PositionMap,
    pub street_spr: StreetSprSet,
    pub players: Vec<PlayerHandStat>,
    pub all_in_hand: bool,
    pub all_in_player_ids: Vec<String>,
    pub showdown_players: Vec<ShowdownFact>,
}

impl HandFact {
    pub fn player(&self, id: &str) -> Option<&PlayerHandStat> {
        self.players.iter().find(|p| p.player_id == id)
    }
}

/// Replays `records` and builds the hand's fact. A log without any
/// recognised player action is a skip, not an error.
pub fn build_hand_fact(
    game_id: &str,
    hand_number: u32,
    records: &[RawLogRecord],
) -> Result<HandFact, SkipReason> {
    if records.is_empty() {
        return Err(SkipReason::EmptyLog);
    }
    let span = tracing::debug_span!("hand", game_id, hand_number);
    let _enter = span.enter();

    let mut state = HandStateTracker::new();
    let mut stats = StatAccumulator::new();
    for record in sort_records(records) {
        if record.msg.is_empty() {
            continue;
        }
        if state.observe_line(record) == Some(Street::Flop) {
            stats.on_flop(&state);
        }
        if let Some(action) = parser::parse_action(&record.msg, state.street()) {
            state.apply_action(&action, &record.msg);
            stats.on_action(&action, &state);
        }
    }

    if state.players().is_empty() {
        return Err(SkipReason::NoPlayerActions);
    }

    let player_ids = state.player_ids();
    let positions = assign_positions(&SeatingInput {
        players: &player_ids,
        small_blind: state.small_blind(),
        big_blind: state.big_blind(),
        button: state.button(),
        preflop_order: state.preflop_order(),
    });
    let players = stats.finish(&state, &positions);

    let all_in_player_ids: Vec<String> = state
        .players()
        .iter()
        .filter(|p| p.all_in)
        .map(|p| p.id.clone())
        .collect();
    let all_in_hand = !all_in_player_ids.is_empty();
    let showdown_players = state
        .players()
        .iter()
        .filter_map(|p| showdown_fact(p, &state, all_in_hand))
        .collect();

    let board = state.board();
    let spr_at = |s: Street| state.spr(s).cloned().unwrap_or_default();
    let fact = HandFact {
        id: fact_id(game_id, hand_number),
        game_id: game_id.to_string(),
        hand_number,
        player_count: player_ids.len(),
        board: BoardSnapshot {
            flop: board.flop.iter().map(Card::text).collect(),
            turn: board.turn.iter().map(Card::text).collect(),
            river: board.river.iter().map(Card::text).collect(),
            recovered: board.recovered.clone(),
        },
        positions,
        street_spr: StreetSprSet {
            flop: spr_at(Street::Flop),
            turn: spr_at(Street::Turn),
            river: spr_at(Street::River),
        },
        players,
        all_in_hand,
        all_in_player_ids,
        showdown_players,
    };
    tracing::debug!(
        players = fact.player_count,
        showdowns = fact.showdown_players.len(),
        "hand fact built"
    );
    Ok(fact)
}

fn showdown_fact(p: &PlayerState, state: &HandStateTracker, all_in_hand: bool) -> Option<ShowdownFact> {
    let hole = p.shown?;
    let board = state.board();
    let flop = board.flop.as_slice();
    let turn = if board.turn.is_empty() { flop } else { board.turn.as_slice() };
    let river = if board.river.is_empty() { turn } else { board.river.as_slice() };
    let label = |cards: &[Card], need: usize| {
        if cards.len() >= need {
            street_hand_label(&hole, cards)
        } else {
            String::new()
        }
    };
    let spr = |s: Street| {
        state
            .spr(s)
            .and_then(|snap| snap.players.get(&p.id).copied().flatten())
    };
    let line = |s: Street| p.actions_on(s).join(" -> ");

    Some(ShowdownFact {
        player_id: p.id.clone(),
        player_name: p.name.clone(),
        hole_cards: hole.iter().map(Card::text).collect(),
        hole_cards_raw: hole.iter().copied().map(RawCard::from).collect(),
        range: classify(&hole),
        all_in_hand,
        is_all_in_player: p.all_in,
        all_in_street: p.all_in_street,
        flop_hand_type: label(flop, 3),
        flop_spr: spr(Street::Flop),
        flop_action: line(Street::Flop),
        turn_hand_type: label(turn, 4),
        turn_spr: spr(Street::Turn),
        turn_action: line(Street::Turn),
        river_hand_type: label(river, 5),
        river_spr: spr(Street::River),
        river_action: line(Street::River),
    })
}
