//! Per-hand replay state: street, board, pot, contributions and the
//! player set, advanced one log line at a time.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::action::{Action, Verb};
use crate::cards::Card;
use crate::parser;
use crate::record::{RawLogRecord, Street};

/// Board cards known at each street. Each street holds the cumulative
/// board (turn = 4 cards, river = 5).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub flop: Vec<Card>,
    pub turn: Vec<Card>,
    pub river: Vec<Card>,
    /// Streets whose header carried fewer cards than expected and were
    /// rebuilt from the previous street plus the last card seen
    pub recovered: Vec<Street>,
}

impl Board {
    pub fn at(&self, street: Street) -> &[Card] {
        match street {
            Street::Preflop => &[],
            Street::Flop => &self.flop,
            Street::Turn => &self.turn,
            Street::River => &self.river,
        }
    }
}

/// Stack-to-pot snapshot taken when a street is dealt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetSpr {
    pub pot: Option<f64>,
    /// Smallest remaining stack among active players over the pot; `None`
    /// when any active player's stack is unknown
    pub table: Option<f64>,
    pub players: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub id: String,
    pub name: String,
    pub contribution_hand: f64,
    pub contribution_street: f64,
    pub active: bool,
    pub folded: bool,
    pub all_in: bool,
    pub all_in_street: Option<Street>,
    pub collected: bool,
    pub shown: Option<[Card; 2]>,
    /// Action texts per street, indexed by `Street::index`
    pub actions: [Vec<String>; 4],
}

impl PlayerState {
    fn new(id: &str, name: &str) -> Self {
        PlayerState {
            id: id.to_string(),
            name: if name.is_empty() { id.to_string() } else { name.to_string() },
            contribution_hand: 0.0,
            contribution_street: 0.0,
            active: true,
            folded: false,
            all_in: false,
            all_in_street: None,
            collected: false,
            shown: None,
            actions: Default::default(),
        }
    }

    pub fn actions_on(&self, street: Street) -> &[String] {
        &self.actions[street.index()]
    }

    pub fn all_actions(&self) -> impl Iterator<Item = &String> {
        self.actions.iter().flatten()
    }
}

/// Replays one hand. Street only moves forward; players join the hand on
/// their first recognised action.
#[derive(Debug, Clone)]
pub struct HandStateTracker {
    street: Street,
    pot: f64,
    board: Board,
    players: Vec<PlayerState>,
    index: HashMap<String, usize>,
    stacks: HashMap<String, f64>,
    spr: [StreetSpr; 3],
    small_blind: Option<String>,
    big_blind: Option<String>,
    button: Option<String>,
    preflop_order: Vec<String>,
}

impl Default for HandStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl HandStateTracker {
    pub fn new() -> Self {
        HandStateTracker {
            street: Street::Preflop,
            pot: 0.0,
            board: Board::default(),
            players: Vec::new(),
            index: HashMap::new(),
            stacks: HashMap::new(),
            spr: Default::default(),
            small_blind: None,
            big_blind: None,
            button: None,
            preflop_order: Vec::new(),
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn pot(&self) -> f64 {
        self.pot
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.index.get(id).map(|&i| &self.players[i])
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.player(id).is_some_and(|p| p.active)
    }

    pub fn is_folded(&self, id: &str) -> bool {
        self.player(id).is_some_and(|p| p.folded)
    }

    pub fn active_ids(&self) -> impl Iterator<Item = &str> {
        self.players.iter().filter(|p| p.active).map(|p| p.id.as_str())
    }

    pub fn starting_stack(&self, id: &str) -> Option<f64> {
        self.stacks.get(id).copied()
    }

    pub fn spr(&self, street: Street) -> Option<&StreetSpr> {
        match street {
            Street::Preflop => None,
            s => self.spr.get(s.index() - 1),
        }
    }

    pub fn small_blind(&self) -> Option<&str> {
        self.small_blind.as_deref()
    }

    pub fn big_blind(&self) -> Option<&str> {
        self.big_blind.as_deref()
    }

    pub fn button(&self) -> Option<&str> {
        self.button.as_deref()
    }

    pub fn preflop_order(&self) -> &[String] {
        &self.preflop_order
    }

    /// Applies the non-action content of a line: stack data, the button
    /// marker and street headers. Returns the new street when the line
    /// advanced it.
    pub fn observe_line(&mut self, record: &RawLogRecord) -> Option<Street> {
        let msg = record.msg.as_str();
        for (pid, amount) in record.structured_stacks() {
            self.stacks.insert(pid, amount);
        }
        for (pid, amount) in parser::parse_player_stacks_line(msg) {
            self.stacks.insert(pid, amount);
        }
        if let Some(pid) = parser::parse_button_player(msg) {
            self.button = Some(pid);
        }

        let next = parser::parse_street_header(msg)?;
        if next <= self.street {
            return None;
        }
        self.street = next;
        for p in &mut self.players {
            p.contribution_street = 0.0;
        }
        self.deal_board(next, &parser::extract_cards(msg));
        self.snapshot_spr(next);
        Some(next)
    }

    fn deal_board(&mut self, street: Street, cards: &[Card]) {
        let expected = street.board_len();
        if cards.len() >= expected {
            let dealt = cards[..expected].to_vec();
            self.set_board(street, dealt);
            return;
        }
        let Some(last) = cards.last() else {
            return;
        };
        if street == Street::Flop {
            self.set_board(street, cards.to_vec());
            return;
        }
        let mut rebuilt = self.board.at(prev_street(street)).to_vec();
        rebuilt.push(*last);
        rebuilt.truncate(expected);
        tracing::warn!(
            street = ?street,
            cards_seen = cards.len(),
            rebuilt = rebuilt.len(),
            "street header short of board cards, rebuilt from previous street"
        );
        self.board.recovered.push(street);
        self.set_board(street, rebuilt);
    }

    fn set_board(&mut self, street: Street, cards: Vec<Card>) {
        match street {
            Street::Preflop => {}
            Street::Flop => self.board.flop = cards,
            Street::Turn => self.board.turn = cards,
            Street::River => self.board.river = cards,
        }
    }

    fn snapshot_spr(&mut self, street: Street) {
        if self.pot <= 0.0 {
            return;
        }
        let pot = round2(self.pot);
        let mut snap = StreetSpr {
            pot: Some(pot),
            ..Default::default()
        };
        let mut smallest: Option<f64> = None;
        let mut missing: Vec<&str> = Vec::new();
        for p in self.players.iter().filter(|p| p.active) {
            let ratio = match self.stacks.get(&p.id) {
                Some(&stack) if stack > 0.0 => {
                    let remain = (stack - p.contribution_hand).max(0.0);
                    smallest = Some(smallest.map_or(remain, |s: f64| s.min(remain)));
                    Some(round2(remain / pot))
                }
                _ => {
                    missing.push(&p.id);
                    None
                }
            };
            snap.players.insert(p.id.clone(), ratio);
        }
        if missing.is_empty() {
            snap.table = smallest.map(|s| round2(s / pot));
        } else {
            tracing::warn!(
                street = ?street,
                pot,
                missing = ?missing,
                "active players without a starting stack, SPR left empty"
            );
        }
        if let Some(slot) = self.spr.get_mut(street.index() - 1) {
            *slot = snap;
        }
    }

    /// Applies a parsed action from `msg` to the hand.
    pub fn apply_action(&mut self, action: &Action, msg: &str) {
        let street = self.street;
        let idx = self.ensure_player(&action.player_id, &action.player_name);

        if let Some(stack) = parser::parse_stack_mention(msg)
            && stack > 0.0
        {
            self.stacks.insert(action.player_id.clone(), stack);
        }

        if street == Street::Preflop
            && action.verb.is_decision()
            && !self.preflop_order.contains(&action.player_id)
        {
            self.preflop_order.push(action.player_id.clone());
        }

        if action.verb == Verb::Posts {
            let lower = msg.to_lowercase();
            if lower.contains("small blind") {
                self.small_blind = Some(action.player_id.clone());
            }
            if lower.contains("big blind") {
                self.big_blind = Some(action.player_id.clone());
            }
        }

        let player = &mut self.players[idx];
        player.actions[street.index()].push(action.text());

        match action.verb {
            Verb::Shows => {
                let cards = parser::extract_cards(msg);
                if cards.len() >= 2 {
                    player.shown = Some([cards[0], cards[1]]);
                }
            }
            Verb::Collected => player.collected = true,
            Verb::Folds => {
                player.folded = true;
                player.active = false;
            }
            _ => {}
        }
        if action.is_all_in {
            player.all_in = true;
            player.all_in_street.get_or_insert(street);
        }

        if action.verb.is_wager() {
            let increment = match (action.verb, action.to_amount) {
                (Verb::Raises, Some(to)) if to > 0.0 => {
                    let previous = player.contribution_street;
                    (to - previous).max(0.0)
                }
                _ => action.amount.max(0.0),
            };
            if increment > 0.0 {
                player.contribution_street += increment;
                player.contribution_hand += increment;
                self.pot += increment;
            }
        }
    }

    fn ensure_player(&mut self, id: &str, name: &str) -> usize {
        if let Some(&i) = self.index.get(id) {
            return i;
        }
        let i = self.players.len();
        self.players.push(PlayerState::new(id, name));
        self.index.insert(id.to_string(), i);
        i
    }
}

fn prev_street(street: Street) -> Street {
    match street {
        Street::Preflop | Street::Flop => Street::Preflop,
        Street::Turn => Street::Flop,
        Street::River => Street::Turn,
    }
}

/// Rounds to two decimals.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
