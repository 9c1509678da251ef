//! Per-player statistic counters, derived in the same replay pass as the
//! hand state.
//!
//! Every statistic is an opportunity/count pair. Triggers latch once per
//! hand; the two "facing" situations (a 3-bet preflop, a c-bet on the flop)
//! go through an explicit [`Facing`] state so each player resolves them at
//! most once.

use std::collections::BTreeSet;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::action::{Action, Verb};
use crate::position::{Position, PositionMap};
use crate::record::Street;
use crate::state::HandStateTracker;

/// Response state for a one-shot facing situation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Facing {
    #[default]
    None,
    /// Opportunity granted; the player's next action resolves it
    Pending,
    Resolved,
}

/// An opportunity and whether it was taken.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Chance {
    pub opp: bool,
    pub taken: bool,
}

impl Chance {
    fn offer(&mut self) {
        self.opp = true;
    }

    fn take(&mut self) {
        self.taken = true;
    }
}

/// Flags gathered for one player while the hand replays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerFlags {
    pub vpip: bool,
    pub pfr: bool,
    pub limp: bool,
    pub saw_flop: bool,
    pub cbet: Chance,
    pub three_bet: Chance,
    pub four_bet: Chance,
    pub isolate: Chance,
    pub fold_to_three_bet: Chance,
    pub fold_to_flop_cbet: Chance,
    pub raise_vs_flop_cbet: Chance,
    pub facing_three_bet: Facing,
    pub facing_cbet: Facing,
}

/// Hand-wide betting history the triggers depend on.
#[derive(Debug, Clone, Default)]
struct Betting {
    preflop_raises: u32,
    preflop_aggressor: Option<String>,
    limpers: BTreeSet<String>,
    voluntary: Vec<String>,
    flop_aggression_started: bool,
    cbet_triggered: bool,
}

/// Consumes the replay one event at a time and produces a
/// [`PlayerHandStat`] per player at the end of the hand.
#[derive(Debug, Clone, Default)]
pub struct StatAccumulator {
    flags: Vec<(String, PlayerFlags)>,
    betting: Betting,
}

impl StatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self, id: &str) -> Option<&PlayerFlags> {
        self.flags.iter().find(|(pid, _)| pid == id).map(|(_, f)| f)
    }

    fn flags_mut(&mut self, id: &str) -> &mut PlayerFlags {
        let pos = match self.flags.iter().position(|(pid, _)| pid == id) {
            Some(pos) => pos,
            None => {
                self.flags.push((id.to_string(), PlayerFlags::default()));
                self.flags.len() - 1
            }
        };
        &mut self.flags[pos].1
    }

    /// Called when the flop is dealt, before any flop action.
    pub fn on_flop(&mut self, state: &HandStateTracker) {
        let active: Vec<String> = state.active_ids().map(str::to_string).collect();
        for pid in &active {
            self.flags_mut(pid).saw_flop = true;
        }
        if let Some(aggressor) = self.betting.preflop_aggressor.clone()
            && state.is_active(&aggressor)
        {
            self.flags_mut(&aggressor).cbet.offer();
        }
    }

    /// Called after the tracker has applied `action`.
    pub fn on_action(&mut self, action: &Action, state: &HandStateTracker) {
        let pid = action.player_id.as_str();
        self.flags_mut(pid);
        if action.verb == Verb::Shows {
            self.flags_mut(pid).saw_flop = true;
        }
        match action.street {
            Street::Preflop => self.preflop(action, state),
            Street::Flop => self.flop(action, state),
            Street::Turn | Street::River => {}
        }
    }

    fn preflop(&mut self, action: &Action, state: &HandStateTracker) {
        let pid = action.player_id.as_str();
        let verb = action.verb;
        let aggressive = verb.is_aggressive();
        let no_raise_yet = self.betting.preflop_raises == 0;
        let is_aggressor = self.betting.preflop_aggressor.as_deref() == Some(pid);
        let is_limper = self.betting.limpers.contains(pid);
        let has_limpers = !self.betting.limpers.is_empty();
        let single_raise = self.betting.preflop_raises == 1;

        if verb.is_voluntary() {
            self.flags_mut(pid).vpip = true;
            if !self.betting.voluntary.iter().any(|v| v == pid) {
                self.betting.voluntary.push(pid.to_string());
            }
        }
        if aggressive {
            self.flags_mut(pid).pfr = true;
        }
        if verb == Verb::Calls && no_raise_yet {
            self.flags_mut(pid).limp = true;
            self.betting.limpers.insert(pid.to_string());
        }

        let flags = self.flags_mut(pid);
        if no_raise_yet && has_limpers && !is_limper && !flags.isolate.opp && verb.is_decision() {
            flags.isolate.offer();
            if aggressive {
                flags.isolate.take();
            }
        }
        if single_raise && verb.is_decision() && !is_aggressor && !flags.three_bet.opp {
            flags.three_bet.offer();
            if aggressive {
                flags.three_bet.take();
            }
        }
        if flags.facing_three_bet == Facing::Pending && verb.is_decision() {
            match verb {
                Verb::Folds => flags.fold_to_three_bet.take(),
                v if v.is_aggressive() => flags.four_bet.take(),
                _ => {}
            }
            flags.facing_three_bet = Facing::Resolved;
        }

        if aggressive {
            if single_raise && !is_aggressor {
                self.open_facing_three_bet(pid, state);
            }
            self.betting.preflop_raises += 1;
            self.betting.preflop_aggressor = Some(pid.to_string());
        }
    }

    fn open_facing_three_bet(&mut self, raiser: &str, state: &HandStateTracker) {
        let targets: Vec<String> = self
            .betting
            .voluntary
            .iter()
            .filter(|v| v.as_str() != raiser && !state.is_folded(v))
            .cloned()
            .collect();
        for target in targets {
            let flags = self.flags_mut(&target);
            if flags.facing_three_bet != Facing::None {
                continue;
            }
            flags.fold_to_three_bet.offer();
            flags.four_bet.offer();
            flags.facing_three_bet = Facing::Pending;
        }
    }

    fn flop(&mut self, action: &Action, state: &HandStateTracker) {
        let pid = action.player_id.as_str();
        let verb = action.verb;
        self.flags_mut(pid).saw_flop = true;

        if !self.betting.flop_aggression_started && verb.is_aggressive() {
            self.betting.flop_aggression_started = true;
            let offered = self.flags(pid).is_some_and(|f| f.cbet.opp);
            if offered && self.betting.preflop_aggressor.as_deref() == Some(pid) {
                self.betting.cbet_triggered = true;
                self.flags_mut(pid).cbet.take();
                let defenders: Vec<String> = state
                    .active_ids()
                    .filter(|d| *d != pid)
                    .map(str::to_string)
                    .collect();
                for defender in defenders {
                    let flags = self.flags_mut(&defender);
                    flags.fold_to_flop_cbet.offer();
                    flags.raise_vs_flop_cbet.offer();
                    flags.facing_cbet = Facing::Pending;
                }
            }
        }

        if self.betting.cbet_triggered && verb.is_decision() {
            let flags = self.flags_mut(pid);
            if flags.facing_cbet == Facing::Pending {
                match verb {
                    Verb::Folds => flags.fold_to_flop_cbet.take(),
                    v if v.is_aggressive() => flags.raise_vs_flop_cbet.take(),
                    _ => {}
                }
                flags.facing_cbet = Facing::Resolved;
            }
        }
    }

    /// Closes the hand and emits one stat row per player, in the order the
    /// players joined the hand.
    pub fn finish(&self, state: &HandStateTracker, positions: &PositionMap) -> Vec<PlayerHandStat> {
        let survivors = state.players().iter().filter(|p| !p.folded).count();
        state
            .players()
            .iter()
            .map(|p| {
                let flags = self.flags(&p.id).cloned().unwrap_or_default();
                let showdown = (survivors >= 2 && !p.folded) || p.shown.is_some();
                let count_prefix = |prefix: &str| {
                    p.all_actions().filter(|t| t.starts_with(prefix)).count() as u32
                };
                let count_exact =
                    |text: &str| p.all_actions().filter(|t| t.as_str() == text).count() as u32;
                let spr_for = |street: Street| {
                    state
                        .spr(street)
                        .and_then(|s| s.players.get(&p.id).copied().flatten())
                };
                PlayerHandStat {
                    player_id: p.id.clone(),
                    player_name: p.name.clone(),
                    position: positions.get(&p.id).copied(),
                    hands: 1,
                    vpip_hands: flags.vpip.into(),
                    pfr_hands: flags.pfr.into(),
                    limp_hands: flags.limp.into(),
                    saw_flop_hands: flags.saw_flop.into(),
                    bets: count_prefix("bets"),
                    raises: count_prefix("raises"),
                    calls: count_prefix("calls"),
                    checks: count_exact("checks"),
                    folds: count_exact("folds"),
                    showdowns: showdown.into(),
                    showdown_wins: (showdown && p.collected).into(),
                    cbet_opp: flags.cbet.opp.into(),
                    cbet_count: flags.cbet.taken.into(),
                    bet3_opp: flags.three_bet.opp.into(),
                    bet3_count: flags.three_bet.taken.into(),
                    bet4_opp: flags.four_bet.opp.into(),
                    bet4_count: flags.four_bet.taken.into(),
                    isolate_opp: flags.isolate.opp.into(),
                    isolate_count: flags.isolate.taken.into(),
                    fold_to3bet_opp: flags.fold_to_three_bet.opp.into(),
                    fold_to3bet_count: flags.fold_to_three_bet.taken.into(),
                    fold_to_flop_cbet_opp: flags.fold_to_flop_cbet.opp.into(),
                    fold_to_flop_cbet_count: flags.fold_to_flop_cbet.taken.into(),
                    raise_vs_flop_cbet_opp: flags.raise_vs_flop_cbet.opp.into(),
                    raise_vs_flop_cbet_count: flags.raise_vs_flop_cbet.taken.into(),
                    all_in_cnt: p.all_in.into(),
                    all_in_wins: (p.all_in && p.collected).into(),
                    spr_flop: spr_for(Street::Flop),
                    spr_turn: spr_for(Street::Turn),
                    spr_river: spr_for(Street::River),
                    actions: StreetActions {
                        preflop: p.actions_on(Street::Preflop).to_vec(),
                        flop: p.actions_on(Street::Flop).to_vec(),
                        turn: p.actions_on(Street::Turn).to_vec(),
                        river: p.actions_on(Street::River).to_vec(),
                    },
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreetActions {
    pub preflop: Vec<String>,
    pub flop: Vec<String>,
    pub turn: Vec<String>,
    pub river: Vec<String>,
}

/// Counters for one player in one hand. Every counter is additive across
/// hands; see [`PlayerHandStat::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerHandStat {
    pub player_id: String,
    pub player_name: String,
    #[serde(default)]
    pub position: Option<Position>,
    pub hands: u32,
    pub vpip_hands: u32,
    pub pfr_hands: u32,
    pub limp_hands: u32,
    pub saw_flop_hands: u32,
    pub bets: u32,
    pub raises: u32,
    pub calls: u32,
    pub checks: u32,
    pub folds: u32,
    pub showdowns: u32,
    pub showdown_wins: u32,
    pub cbet_opp: u32,
    pub cbet_count: u32,
    pub bet3_opp: u32,
    pub bet3_count: u32,
    pub bet4_opp: u32,
    pub bet4_count: u32,
    pub isolate_opp: u32,
    pub isolate_count: u32,
    pub fold_to3bet_opp: u32,
    pub fold_to3bet_count: u32,
    pub fold_to_flop_cbet_opp: u32,
    pub fold_to_flop_cbet_count: u32,
    pub raise_vs_flop_cbet_opp: u32,
    pub raise_vs_flop_cbet_count: u32,
    pub all_in_cnt: u32,
    pub all_in_wins: u32,
    pub spr_flop: Option<f64>,
    pub spr_turn: Option<f64>,
    pub spr_river: Option<f64>,
    #[serde(default)]
    pub actions: StreetActions,
}

impl PlayerHandStat {
    /// Coordinate-wise sum of the counters. Identity, position, SPR and
    /// action text describe a single hand and are not carried into an
    /// aggregate.
    pub fn merge(&mut self, other: &PlayerHandStat) {
        if self.player_id.is_empty() {
            self.player_id = other.player_id.clone();
        }
        if self.player_name.is_empty() {
            self.player_name = other.player_name.clone();
        }
        self.hands += other.hands;
        self.vpip_hands += other.vpip_hands;
        self.pfr_hands += other.pfr_hands;
        self.limp_hands += other.limp_hands;
        self.saw_flop_hands += other.saw_flop_hands;
        self.bets += other.bets;
        self.raises += other.raises;
        self.calls += other.calls;
        self.checks += other.checks;
        self.folds += other.folds;
        self.showdowns += other.showdowns;
        self.showdown_wins += other.showdown_wins;
        self.cbet_opp += other.cbet_opp;
        self.cbet_count += other.cbet_count;
        self.bet3_opp += other.bet3_opp;
        self.bet3_count += other.bet3_count;
        self.bet4_opp += other.bet4_opp;
        self.bet4_count += other.bet4_count;
        self.isolate_opp += other.isolate_opp;
        self.isolate_count += other.isolate_count;
        self.fold_to3bet_opp += other.fold_to3bet_opp;
        self.fold_to3bet_count += other.fold_to3bet_count;
        self.fold_to_flop_cbet_opp += other.fold_to_flop_cbet_opp;
        self.fold_to_flop_cbet_count += other.fold_to_flop_cbet_count;
        self.raise_vs_flop_cbet_opp += other.raise_vs_flop_cbet_opp;
        self.raise_vs_flop_cbet_count += other.raise_vs_flop_cbet_count;
        self.all_in_cnt += other.all_in_cnt;
        self.all_in_wins += other.all_in_wins;
        self.position = None;
        self.spr_flop = None;
        self.spr_turn = None;
        self.spr_river = None;
        self.actions = StreetActions::default();
    }

    pub fn vpip_percent(&self) -> Option<f64> {
        percent(self.vpip_hands, self.hands)
    }

    pub fn pfr_percent(&self) -> Option<f64> {
        percent(self.pfr_hands, self.hands)
    }

    pub fn limp_percent(&self) -> Option<f64> {
        percent(self.limp_hands, self.hands)
    }

    pub fn three_bet_percent(&self) -> Option<f64> {
        percent(self.bet3_count, self.bet3_opp)
    }

    pub fn four_bet_percent(&self) -> Option<f64> {
        percent(self.bet4_count, self.bet4_opp)
    }

    pub fn fold_to_three_bet_percent(&self) -> Option<f64> {
        percent(self.fold_to3bet_count, self.fold_to3bet_opp)
    }

    pub fn isolate_percent(&self) -> Option<f64> {
        percent(self.isolate_count, self.isolate_opp)
    }

    pub fn cbet_percent(&self) -> Option<f64> {
        percent(self.cbet_count, self.cbet_opp)
    }

    pub fn fold_to_flop_cbet_percent(&self) -> Option<f64> {
        percent(self.fold_to_flop_cbet_count, self.fold_to_flop_cbet_opp)
    }

    pub fn raise_vs_flop_cbet_percent(&self) -> Option<f64> {
        percent(self.raise_vs_flop_cbet_count, self.raise_vs_flop_cbet_opp)
    }

    /// Went to showdown, as a share of flops seen.
    pub fn wtsd_percent(&self) -> Option<f64> {
        percent(self.showdowns, self.saw_flop_hands)
    }

    pub fn showdown_win_percent(&self) -> Option<f64> {
        percent(self.showdown_wins, self.showdowns)
    }

    /// (bets + raises) / calls; `None` without calls.
    pub fn aggression_factor(&self) -> Option<f64> {
        if self.calls == 0 {
            return None;
        }
        Some(crate::state::round2(
            f64::from(self.bets + self.raises) / f64::from(self.calls),
        ))
    }
}

impl AddAssign<&PlayerHandStat> for PlayerHandStat {
    fn add_assign(&mut self, rhs: &PlayerHandStat) {
        self.merge(rhs);
    }
}

fn percent(count: u32, opp: u32) -> Option<f64> {
    if opp == 0 {
        return None;
    }
    Some(crate::state::round2(f64::from(count) * 100.0 / f64::from(opp)))
}
