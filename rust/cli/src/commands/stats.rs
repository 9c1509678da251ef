//! `handfact stats`: aggregate per-player counters across a game's facts.
//!
//! Counters are summed coordinate-wise; rates are derived from the sums and
//! are `null` when the player never had the opportunity.

use std::collections::BTreeMap;
use std::io::Write;

use handfact_engine::fact::HandFact;
use handfact_engine::stats::PlayerHandStat;
use serde::Serialize;

use crate::error::CliError;
use crate::store::{FactSink, SqliteStore};

#[derive(Debug, Serialize)]
struct Rates {
    vpip: Option<f64>,
    pfr: Option<f64>,
    limp: Option<f64>,
    three_bet: Option<f64>,
    four_bet: Option<f64>,
    fold_to_three_bet: Option<f64>,
    isolate: Option<f64>,
    cbet: Option<f64>,
    fold_to_flop_cbet: Option<f64>,
    raise_vs_flop_cbet: Option<f64>,
    wtsd: Option<f64>,
    showdown_win: Option<f64>,
    aggression_factor: Option<f64>,
}

impl From<&PlayerHandStat> for Rates {
    fn from(s: &PlayerHandStat) -> Self {
        Rates {
            vpip: s.vpip_percent(),
            pfr: s.pfr_percent(),
            limp: s.limp_percent(),
            three_bet: s.three_bet_percent(),
            four_bet: s.four_bet_percent(),
            fold_to_three_bet: s.fold_to_three_bet_percent(),
            isolate: s.isolate_percent(),
            cbet: s.cbet_percent(),
            fold_to_flop_cbet: s.fold_to_flop_cbet_percent(),
            raise_vs_flop_cbet: s.raise_vs_flop_cbet_percent(),
            wtsd: s.wtsd_percent(),
            showdown_win: s.showdown_win_percent(),
            aggression_factor: s.aggression_factor(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PlayerSummary {
    #[serde(flatten)]
    totals: PlayerHandStat,
    rates: Rates,
}

/// Sums every player's stat rows across `facts`, keyed by player id.
pub fn aggregate_players(facts: &[HandFact]) -> BTreeMap<String, PlayerHandStat> {
    let mut totals: BTreeMap<String, PlayerHandStat> = BTreeMap::new();
    for fact in facts {
        for stat in &fact.players {
            *totals.entry(stat.player_id.clone()).or_default() += stat;
        }
    }
    totals
}

pub fn handle_stats_command(
    game: &str,
    player: Option<&str>,
    database: &str,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let store = SqliteStore::open(database)?;
    let facts = store.load_facts(game)?;
    if facts.is_empty() {
        return Err(CliError::InvalidInput(format!("no hand facts for {}", game)));
    }

    let summaries: Vec<PlayerSummary> = aggregate_players(&facts)
        .into_values()
        .filter(|s| player.is_none_or(|p| p == s.player_id))
        .map(|totals| PlayerSummary {
            rates: Rates::from(&totals),
            totals,
        })
        .collect();
    if let Some(p) = player
        && summaries.is_empty()
    {
        return Err(CliError::InvalidInput(format!("player {} not found in {}", p, game)));
    }

    let report = serde_json::json!({
        "game_id": game,
        "hands": facts.len(),
        "players": summaries,
    });
    let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use handfact_engine::fact::build_hand_fact;
    use handfact_engine::record::RawLogRecord;

    fn hand(n: u32, lines: &[&str]) -> HandFact {
        let records: Vec<RawLogRecord> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| RawLogRecord::at(*l, format!("{:03}", i)))
            .collect();
        build_hand_fact("g", n, &records).unwrap()
    }

    #[test]
    fn counters_sum_across_hands() {
        let facts = vec![
            hand(1, &[r#""ann@a" raises to 60"#, r#""bob@b" folds"#]),
            hand(2, &[r#""ann@a" calls 20"#, r#""bob@b" checks"#]),
        ];
        let totals = aggregate_players(&facts);
        let ann = &totals["a"];
        assert_eq!(ann.hands, 2);
        assert_eq!(ann.vpip_hands, 2);
        assert_eq!(ann.pfr_hands, 1);
        assert_eq!(ann.vpip_percent(), Some(100.0));
        assert_eq!(ann.pfr_percent(), Some(50.0));
        assert_eq!(totals["b"].folds, 1);
        assert_eq!(ann.position, None);
    }
}
