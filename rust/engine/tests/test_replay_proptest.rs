/// Property-based tests for hand replay: pot conservation and rebuild
/// determinism over randomly generated action sequences.
use handfact_engine::fact::build_hand_fact;
use handfact_engine::parser::parse_action;
use handfact_engine::record::{RawLogRecord, Street};
use handfact_engine::state::HandStateTracker;
use proptest::prelude::*;

const PLAYERS: [&str; 4] = ["ann@a", "bob@b", "cat@c", "dan@d"];
const HEADERS: [&str; 3] = ["Flop: [Ah 7c 2d]", "Turn: [Ah 7c 2d Kd]", "River: [Ah 7c 2d Kd 9s]"];

fn line_strategy() -> impl Strategy<Value = String> {
    let player = 0usize..PLAYERS.len();
    prop_oneof![
        (player.clone(), 1u32..500).prop_map(|(p, n)| format!(r#""{}" calls {}"#, PLAYERS[p], n)),
        (player.clone(), 1u32..500).prop_map(|(p, n)| format!(r#""{}" bets {}"#, PLAYERS[p], n)),
        (player.clone(), 1u32..2000).prop_map(|(p, n)| format!(r#""{}" raises to {}"#, PLAYERS[p], n)),
        player.clone().prop_map(|p| format!(r#""{}" checks"#, PLAYERS[p])),
        player.clone().prop_map(|p| format!(r#""{}" folds"#, PLAYERS[p])),
        (player, 1u32..50).prop_map(|(p, n)| format!(r#""{}" posts a big blind of {}"#, PLAYERS[p], n)),
        (0usize..HEADERS.len()).prop_map(|h| HEADERS[h].to_string()),
        Just("dealer chat: nice hand".to_string()),
    ]
}

fn replay(lines: &[String]) -> HandStateTracker {
    let mut state = HandStateTracker::new();
    for line in lines {
        state.observe_line(&RawLogRecord::new(line.as_str()));
        if let Some(action) = parse_action(line, state.street()) {
            state.apply_action(&action, line);
        }
    }
    state
}

proptest! {
    #[test]
    fn contributions_sum_to_pot(lines in prop::collection::vec(line_strategy(), 1..40)) {
        let state = replay(&lines);
        let total: f64 = state.players().iter().map(|p| p.contribution_hand).sum();
        prop_assert!((total - state.pot()).abs() < 1e-9);
        for p in state.players() {
            prop_assert!(p.contribution_hand >= 0.0);
            prop_assert!(!(p.folded && p.active));
        }
    }

    #[test]
    fn street_never_moves_backwards(lines in prop::collection::vec(line_strategy(), 1..40)) {
        let mut state = HandStateTracker::new();
        let mut last = Street::Preflop;
        for line in &lines {
            state.observe_line(&RawLogRecord::new(line.as_str()));
            prop_assert!(state.street() >= last);
            last = state.street();
        }
    }

    #[test]
    fn rebuild_is_deterministic(lines in prop::collection::vec(line_strategy(), 1..30)) {
        let records: Vec<RawLogRecord> = lines.iter().map(|l| RawLogRecord::new(l.as_str())).collect();
        let a = build_hand_fact("g", 1, &records);
        let b = build_hand_fact("g", 1, &records);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn counters_stay_within_opportunities(lines in prop::collection::vec(line_strategy(), 1..40)) {
        let records: Vec<RawLogRecord> = lines.iter().map(|l| RawLogRecord::new(l.as_str())).collect();
        if let Ok(fact) = build_hand_fact("g", 1, &records) {
            for p in &fact.players {
                prop_assert!(p.cbet_count <= p.cbet_opp);
                prop_assert!(p.bet3_count <= p.bet3_opp);
                prop_assert!(p.bet4_count <= p.bet4_opp);
                prop_assert!(p.isolate_count <= p.isolate_opp);
                prop_assert!(p.fold_to3bet_count + p.bet4_count <= 1);
                prop_assert!(p.fold_to_flop_cbet_count + p.raise_vs_flop_cbet_count <= 1);
                prop_assert!(p.showdown_wins <= p.showdowns);
                prop_assert!(p.pfr_hands <= p.vpip_hands);
            }
            let buttons = fact.positions.values().filter(|p| p.label() == "BTN").count();
            prop_assert!(buttons <= 1);
        }
    }
}
