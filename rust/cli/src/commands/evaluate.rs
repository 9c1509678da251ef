use std::collections::HashSet;
use std::io::Write;

use handfact_engine::cards::{Card, parse_cards};
use handfact_engine::hand::evaluate_best;
use handfact_engine::range::classify;

use crate::error::CliError;

/// Two cards are classified as a starting hand; five to seven are scored
/// as the best five-card hand.
pub fn handle_evaluate_command(cards: &[String], out: &mut dyn Write) -> Result<(), CliError> {
    let joined = cards.join(" ");
    let parsed = parse_cards(&joined).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let mut seen = HashSet::new();
    if let Some(dup) = parsed.iter().find(|c| !seen.insert(**c)) {
        return Err(CliError::InvalidInput(format!("duplicate card {}", dup)));
    }

    let text: Vec<String> = parsed.iter().map(Card::text).collect();
    let report = match parsed.len() {
        2 => {
            let range = classify(&parsed);
            serde_json::json!({ "cards": text, "range": range })
        }
        5..=7 => {
            let Some(strength) = evaluate_best(&parsed) else {
                return Err(CliError::InvalidInput("cannot evaluate cards".into()));
            };
            serde_json::json!({
                "cards": text,
                "category": strength.category.label(),
                "label": strength.label(),
                "kickers": strength.kickers,
            })
        }
        n => {
            return Err(CliError::InvalidInput(format!(
                "expected 2 or 5-7 cards, got {}",
                n
            )));
        }
    };
    writeln!(out, "{}", report)?;
    Ok(())
}
