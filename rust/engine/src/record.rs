use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A betting street. Ordering follows play order, so a hand's street only
/// ever compares greater as it progresses.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Street {
    /// Before flop (hole cards dealt)
    Preflop,
    /// After flop (3 community cards)
    Flop,
    /// After turn (4th community card)
    Turn,
    /// After river (5th community card)
    River,
}

impl Street {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Total board cards expected once this street has been dealt.
    pub fn board_len(self) -> usize {
        match self {
            Street::Preflop => 0,
            Street::Flop => 3,
            Street::Turn => 4,
            Street::River => 5,
        }
    }
}

/// One raw line of a hand's event log as delivered by the hand-log store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLogRecord {
    #[serde(default)]
    pub msg: String,
    /// Orderable timestamp; compared as a string
    #[serde(default, alias = "createdAt", alias = "time")]
    pub created_at: Option<String>,
    /// Structured per-player stacks some sources attach to a line
    #[serde(
        default,
        alias = "playerStacks",
        alias = "playersStacks",
        alias = "stackMap",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub stacks: BTreeMap<String, serde_json::Value>,
}

impl RawLogRecord {
    pub fn new(msg: impl Into<String>) -> Self {
        RawLogRecord {
            msg: msg.into(),
            ..Default::default()
        }
    }

    pub fn at(msg: impl Into<String>, created_at: impl Into<String>) -> Self {
        RawLogRecord {
            msg: msg.into(),
            created_at: Some(created_at.into()),
            ..Default::default()
        }
    }

    /// Stack amounts from the structured map. Values may arrive as numbers
    /// or as strings with thousands separators; anything else is dropped.
    pub fn structured_stacks(&self) -> Vec<(String, f64)> {
        self.stacks
            .iter()
            .filter_map(|(pid, v)| {
                let amount = match v {
                    serde_json::Value::Number(n) => n.as_f64(),
                    serde_json::Value::String(s) => crate::parser::parse_number(s),
                    _ => None,
                }?;
                Some((pid.clone(), amount))
            })
            .collect()
    }
}

/// Chronological order by timestamp. The sort is stable, so ties (and
/// records without a timestamp) keep their original relative order.
pub fn sort_records(records: &[RawLogRecord]) -> Vec<&RawLogRecord> {
    let mut sorted: Vec<&RawLogRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        let ta = a.created_at.as_deref().unwrap_or("");
        let tb = b.created_at.as_deref().unwrap_or("");
        ta.cmp(tb)
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streets_are_ordered() {
        assert!(Street::Preflop < Street::Flop);
        assert!(Street::Turn < Street::River);
        assert_eq!(Street::River.board_len(), 5);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let records = vec![
            RawLogRecord::at("b", "2024-01-01T00:00:02Z"),
            RawLogRecord::at("first tie", "2024-01-01T00:00:01Z"),
            RawLogRecord::at("second tie", "2024-01-01T00:00:01Z"),
        ];
        let sorted: Vec<&str> = sort_records(&records).iter().map(|r| r.msg.as_str()).collect();
        assert_eq!(sorted, vec!["first tie", "second tie", "b"]);
    }

    #[test]
    fn deserializes_timestamp_and_stack_aliases() {
        let rec: RawLogRecord = serde_json::from_str(
            r#"{"msg":"x","createdAt":"2024","playerStacks":{"p1":"1,500","p2":900,"p3":null}}"#,
        )
        .unwrap();
        assert_eq!(rec.created_at.as_deref(), Some("2024"));
        assert_eq!(
            rec.structured_stacks(),
            vec![("p1".to_string(), 1500.0), ("p2".to_string(), 900.0)]
        );
    }
}
