//! Free-text log line parsing.
//!
//! Lines look like `"alice@p1" raises to 60`, `Flop:  [Ah, 7c, 2d]` or
//! `Player stacks: #1 "alice@p1" (1000) | #2 "bob@p2" (950)`. Nothing in
//! here fails: an unrecognised line or token is skipped and the caller
//! sees `None` or an empty result.

use crate::action::{Action, Verb};
use crate::cards::{Card, Suit, card_at};
use crate::record::Street;

/// Identities that write to the log but never act in a hand.
pub const RESERVED_IDENTITIES: [&str; 2] = ["admin", "game"];

/// Leading words of dealer/system lines that would otherwise read as a
/// bare-name actor (`Uncalled bet of 380 returned to ann`).
pub const SYSTEM_PREFIXES: [&str; 12] = [
    "uncalled", "undealt", "remaining", "dealer", "total", "main", "side", "pot", "board",
    "table", "rake", "hand",
];

/// Player token as it appears in a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRef {
    pub name: String,
    pub id: String,
}

impl PlayerRef {
    /// `name@id`, or a bare name which then doubles as the id.
    pub fn parse(raw: &str) -> PlayerRef {
        let clean = raw.replace('"', "");
        let clean = clean.trim();
        match clean.split_once('@') {
            Some((name, id)) => PlayerRef {
                name: name.trim().to_string(),
                id: id.split('@').next().unwrap_or("").trim().to_string(),
            },
            None => PlayerRef {
                name: clean.to_string(),
                id: clean.to_string(),
            },
        }
    }

    pub fn is_player(&self) -> bool {
        !self.id.is_empty()
            && !RESERVED_IDENTITIES
                .iter()
                .any(|r| self.id.eq_ignore_ascii_case(r))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

/// Parses a numeric token, dropping thousands separators.
pub fn parse_number(s: &str) -> Option<f64> {
    let normalized: String = s.chars().filter(|c| *c != ',').collect();
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extracts every card token from free text. Tokens are runs of
/// alphanumerics and suit symbols; a run counts only if it is made
/// entirely of cards, so `Ah`, `10c`, `KhQs` and `[A♠,K♠]` match while
/// words such as `posts` or `Flop` do not.
pub fn extract_cards(text: &str) -> Vec<Card> {
    let mut cards = Vec::new();
    let mut run: Vec<char> = Vec::new();
    for c in text.chars().chain(std::iter::once(' ')) {
        if c.is_alphanumeric() || Suit::from_char(c).is_some_and(|_| !c.is_ascii()) {
            run.push(c);
            continue;
        }
        if !run.is_empty() {
            cards.extend(cards_in_run(&run));
            run.clear();
        }
    }
    cards
}

fn cards_in_run(run: &[char]) -> Vec<Card> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < run.len() {
        match card_at(run, i) {
            Some((card, used)) => {
                out.push(card);
                i += used;
            }
            None => return Vec::new(),
        }
    }
    out
}

/// Street header (`Flop`, `Turn`, `River` at the start of the line).
pub fn parse_street_header(msg: &str) -> Option<Street> {
    let text = msg.trim_start();
    let word: String = text.chars().take_while(|c| c.is_alphanumeric()).collect();
    match word.to_ascii_lowercase().as_str() {
        "flop" => Some(Street::Flop),
        "turn" => Some(Street::Turn),
        "river" => Some(Street::River),
        _ => None,
    }
}

/// Button or dealer marker naming a quoted player.
pub fn parse_button_player(msg: &str) -> Option<String> {
    let lower = msg.to_lowercase();
    if !lower.contains("button") && !lower.contains("dealer") {
        return None;
    }
    let (_, _, inner) = quoted_segments(msg).into_iter().next()?;
    let player = PlayerRef::parse(inner);
    player.is_player().then_some(player.id)
}

/// `Player stacks: #1 "a@p1" (1000) | ...` lines.
pub fn parse_player_stacks_line(msg: &str) -> Vec<(String, f64)> {
    if !mentions_player_stacks(msg) {
        return Vec::new();
    }
    let mut stacks = Vec::new();
    for (_, end, inner) in quoted_segments(msg) {
        let rest = msg[end..].trim_start();
        let Some(body) = rest.strip_prefix('(') else {
            continue;
        };
        let Some(close) = body.find(')') else {
            continue;
        };
        let player = PlayerRef::parse(inner);
        if let Some(amount) = parse_number(&body[..close])
            && player.is_player()
        {
            stacks.push((player.id, amount));
        }
    }
    stacks
}

fn mentions_player_stacks(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.match_indices("player").any(|(i, m)| {
        lower[i + m.len()..]
            .trim_start()
            .starts_with("stack")
    })
}

/// Stack amount mentioned on an action line, e.g. `... (stack 1,200)`.
/// The first number after the word `stack` is taken.
pub fn parse_stack_mention(msg: &str) -> Option<f64> {
    let lower = msg.to_ascii_lowercase();
    let idx = lower.find("stack")?;
    first_number(&msg[idx..]).map(|(v, _)| v)
}

/// Parses one log line into an action, or `None` when the line has no
/// recognised verb or is issued by a non-player identity.
pub fn parse_action(msg: &str, street: Street) -> Option<Action> {
    let (player, rest) = locate_actor(msg)?;
    if !player.is_player() {
        return None;
    }
    let (verb, after_verb) = rest;
    let (amount, to_amount) = parse_amount(after_verb, verb);
    Some(Action {
        player_name: player.display_name().to_string(),
        player_id: player.id,
        verb,
        street,
        amount,
        to_amount,
        is_all_in: mentions_all_in(msg),
    })
}

/// Finds the acting player and the verb that follows them. Quoted tokens
/// are tried first; a line without quotes may start with a bare name.
fn locate_actor(msg: &str) -> Option<(PlayerRef, (Verb, &str))> {
    let segments = quoted_segments(msg);
    if segments.is_empty() {
        let trimmed = msg.trim_start();
        let name_end = trimmed.find(char::is_whitespace)?;
        let name = &trimmed[..name_end];
        if SYSTEM_PREFIXES.iter().any(|p| name.eq_ignore_ascii_case(p)) {
            return None;
        }
        let found = verb_after(&trimmed[name_end..])?;
        return Some((PlayerRef::parse(&trimmed[..name_end]), found));
    }
    segments.into_iter().find_map(|(_, end, inner)| {
        verb_after(&msg[end..]).map(|found| (PlayerRef::parse(inner), found))
    })
}

/// Verb word after at least one whitespace character. Returns the verb
/// and the text following it.
fn verb_after(text: &str) -> Option<(Verb, &str)> {
    let trimmed = text.trim_start();
    if trimmed.len() == text.len() {
        return None;
    }
    let word_len = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let verb = Verb::from_word(&trimmed[..word_len])?;
    Some((verb, &trimmed[word_len..]))
}

/// `(amount, to_amount)`. Raises prefer "to X" (optionally one word
/// between the verb and `to`); otherwise the first number after the verb.
fn parse_amount(after_verb: &str, verb: Verb) -> (f64, Option<f64>) {
    if verb == Verb::Raises {
        let words: Vec<&str> = after_verb.split_whitespace().take(3).collect();
        let to_pos = words.iter().take(2).position(|w| w.eq_ignore_ascii_case("to"));
        if let Some(pos) = to_pos
            && let Some((to, _)) = words.get(pos + 1).and_then(|w| first_number(w))
        {
            return (to, Some(to));
        }
    }
    let amount = first_number(after_verb).map(|(v, _)| v).unwrap_or(0.0);
    (amount, None)
}

/// First number in `text` and the byte offset just past it.
/// Digits may contain `,` separators and one decimal part.
fn first_number(text: &str) -> Option<(f64, usize)> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_digit)?;
    let mut end = start;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b',') {
        end += 1;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    parse_number(&text[start..end]).map(|v| (v, end))
}

/// `all in`, `all-in` or `allin`, any case.
pub fn mentions_all_in(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.match_indices("all").any(|(i, _)| {
        let rest = &lower[i + 3..];
        let rest = rest
            .strip_prefix(|c: char| c == '-' || c.is_whitespace())
            .unwrap_or(rest);
        rest.starts_with("in")
    })
}

/// `(open, end, inner)` for each `"..."` pair; `end` is the byte offset
/// after the closing quote.
fn quoted_segments(msg: &str) -> Vec<(usize, usize, &str)> {
    let mut out = Vec::new();
    let mut search = 0;
    while let Some(open_rel) = msg[search..].find('"') {
        let open = search + open_rel;
        let Some(close_rel) = msg[open + 1..].find('"') else {
            break;
        };
        let close = open + 1 + close_rel;
        out.push((open, close + 1, &msg[open + 1..close]));
        search = close + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn system_lines_are_not_bare_actors() {
        assert_eq!(parse_action("Uncalled bet of 380 returned to ann", Street::Preflop), None);
        assert_eq!(parse_action("Dealer bets are closed", Street::Flop), None);
        let a = parse_action("ann collected 40 from pot", Street::Preflop).unwrap();
        assert_eq!(a.player_id, "ann");
        assert_eq!(a.verb, Verb::Collected);
    }

    #[test]
    fn lowercase_rank_letters_are_extracted() {
        let cards = extract_cards("Flop: [ah, 7c, kd]");
        assert_eq!(
            cards,
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Seven, Suit::Clubs),
                Card::new(Rank::King, Suit::Diamonds),
            ]
        );
        let a = parse_action(r#""ann@a" shows [ah kd]"#, Street::River).unwrap();
        assert_eq!(a.verb, Verb::Shows);
    }

    #[test]
    fn parses_quoted_player_and_raise_target() {
        let a = parse_action(r#""alice @ p1" raises to 1,200"#, Street::Preflop).unwrap();
        assert_eq!(a.player_id, "p1");
        assert_eq!(a.player_name, "alice");
        assert_eq!(a.verb, Verb::Raises);
        assert_eq!(a.amount, 1200.0);
        assert_eq!(a.to_amount, Some(1200.0));
    }

    #[test]
    fn raise_without_target_uses_first_number() {
        let a = parse_action(r#""bob@p2" raises 40 and is all in"#, Street::Flop).unwrap();
        assert_eq!(a.amount, 40.0);
        assert_eq!(a.to_amount, None);
        assert!(a.is_all_in);
        assert_eq!(a.street, Street::Flop);
    }

    #[test]
    fn blind_post_amount() {
        let a = parse_action(r#""carol@p3" posts a big blind of 20"#, Street::Preflop).unwrap();
        assert_eq!(a.verb, Verb::Posts);
        assert_eq!(a.amount, 20.0);
    }

    #[test]
    fn missing_amount_defaults_to_zero() {
        let a = parse_action(r#""dave@p4" calls"#, Street::Turn).unwrap();
        assert_eq!(a.amount, 0.0);
    }

    #[test]
    fn amount_is_taken_after_the_verb_only() {
        let a = parse_action(r#""eve@42" bets 15"#, Street::Flop).unwrap();
        assert_eq!(a.amount, 15.0);
    }

    #[test]
    fn bare_name_actor() {
        let a = parse_action("frank checks", Street::Flop).unwrap();
        assert_eq!(a.player_id, "frank");
        assert_eq!(a.verb, Verb::Checks);
    }

    #[test]
    fn reserved_and_unknown_lines_yield_nothing() {
        assert!(parse_action(r#""admin" collected 100"#, Street::River).is_none());
        assert!(parse_action(r#""dealer@game" shows"#, Street::River).is_none());
        assert!(parse_action("The game starts now", Street::Preflop).is_none());
        assert!(parse_action(r#""gina@p7" stands up"#, Street::Preflop).is_none());
    }

    #[test]
    fn synonym_verbs() {
        let a = parse_action(r#""hank@p8" won 300 with a pair"#, Street::River).unwrap();
        assert_eq!(a.verb, Verb::Collected);
        assert_eq!(a.amount, 300.0);
    }

    #[test]
    fn extracts_cards_in_many_notations() {
        let cards = extract_cards("Flop:  [Ah, 10c, K♠] river 2d");
        assert_eq!(
            cards,
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Ten, Suit::Clubs),
                Card::new(Rank::King, Suit::Spades),
                Card::new(Rank::Two, Suit::Diamonds),
            ]
        );
    }

    #[test]
    fn ignores_card_lookalikes_inside_words() {
        assert!(extract_cards(r#""ivan@p9" posts a small blind of 10"#).is_empty());
        let shown = extract_cards(r#""ivan@p9" shows a Kh, Kd."#);
        assert_eq!(shown.len(), 2);
    }

    #[test]
    fn street_headers() {
        assert_eq!(parse_street_header("Flop: [Ah 7c 2d]"), Some(Street::Flop));
        assert_eq!(parse_street_header("turn (4): Ah 7c 2d 5s"), Some(Street::Turn));
        assert_eq!(parse_street_header("Rivers are wet"), None);
    }

    #[test]
    fn button_marker() {
        assert_eq!(
            parse_button_player(r#"The dealer is "jane@p10""#),
            Some("p10".to_string())
        );
        assert_eq!(parse_button_player(r#""game" moves the button"#), None);
        assert_eq!(parse_button_player(r#""jane@p10" calls 5"#), None);
    }

    #[test]
    fn player_stacks_line() {
        let stacks = parse_player_stacks_line(r#"Player stacks: #1 "a@p1" (1,000) | #3 "b@p2" (950.5)"#);
        assert_eq!(
            stacks,
            vec![("p1".to_string(), 1000.0), ("p2".to_string(), 950.5)]
        );
        assert!(parse_player_stacks_line(r#""a@p1" (1000)"#).is_empty());
    }

    #[test]
    fn stack_mention() {
        assert_eq!(parse_stack_mention(r#""a@p1" calls 20 (stack: 1,980)"#), Some(1980.0));
        assert_eq!(parse_stack_mention(r#""a@p1" calls 20"#), None);
    }

    #[test]
    fn all_in_spellings() {
        assert!(mentions_all_in("goes ALL-IN"));
        assert!(mentions_all_in("allin"));
        assert!(mentions_all_in("all in"));
        assert!(!mentions_all_in("calls 20"));
    }
}
