use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CardError;

/// One of the four suits. Letter codes and suit symbols in log text both
/// normalize to these.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Suit {
    /// Clubs suit (♣)
    #[serde(rename = "C")]
    Clubs,
    /// Diamonds suit (♦)
    #[serde(rename = "D")]
    Diamonds,
    /// Hearts suit (♥)
    #[serde(rename = "H")]
    Hearts,
    /// Spades suit (♠)
    #[serde(rename = "S")]
    Spades,
}

impl Suit {
    /// Parses a single-letter code (`s h d c`, either case) or a suit symbol.
    pub fn from_char(c: char) -> Option<Suit> {
        match c {
            's' | 'S' | '♠' => Some(Suit::Spades),
            'h' | 'H' | '♥' => Some(Suit::Hearts),
            'd' | 'D' | '♦' => Some(Suit::Diamonds),
            'c' | 'C' | '♣' => Some(Suit::Clubs),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Diamonds => 'D',
            Suit::Clubs => 'C',
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }
}

/// Card rank from Two through Ace. The discriminant is the numeric
/// rank value used by the evaluator (2..=14).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "2")]
    Two = 2,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "T")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(v: u8) -> Option<Rank> {
        match v {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Upper-case rank letters and digits only; `10` is handled by the
    /// caller because it spans two characters.
    pub fn from_char(c: char) -> Option<Rank> {
        match c {
            '2'..='9' => Rank::from_value(c as u8 - b'0'),
            'T' => Some(Rank::Ten),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            'A' => Some(Rank::Ace),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
            Rank::Ace => 'A',
            r => (b'0' + r.value()) as char,
        }
    }
}

/// A single playing card. Immutable value type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    /// Display form used in persisted facts, e.g. `A♠`.
    pub fn text(&self) -> String {
        format!("{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.to_char(), self.suit.symbol())
    }
}

/// Parses an explicit card list such as `"AhKh"`, `"Ah Kh 10c"` or `"A♠,K♠"`.
///
/// Unlike [`crate::parser::extract_cards`], which skips anything it does not
/// recognise, this is strict: every non-separator character must belong to
/// a card.
pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
    let chars: Vec<char> = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '[' | ']'))
        .collect();
    let mut cards = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (card, used) =
            card_at(&chars, i).ok_or_else(|| CardError::InvalidToken(chars[i..].iter().collect()))?;
        cards.push(card);
        i += used;
    }
    Ok(cards)
}

/// Tries to read one card starting at `i`. Returns the card and the number
/// of characters consumed.
pub(crate) fn card_at(chars: &[char], i: usize) -> Option<(Card, usize)> {
    let first = *chars.get(i)?;
    if first == '1' {
        if chars.get(i + 1) != Some(&'0') {
            return None;
        }
        let suit = Suit::from_char(*chars.get(i + 2)?)?;
        return Some((Card::new(Rank::Ten, suit), 3));
    }
    let rank = Rank::from_char(first.to_ascii_uppercase())?;
    let suit = Suit::from_char(*chars.get(i + 1)?)?;
    Some((Card::new(rank, suit), 2))
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ]
}

pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(52);
    for &s in &all_suits() {
        for &r in &all_ranks() {
            v.push(Card { rank: r, suit: s });
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letter_and_symbol_suits() {
        let cards = parse_cards("Ah K♠ 10c").unwrap();
        assert_eq!(
            cards,
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::King, Suit::Spades),
                Card::new(Rank::Ten, Suit::Clubs),
            ]
        );
    }

    #[test]
    fn ten_normalizes_to_t() {
        let cards = parse_cards("10h").unwrap();
        assert_eq!(cards[0].text(), "T♥");
    }

    #[test]
    fn strict_parse_rejects_garbage() {
        assert!(matches!(parse_cards("Ax"), Err(CardError::InvalidToken(_))));
        assert!(parse_cards("1h").is_err());
    }

    #[test]
    fn deck_has_52_unique_cards() {
        let mut deck = full_deck();
        deck.sort();
        deck.dedup();
        assert_eq!(deck.len(), 52);
    }

    #[test]
    fn rank_values_span_two_to_ace() {
        assert_eq!(Rank::Two.value(), 2);
        assert_eq!(Rank::Ace.value(), 14);
        assert_eq!(Rank::from_value(10), Some(Rank::Ten));
        assert_eq!(Rank::from_value(1), None);
    }
}
