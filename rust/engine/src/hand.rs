use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    // kickers: ordered high -> low for tiebreaks, zero padded
    pub kickers: [u8; 5],
}

impl HandStrength {
    /// Human-readable hand type. An ace-high straight flush reads as a
    /// royal flush.
    pub fn label(&self) -> &'static str {
        if self.category == Category::StraightFlush && self.kickers[0] == Rank::Ace.value() {
            "Royal Flush"
        } else {
            self.category.label()
        }
    }
}

impl Ord for HandStrength {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_hands(self, other)
    }
}

impl PartialOrd for HandStrength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Category first, then kickers element-wise. Equal vectors tie.
pub fn compare_hands(a: &HandStrength, b: &HandStrength) -> Ordering {
    match a.category.cmp(&b.category) {
        Ordering::Equal => a.kickers.cmp(&b.kickers),
        ord => ord,
    }
}

/// Scores exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandStrength {
    let mut ranks: Vec<u8> = cards.iter().map(Card::value).collect();
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);

    let mut rank_counts = [0u8; 15]; // 2..14 used
    for &r in &ranks {
        rank_counts[r as usize] += 1;
    }
    let mut unique: Vec<u8> = ranks.clone();
    unique.dedup();
    let straight_high = detect_straight_high(&unique);

    if is_flush && let Some(high) = straight_high {
        return strength(Category::StraightFlush, &[high]);
    }

    // (count, rank) groups, largest count first then highest rank
    let mut groups: Vec<(u8, u8)> = unique.iter().map(|&r| (rank_counts[r as usize], r)).collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if groups[0].0 == 4 {
        return strength(Category::FourOfAKind, &[groups[0].1, groups[1].1]);
    }
    if groups[0].0 == 3 && groups.get(1).is_some_and(|g| g.0 == 2) {
        return strength(Category::FullHouse, &[groups[0].1, groups[1].1]);
    }
    if is_flush {
        return strength(Category::Flush, &ranks);
    }
    if let Some(high) = straight_high {
        return strength(Category::Straight, &[high]);
    }

    let category = match (groups[0].0, groups.get(1).map(|g| g.0)) {
        (3, _) => Category::ThreeOfAKind,
        (2, Some(2)) => Category::TwoPair,
        (2, _) => Category::OnePair,
        _ => Category::HighCard,
    };
    // groups are already ordered (count desc, rank desc), which is exactly
    // the kicker order for every remaining category
    let kickers: Vec<u8> = groups.iter().map(|g| g.1).collect();
    strength(category, &kickers)
}

/// Best five-card hand out of 5 or more cards, by brute force over every
/// five-card subset (21 for seven cards). Returns `None` below five cards.
pub fn evaluate_best(cards: &[Card]) -> Option<HandStrength> {
    let n = cards.len();
    if n < 5 {
        return None;
    }
    let mut best: Option<HandStrength> = None;
    for a in 0..n {
        for b in a + 1..n {
            for c in b + 1..n {
                for d in c + 1..n {
                    for e in d + 1..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let cur = evaluate_five(&five);
                        if best.as_ref().is_none_or(|b| cur > *b) {
                            best = Some(cur);
                        }
                    }
                }
            }
        }
    }
    best
}

/// Convenience wrapper for the common seven-card case.
pub fn evaluate_hand(cards: &[Card; 7]) -> HandStrength {
    // seven cards always yield a five-card subset
    evaluate_best(cards).unwrap_or(HandStrength {
        category: Category::HighCard,
        kickers: [0; 5],
    })
}

/// Hand type label for hole cards against the board known so far.
/// Empty when fewer than two hole cards or three board cards are known.
pub fn street_hand_label(hole: &[Card], board: &[Card]) -> String {
    if hole.len() < 2 || board.len() < 3 {
        return String::new();
    }
    let mut all = Vec::with_capacity(hole.len() + board.len());
    all.extend_from_slice(hole);
    all.extend_from_slice(board);
    evaluate_best(&all)
        .map(|s| s.label().to_string())
        .unwrap_or_default()
}

fn strength(category: Category, ranks: &[u8]) -> HandStrength {
    let mut kickers = [0u8; 5];
    for (slot, &r) in kickers.iter_mut().zip(ranks) {
        *slot = r;
    }
    HandStrength { category, kickers }
}

/// Expects unique ranks sorted high to low. Ace also plays low; the wheel
/// reports 5 as its high card.
fn detect_straight_high(unique_desc: &[u8]) -> Option<u8> {
    let mut ranks = unique_desc.to_vec();
    if ranks.first() == Some(&14) {
        ranks.push(1);
    }
    ranks
        .windows(5)
        .find(|w| w.windows(2).all(|p| p[0] == p[1] + 1))
        .map(|w| w[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn best(s: &str) -> HandStrength {
        evaluate_best(&parse_cards(s).unwrap()).unwrap()
    }

    #[test]
    fn wheel_reports_five_high() {
        let hs = best("5c 4d 3h 2s Ac 9d Kh");
        assert_eq!(hs.category, Category::Straight);
        assert_eq!(hs.kickers[0], 5);
    }

    #[test]
    fn broadway_beats_wheel() {
        assert!(best("Ac Kd Qh Js Tc") > best("5c 4d 3h 2s Ac"));
    }

    #[test]
    fn two_pair_kicker_order() {
        let hs = best("Kc Kd 4h 4s 9c");
        assert_eq!(hs.category, Category::TwoPair);
        assert_eq!(hs.kickers, [13, 4, 9, 0, 0]);
    }

    #[test]
    fn full_house_from_two_trips_in_seven() {
        let hs = best("9c 9d 9h 4s 4c 4d 2h");
        assert_eq!(hs.category, Category::FullHouse);
        assert_eq!(hs.kickers[..2], [9, 4]);
    }

    #[test]
    fn kicker_breaks_pair_tie() {
        let a = best("Ac Ad Kh 7s 2c");
        let b = best("Ah As Qh 7d 2d");
        assert_eq!(compare_hands(&a, &b), Ordering::Greater);
    }

    #[test]
    fn identical_ranks_tie() {
        let a = best("Ac Kd 9h 7s 2c");
        let b = best("Ad Kh 9s 7c 2d");
        assert_eq!(compare_hands(&a, &b), Ordering::Equal);
    }

    #[test]
    fn royal_flush_label() {
        assert_eq!(best("Ah Kh Qh Jh Th 2c 3d").label(), "Royal Flush");
        assert_eq!(best("9h Kh Qh Jh Th").label(), "Straight Flush");
    }

    #[test]
    fn fewer_than_five_cards_is_none() {
        assert!(evaluate_best(&parse_cards("Ah Kh Qh Jh").unwrap()).is_none());
    }

    #[test]
    fn street_label_needs_flop() {
        let hole = parse_cards("Ah Ad").unwrap();
        assert_eq!(street_hand_label(&hole, &parse_cards("2c 3d").unwrap()), "");
        assert_eq!(
            street_hand_label(&hole, &parse_cards("Ac 7d 2s").unwrap()),
            "Three of a Kind"
        );
    }
}
