/// Property-based tests for hand evaluation using proptest
use handfact_engine::cards::{Card, all_ranks, all_suits};
use handfact_engine::hand::{Category, compare_hands, evaluate_best};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn card_strategy() -> impl Strategy<Value = Card> {
    (0usize..13, 0usize..4).prop_map(|(r, s)| Card::new(all_ranks()[r], all_suits()[s]))
}

fn unique_cards_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), min..=max).prop_filter("Cards must be unique", |cards| {
        let set: BTreeSet<_> = cards.iter().collect();
        set.len() == cards.len()
    })
}

proptest! {
    #[test]
    fn evaluation_ignores_card_order(cards in unique_cards_strategy(5, 7), rot in 0usize..7) {
        let a = evaluate_best(&cards).unwrap();
        let mut shuffled = cards.clone();
        shuffled.reverse();
        let k = rot % shuffled.len();
        shuffled.rotate_left(k);
        let b = evaluate_best(&shuffled).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn straight_flush_is_category_eight(high in 5u8..=14, suit in 0usize..4) {
        let suit = all_suits()[suit];
        let cards: Vec<Card> = (0..5u8)
            .map(|i| {
                let v = high - i;
                let v = if v == 1 { 14 } else { v };
                let rank = all_ranks().into_iter().find(|r| r.value() == v).unwrap();
                Card::new(rank, suit)
            })
            .collect();
        let hs = evaluate_best(&cards).unwrap();
        prop_assert_eq!(hs.category, Category::StraightFlush);
        prop_assert_eq!(hs.kickers[0], high);
    }

    #[test]
    fn adding_cards_never_weakens_the_hand(cards in unique_cards_strategy(6, 7)) {
        let five = evaluate_best(&cards[..5]).unwrap();
        let all = evaluate_best(&cards).unwrap();
        prop_assert!(compare_hands(&all, &five).is_ge());
    }
}
