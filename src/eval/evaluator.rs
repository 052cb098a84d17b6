//! Maps up to 7 cards to the best 5-card hand: a total order, a
//! category, a human description, and the winning 5 cards.
//!
//! The teacher's own evaluator (`evaluation::evaluation::Evaluation`)
//! sketches this bit-counting shape but leaves every finder as
//! `todo!()`; this is a complete implementation of the same idea,
//! generalized to combination-search over 5-of-7 rather than hand
//! tuned bit tricks, since showdown evaluation here is not a CFR hot
//! loop and clarity matters more than raw throughput.

use super::hand_rank::{EvaluatedHand, HandCategory};
use crate::cards::{Card, Rank};

/// Evaluates the best 5-card hand obtainable from `cards` (2..=7
/// cards, typically 2 hole + up to 5 community). Panics if fewer than
/// 5 cards are given — callers never evaluate before the flop.
pub fn evaluate(cards: &[Card]) -> EvaluatedHand {
    assert!(cards.len() >= 5, "evaluate requires at least 5 cards");
    let mut best: Option<EvaluatedHand> = None;
    for combo in combinations(cards, 5) {
        let five: [Card; 5] = combo.try_into().expect("combinations(_, 5) yields 5");
        let candidate = evaluate_five(five);
        if best.as_ref().is_none_or(|b| candidate > *b) {
            best = Some(candidate);
        }
    }
    best.expect("at least one 5-card combination exists")
}

fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    if k == 0 {
        return vec![vec![]];
    }
    if cards.len() < k {
        return vec![];
    }
    let mut result = Vec::new();
    let first = cards[0];
    for mut tail in combinations(&cards[1..], k - 1) {
        tail.insert(0, first);
        result.push(tail);
    }
    result.extend(combinations(&cards[1..], k));
    result
}

fn evaluate_five(mut five: [Card; 5]) -> EvaluatedHand {
    five.sort_by(|a, b| b.rank().cmp(&a.rank()));

    let is_flush = five.iter().all(|c| c.suit() == five[0].suit());
    let straight_high = straight_high_rank(&five);

    let mut rank_counts: Vec<(Rank, u8)> = Vec::new();
    for card in &five {
        match rank_counts.iter_mut().find(|(r, _)| *r == card.rank()) {
            Some((_, count)) => *count += 1,
            None => rank_counts.push((card.rank(), 1)),
        }
    }
    // sort by count desc, then rank desc, so groups() reads
    // most-significant-first for kicker construction.
    rank_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    let counts_shape: Vec<u8> = rank_counts.iter().map(|(_, c)| *c).collect();

    if is_flush {
        if let Some(high) = straight_high {
            return EvaluatedHand {
                category: HandCategory::StraightFlush,
                kickers: vec![high],
                description: format!("Straight Flush, {high} high"),
                best_five: five,
            };
        }
    }

    if counts_shape == [4, 1] {
        let quad = rank_counts[0].0;
        let kicker = rank_counts[1].0;
        return EvaluatedHand {
            category: HandCategory::FourOfAKind,
            kickers: vec![quad, kicker],
            description: format!("Four of a Kind, {quad}s"),
            best_five: five,
        };
    }

    if counts_shape == [3, 2] {
        let trip = rank_counts[0].0;
        let pair = rank_counts[1].0;
        return EvaluatedHand {
            category: HandCategory::FullHouse,
            kickers: vec![trip, pair],
            description: format!("Full House, {trip}s over {pair}s"),
            best_five: five,
        };
    }

    if is_flush {
        let kickers: Vec<Rank> = five.iter().map(|c| c.rank()).collect();
        return EvaluatedHand {
            category: HandCategory::Flush,
            kickers,
            description: format!("Flush, {} high", five[0].rank()),
            best_five: five,
        };
    }

    if let Some(high) = straight_high {
        return EvaluatedHand {
            category: HandCategory::Straight,
            kickers: vec![high],
            description: format!("Straight, {high} high"),
            best_five: five,
        };
    }

    if counts_shape == [3, 1, 1] {
        let trip = rank_counts[0].0;
        let kickers = vec![trip, rank_counts[1].0, rank_counts[2].0];
        return EvaluatedHand {
            category: HandCategory::ThreeOfAKind,
            kickers,
            description: format!("Three of a Kind, {trip}s"),
            best_five: five,
        };
    }

    if counts_shape == [2, 2, 1] {
        let high_pair = rank_counts[0].0;
        let low_pair = rank_counts[1].0;
        let kicker = rank_counts[2].0;
        return EvaluatedHand {
            category: HandCategory::TwoPair,
            kickers: vec![high_pair, low_pair, kicker],
            description: format!("Two Pair, {high_pair}s and {low_pair}s"),
            best_five: five,
        };
    }

    if counts_shape == [2, 1, 1, 1] {
        let pair = rank_counts[0].0;
        let kickers = vec![
            pair,
            rank_counts[1].0,
            rank_counts[2].0,
            rank_counts[3].0,
        ];
        return EvaluatedHand {
            category: HandCategory::OnePair,
            kickers,
            description: format!("One Pair, {pair}s"),
            best_five: five,
        };
    }

    let kickers: Vec<Rank> = five.iter().map(|c| c.rank()).collect();
    EvaluatedHand {
        category: HandCategory::HighCard,
        kickers,
        description: format!("High Card, {} high", five[0].rank()),
        best_five: five,
    }
}

/// Returns the "high" rank of the straight formed by `five` (already
/// sorted descending by rank), or `None` if the five cards are not a
/// straight. Handles the wheel (A-2-3-4-5), whose high card is the
/// Five, not the Ace.
fn straight_high_rank(five: &[Card; 5]) -> Option<Rank> {
    let mut ranks: Vec<u8> = five.iter().map(|c| u8::from(c.rank())).collect();
    ranks.sort_unstable();
    ranks.dedup();
    if ranks.len() != 5 {
        return None;
    }
    if ranks[4] - ranks[0] == 4 {
        return Some(Rank::from(ranks[4]));
    }
    // wheel: A,2,3,4,5 -> ranks (0-indexed) are [0,1,2,3,12]
    if ranks == [0, 1, 2, 3, 12] {
        return Some(Rank::Five);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Suit;

    fn c(s: &str) -> Card {
        Card::try_from(s).unwrap()
    }

    #[test]
    fn recognizes_wheel_straight() {
        let hand = evaluate(&[c("As"), c("2c"), c("3d"), c("4h"), c("5s"), c("9c"), c("Kd")]);
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.kickers[0], Rank::Five);
    }

    #[test]
    fn recognizes_broadway_straight() {
        let hand = evaluate(&[c("Ts"), c("Jc"), c("Qd"), c("Kh"), c("As"), c("2c"), c("3d")]);
        assert_eq!(hand.category, HandCategory::Straight);
        assert_eq!(hand.kickers[0], Rank::Ace);
    }

    #[test]
    fn recognizes_straight_flush_over_flush() {
        let hand = evaluate(&[
            Card::new(Rank::Nine, Suit::Heart),
            Card::new(Rank::Ten, Suit::Heart),
            Card::new(Rank::Jack, Suit::Heart),
            Card::new(Rank::Queen, Suit::Heart),
            Card::new(Rank::King, Suit::Heart),
            c("2c"),
            c("3d"),
        ]);
        assert_eq!(hand.category, HandCategory::StraightFlush);
    }

    #[test]
    fn full_house_beats_flush() {
        let full_house = evaluate(&[c("Kc"), c("Kd"), c("Kh"), c("2c"), c("2d"), c("3s"), c("4s")]);
        let flush = evaluate(&[
            Card::new(Rank::Two, Suit::Club),
            Card::new(Rank::Four, Suit::Club),
            Card::new(Rank::Six, Suit::Club),
            Card::new(Rank::Eight, Suit::Club),
            Card::new(Rank::Ten, Suit::Club),
            c("3d"),
            c("9h"),
        ]);
        assert_eq!(full_house.category, HandCategory::FullHouse);
        assert!(full_house > flush);
    }

    #[test]
    fn identical_hands_tie() {
        let a = evaluate(&[c("Ah"), c("Kd"), c("2c"), c("7s"), c("9d")]);
        let b = evaluate(&[c("As"), c("Kc"), c("2d"), c("7h"), c("9c")]);
        assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
    }

    #[test]
    fn kicker_breaks_two_pair_tie() {
        let better = evaluate(&[c("Ah"), c("Ad"), c("Kc"), c("Kd"), c("Qs"), c("7c"), c("2d")]);
        let worse = evaluate(&[c("Ah"), c("Ad"), c("Kc"), c("Kd"), c("Js"), c("7c"), c("2d")]);
        assert!(better > worse);
    }
}
