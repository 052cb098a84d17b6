//! ShowdownHandler (§4.9): show order, voluntary-muck policy,
//! per-pot evaluation and award. Grounded on the teacher's
//! `gameplay::showdown::Showdown` (which walks seats computing
//! `LocalReward` per seat from a single board) generalized to
//! explicit show order, multi-pot eligibility, and the double-board
//! 50/50 split §4.9 requires, none of which the teacher's
//! single-board showdown needed.

use std::collections::HashMap;

use crate::cards::Card;
use crate::error::EngineResult;
use crate::eval::{evaluate, EvaluatedHand};
use crate::hand::Hand;
use crate::ids::PlayerId;
use crate::player::Player;
use crate::pot::{Pot, PotId, PotManager};
use crate::Chips;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowdownDecision {
    Showed,
    Mucked,
}

#[derive(Debug, Clone)]
pub struct ShowdownResult {
    pub decisions: Vec<(PlayerId, ShowdownDecision)>,
    pub awarded: HashMap<PlayerId, Chips>,
    pub winners_by_pot: HashMap<PotId, Vec<PlayerId>>,
    pub hand_descriptions: HashMap<PlayerId, String>,
}

pub struct ShowdownHandler;

impl ShowdownHandler {
    /// `live_players` must be in seat order starting left of the
    /// button (i.e. standard post-flop acting order), filtered to
    /// those still `is_in_hand()`. `priority` maps player to their
    /// acting-order rank, used both as show order's clockwise base and
    /// as `PotManager::award_pots`'s odd-chip tie-break.
    pub fn run(
        hand: &Hand,
        live_players: &[&Player],
        priority: &HashMap<PlayerId, u32>,
    ) -> EngineResult<ShowdownResult> {
        let show_order = Self::show_order(hand, live_players, priority);
        let board_b = hand.is_double_board.then(|| hand.second_board.clone()).flatten();

        let mut evaluations_a: HashMap<PlayerId, EvaluatedHand> = HashMap::new();
        let mut evaluations_b: HashMap<PlayerId, EvaluatedHand> = HashMap::new();
        let mut decisions = Vec::new();
        let mut hand_descriptions = HashMap::new();
        let mut best_a: Option<EvaluatedHand> = None;
        let mut best_b: Option<EvaluatedHand> = None;

        for player in &show_order {
            let seven_a: Vec<Card> = player
                .hole_cards
                .iter()
                .chain(hand.community_cards.iter())
                .copied()
                .collect();
            let evaluated_a = evaluate(&seven_a);
            let evaluated_b = board_b.as_ref().map(|board| {
                let seven: Vec<Card> = player.hole_cards.iter().chain(board.iter()).copied().collect();
                evaluate(&seven)
            });

            let eligible_pots: Vec<&Pot> = hand
                .pots
                .iter()
                .filter(|p| p.eligible.contains(&player.id))
                .collect();
            let can_still_win_a = best_a.as_ref().map(|best| &evaluated_a >= best).unwrap_or(true);
            let can_still_win_b = evaluated_b
                .as_ref()
                .map(|eb| best_b.as_ref().map(|best| eb >= best).unwrap_or(true))
                .unwrap_or(false);
            let can_still_win = eligible_pots.is_empty() || can_still_win_a || can_still_win_b;

            let decision = if decisions.is_empty() || can_still_win {
                ShowdownDecision::Showed
            } else {
                ShowdownDecision::Mucked
            };

            if decision == ShowdownDecision::Showed {
                if best_a.as_ref().is_none_or(|best| evaluated_a > *best) {
                    best_a = Some(evaluated_a.clone());
                }
                let mut description = evaluated_a.description.clone();
                if let Some(eb) = &evaluated_b {
                    if best_b.as_ref().is_none_or(|best| eb > best) {
                        best_b = Some(eb.clone());
                    }
                    description = format!("{description} / {}", eb.description);
                    evaluations_b.insert(player.id, eb.clone());
                }
                hand_descriptions.insert(player.id, description);
                evaluations_a.insert(player.id, evaluated_a);
            }
            decisions.push((player.id, decision));
        }

        let winners_by_pot_a = Self::winners_by_pot(&hand.pots, &evaluations_a);
        let winners_by_pot_b = board_b
            .as_ref()
            .map(|_| Self::winners_by_pot(&hand.pots, &evaluations_b));

        let mut awarded: HashMap<PlayerId, Chips> = HashMap::new();
        let mut winners_by_pot: HashMap<PotId, Vec<PlayerId>> = HashMap::new();

        if let Some(winners_by_pot_b) = winners_by_pot_b {
            // Double-board bomb pot: each pot splits 50/50 between the
            // two boards, a scoop is just the same player winning both
            // halves. Board A (dealt first) absorbs the odd chip on an
            // indivisible pot; this is an Open Question §9 left to
            // implementation and is recorded as such in DESIGN.md.
            for pot in &hand.pots {
                let board_a_amount = pot.amount - pot.amount / 2;
                let board_b_amount = pot.amount / 2;
                let mut half_a = vec![Pot { amount: board_a_amount, ..pot.clone() }];
                let mut half_b = vec![Pot { amount: board_b_amount, ..pot.clone() }];
                let awarded_a = PotManager::award_pots(&mut half_a, &winners_by_pot_a, priority);
                let awarded_b = PotManager::award_pots(&mut half_b, &winners_by_pot_b, priority);
                for (player_id, amount) in awarded_a {
                    *awarded.entry(player_id).or_insert(0) += amount;
                }
                for (player_id, amount) in awarded_b {
                    *awarded.entry(player_id).or_insert(0) += amount;
                }
                let mut combined: Vec<PlayerId> = winners_by_pot_a
                    .get(&pot.id)
                    .cloned()
                    .unwrap_or_default();
                for winner in winners_by_pot_b.get(&pot.id).cloned().unwrap_or_default() {
                    if !combined.contains(&winner) {
                        combined.push(winner);
                    }
                }
                winners_by_pot.insert(pot.id, combined);
            }
        } else {
            let mut pots = hand.pots.clone();
            awarded = PotManager::award_pots(&mut pots, &winners_by_pot_a, priority);
            winners_by_pot = winners_by_pot_a;
        }

        Ok(ShowdownResult {
            decisions,
            awarded,
            winners_by_pot,
            hand_descriptions,
        })
    }

    fn winners_by_pot(
        pots: &[Pot],
        evaluations: &HashMap<PlayerId, EvaluatedHand>,
    ) -> HashMap<PotId, Vec<PlayerId>> {
        let mut winners_by_pot: HashMap<PotId, Vec<PlayerId>> = HashMap::new();
        for pot in pots {
            let mut best: Option<&EvaluatedHand> = None;
            let mut winners = Vec::new();
            for (player_id, evaluated) in evaluations {
                if !pot.eligible.contains(player_id) {
                    continue;
                }
                match best {
                    None => {
                        best = Some(evaluated);
                        winners = vec![*player_id];
                    }
                    Some(b) if evaluated > b => {
                        best = Some(evaluated);
                        winners = vec![*player_id];
                    }
                    Some(b) if evaluated == b => {
                        winners.push(*player_id);
                    }
                    _ => {}
                }
            }
            winners_by_pot.insert(pot.id, winners);
        }
        winners_by_pot
    }

    /// Last aggressor first if there was aggression on the final
    /// street, else first-to-act (seat left of button) first; either
    /// way, clockwise thereafter (§4.9).
    fn show_order<'a>(
        hand: &Hand,
        live_players: &[&'a Player],
        priority: &HashMap<PlayerId, u32>,
    ) -> Vec<&'a Player> {
        let mut ordered: Vec<&Player> = live_players.to_vec();
        ordered.sort_by_key(|p| priority.get(&p.id).copied().unwrap_or(u32::MAX));

        if let Some(aggressor_id) = hand.last_aggressor_id {
            if let Some(pos) = ordered.iter().position(|p| p.id == aggressor_id) {
                ordered.rotate_left(pos);
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::ids::HandId;
    use crate::player::PlayerStatus;
    use crate::pot::PotType;
    use std::collections::HashSet;

    fn card(s: &str) -> Card {
        Card::try_from(s).unwrap()
    }

    fn player(hole: [&str; 2], id: PlayerId) -> Player {
        let mut p = Player::new(id, "p", 0, 1);
        p.status = PlayerStatus::Active;
        p.hole_cards = vec![card(hole[0]), card(hole[1])];
        p
    }

    fn single_pot(eligible: &[PlayerId]) -> Pot {
        Pot {
            id: 1,
            amount: 100,
            kind: PotType::Main,
            creation_order: 0,
            eligible: eligible.iter().copied().collect::<HashSet<_>>(),
        }
    }

    #[test]
    fn best_hand_wins_and_worse_hand_mucks() {
        let (winner_id, loser_id) = (PlayerId::new(), PlayerId::new());
        let winner = player(["Ah", "Ac"], winner_id);
        let loser = player(["2h", "7c"], loser_id);

        let mut hand = Hand::new(HandId::new(), 1, winner_id, loser_id, winner_id, vec![winner_id, loser_id], false, false, 0);
        hand.community_cards = vec![card("Ad"), card("Kd"), card("Qd"), card("3s"), card("4c")];
        hand.pots = vec![single_pot(&[winner_id, loser_id])];

        let priority = HashMap::from([(winner_id, 0), (loser_id, 1)]);
        let result = ShowdownHandler::run(&hand, &[&winner, &loser], &priority).unwrap();

        assert_eq!(result.awarded.get(&winner_id).copied(), Some(100));
        assert_eq!(result.awarded.get(&loser_id), None);
        let loser_decision = result.decisions.iter().find(|(id, _)| *id == loser_id).unwrap().1;
        assert_eq!(loser_decision, ShowdownDecision::Mucked);
    }

    #[test]
    fn tied_hands_split_with_odd_chip_to_priority() {
        let (a_id, b_id) = (PlayerId::new(), PlayerId::new());
        let a = player(["2h", "3c"], a_id);
        let b = player(["2d", "3s"], b_id);

        let mut hand = Hand::new(HandId::new(), 1, a_id, b_id, a_id, vec![a_id, b_id], false, false, 0);
        hand.community_cards = vec![card("Ah"), card("Kd"), card("Qc"), card("Js"), card("9h")];
        hand.pots = vec![Pot { amount: 101, ..single_pot(&[a_id, b_id]) }];

        let priority = HashMap::from([(a_id, 0), (b_id, 1)]);
        let result = ShowdownHandler::run(&hand, &[&a, &b], &priority).unwrap();

        assert_eq!(result.awarded.values().sum::<Chips>(), 101);
        assert_eq!(result.awarded[&a_id], 51);
        assert_eq!(result.awarded[&b_id], 50);
    }

    #[test]
    fn double_board_scoop_awards_both_halves() {
        let (scooper_id, other_id) = (PlayerId::new(), PlayerId::new());
        let scooper = player(["Ah", "Ac"], scooper_id);
        let other = player(["2h", "7c"], other_id);

        let mut hand = Hand::new(HandId::new(), 1, scooper_id, other_id, scooper_id, vec![scooper_id, other_id], true, true, 0);
        hand.community_cards = vec![card("Ad"), card("Kd"), card("Qd"), card("3s"), card("4c")];
        hand.second_board = Some(vec![card("As"), card("Kh"), card("Qh"), card("3d"), card("4d")]);
        hand.pots = vec![single_pot(&[scooper_id, other_id])];

        let priority = HashMap::from([(scooper_id, 0), (other_id, 1)]);
        let result = ShowdownHandler::run(&hand, &[&scooper, &other], &priority).unwrap();

        assert_eq!(result.awarded.get(&scooper_id).copied(), Some(100));
        assert_eq!(result.awarded.get(&other_id), None);
    }

    #[test]
    fn double_board_split_divides_pot_between_distinct_winners() {
        let (a_id, b_id) = (PlayerId::new(), PlayerId::new());
        // `a` has the nuts on board A (trip aces), `b` has the nuts on
        // board B (trip kings); neither beats the other on the board
        // they lose, so each should take exactly one half.
        let a = player(["Ah", "Ac"], a_id);
        let b = player(["Kh", "Kc"], b_id);

        let mut hand = Hand::new(HandId::new(), 1, a_id, b_id, a_id, vec![a_id, b_id], true, true, 0);
        hand.community_cards = vec![card("Ad"), card("2d"), card("3h"), card("5s"), card("9c")];
        hand.second_board = Some(vec![card("Kd"), card("2h"), card("3c"), card("6s"), card("9d")]);
        hand.pots = vec![single_pot(&[a_id, b_id])];

        let priority = HashMap::from([(a_id, 0), (b_id, 1)]);
        let result = ShowdownHandler::run(&hand, &[&a, &b], &priority).unwrap();

        assert_eq!(result.awarded[&a_id], 50);
        assert_eq!(result.awarded[&b_id], 50);
    }
}
