//! Hand (§3): one deal's authoritative state, owned exclusively by the
//! table actor for its lifetime. Grounded on the teacher's
//! `gameplay::Game` (which bundled board/seats/pot into one type) and
//! `gameplay::Hand` (the 2-hole-card container); split here into the
//! richer shape §3 names, since the teacher's `Game` has no side-pot
//! list, timer context, or event-store linkage.

use crate::cards::Card;
use crate::ids::{HandId, PlayerId};
use crate::pot::Pot;
use crate::state_machine::{HandStateMachine, Phase};
use crate::Chips;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Hand {
    pub id: HandId,
    pub hand_number: u64,
    state_machine: HandStateMachine,
    pub small_blind_position: PlayerId,
    pub big_blind_position: PlayerId,
    pub community_cards: Vec<Card>,
    /// Second board, for double-board bomb pots only.
    pub second_board: Option<Vec<Card>>,
    pub pots: Vec<Pot>,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub raises_this_round: u32,
    /// Players who have acted at least once at the current bet level
    /// this street; cleared on every street transition. Needed
    /// alongside contribution equality — a street where nobody has
    /// acted yet already has every contribution at zero, which would
    /// otherwise look "complete".
    pub acted_this_round: HashSet<PlayerId>,
    pub current_player_id: Option<PlayerId>,
    pub last_aggressor_id: Option<PlayerId>,
    pub button_position: PlayerId,
    pub player_ids: Vec<PlayerId>,
    pub is_bomb_pot: bool,
    pub is_double_board: bool,
    pub started_at_ms: u64,
    pub completed_at_ms: Option<u64>,
}

impl Hand {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: HandId,
        hand_number: u64,
        small_blind_position: PlayerId,
        big_blind_position: PlayerId,
        button_position: PlayerId,
        player_ids: Vec<PlayerId>,
        is_bomb_pot: bool,
        is_double_board: bool,
        started_at_ms: u64,
    ) -> Self {
        Self {
            id,
            hand_number,
            state_machine: HandStateMachine::default(),
            small_blind_position,
            big_blind_position,
            community_cards: Vec::new(),
            second_board: is_double_board.then(Vec::new),
            pots: Vec::new(),
            current_bet: 0,
            min_raise: 0,
            raises_this_round: 0,
            acted_this_round: HashSet::new(),
            current_player_id: None,
            last_aggressor_id: None,
            button_position,
            player_ids,
            is_bomb_pot,
            is_double_board,
            started_at_ms,
            completed_at_ms: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.state_machine.phase()
    }

    pub fn state_machine(&mut self) -> &mut HandStateMachine {
        &mut self.state_machine
    }

    pub fn total_pot(&self) -> Chips {
        self.pots.iter().map(|p| p.amount).sum()
    }

    /// Resets round-scoped betting state on entering a new betting
    /// round (§4.5 "Resets round-scoped betting state on entering a
    /// betting round").
    pub fn reset_betting_round_state(&mut self, min_raise_floor: Chips) {
        self.current_bet = 0;
        self.min_raise = min_raise_floor;
        self.raises_this_round = 0;
        self.acted_this_round.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pot_sums_all_pots() {
        use crate::pot::PotType;
        use std::collections::HashSet;
        let mut hand = Hand::new(
            HandId::new(),
            1,
            PlayerId::new(),
            PlayerId::new(),
            PlayerId::new(),
            vec![],
            false,
            false,
            0,
        );
        hand.pots.push(Pot {
            id: 1,
            amount: 10,
            kind: PotType::Main,
            creation_order: 0,
            eligible: HashSet::new(),
        });
        hand.pots.push(Pot {
            id: 2,
            amount: 5,
            kind: PotType::Side,
            creation_order: 1,
            eligible: HashSet::new(),
        });
        assert_eq!(hand.total_pot(), 15);
    }
}
