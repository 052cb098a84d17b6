use crate::cards::Card;
use crate::ids::PlayerId;
use crate::Chips;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Waiting,
    Active,
    Folded,
    AllIn,
    Away,
    SittingOut,
}

impl PlayerStatus {
    /// A player is "in the hand" iff status is `Active` or `AllIn`:
    /// still eligible to win, whether or not they can still act.
    pub fn is_in_hand(self) -> bool {
        matches!(self, PlayerStatus::Active | PlayerStatus::AllIn)
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub stack: Chips,
    pub seat: u8,
    pub status: PlayerStatus,
    /// Amount committed in the current betting round.
    pub current_bet: Chips,
    /// Amount committed across all rounds of the current hand.
    pub total_bet_this_hand: Chips,
    pub hole_cards: Vec<Card>,
    pub time_bank_seconds: u32,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>, stack: Chips, seat: u8) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            stack,
            seat,
            status: PlayerStatus::Waiting,
            current_bet: 0,
            total_bet_this_hand: 0,
            hole_cards: Vec::new(),
            time_bank_seconds: 0,
        }
    }

    pub fn is_in_hand(&self) -> bool {
        self.status.is_in_hand()
    }

    /// Resets per-hand state before a new deal; keeps stack, seat,
    /// identity, and time bank.
    pub fn reset_for_new_hand(&mut self) {
        self.current_bet = 0;
        self.total_bet_this_hand = 0;
        self.hole_cards.clear();
        self.status = if self.stack > 0 {
            PlayerStatus::Active
        } else if self.status == PlayerStatus::Away {
            PlayerStatus::Away
        } else {
            PlayerStatus::SittingOut
        };
    }

    /// Resets round-scoped contribution at a street boundary. Stack,
    /// total-this-hand, status, and hole cards survive.
    pub fn reset_for_new_round(&mut self) {
        self.current_bet = 0;
    }

    /// Moves `amount` chips from stack into the pot for this action,
    /// clamped to the player's stack (caller must already have
    /// validated the amount is legal or an intentional all-in).
    pub fn commit(&mut self, amount: Chips) {
        debug_assert!(amount <= self.stack, "commit exceeds stack");
        self.stack -= amount;
        self.current_bet += amount;
        self.total_bet_this_hand += amount;
        if self.stack == 0 && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }
    }
}
