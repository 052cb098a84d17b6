//! Table (§3): the seated membership and configuration a hand is
//! played within. Grounded on the teacher's `gameplay::Game` seat
//! vector plus `hosting::casino::Casino`'s table registry, split so
//! configuration (`TableConfig`) and per-session mutable state
//! (`Table`) are separate the way `config.rs` is validated once while
//! `Table` mutates every hand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TableConfig;
use crate::hand::Hand;
use crate::ids::{PlayerId, TableId};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableStatus {
    Waiting,
    Playing,
    Paused,
    Closed,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub config: TableConfig,
    /// Seat position (1..=max_seats) to occupant, if any.
    pub seats: BTreeMap<u8, Player>,
    pub button_seat: Option<u8>,
    pub hand_count: u64,
    pub status: TableStatus,
    pub current_hand: Option<Hand>,
    pub host_player_id: PlayerId,
}

impl Table {
    pub fn new(id: TableId, name: impl Into<String>, config: TableConfig, host_player_id: PlayerId) -> Self {
        Self {
            id,
            name: name.into(),
            config,
            seats: BTreeMap::new(),
            button_seat: None,
            hand_count: 0,
            status: TableStatus::Waiting,
            current_hand: None,
            host_player_id,
        }
    }

    pub fn seat_player(&mut self, seat: u8, mut player: Player) -> Option<Player> {
        // Time bank is a per-player reservoir that persists across
        // hands at this table (§4.6), not a per-hand refill; seed it
        // once on seating rather than at every `start_new_hand`.
        if self.config.time_bank_enabled {
            player.time_bank_seconds = self.config.time_bank_seconds;
        }
        self.seats.insert(seat, player)
    }

    pub fn remove_player(&mut self, player_id: PlayerId) -> Option<Player> {
        let seat = self
            .seats
            .iter()
            .find(|(_, p)| p.id == player_id)
            .map(|(s, _)| *s)?;
        self.seats.remove(&seat)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.seats.values().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut Player> {
        self.seats.values_mut().find(|p| p.id == player_id)
    }

    /// Seats eligible to be dealt into the next hand: occupied, not
    /// Away, with chips (§4.8 step 1).
    pub fn active_seat_order(&self) -> Vec<u8> {
        self.seats
            .iter()
            .filter(|(_, p)| p.status != crate::player::PlayerStatus::Away && p.stack > 0)
            .map(|(seat, _)| *seat)
            .collect()
    }

    /// The next occupied seat strictly after `from`, wrapping around,
    /// skipping empty seats. Used for button rotation and find-next-
    /// to-act. Returns `None` if no other occupied seat exists.
    pub fn next_occupied_seat(&self, from: u8) -> Option<u8> {
        let max = self.config.max_seats;
        let mut seat = from;
        for _ in 0..max {
            seat = if seat >= max { 1 } else { seat + 1 };
            if seat == from {
                break;
            }
            if self.seats.contains_key(&seat) {
                return Some(seat);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TableConfig;

    #[test]
    fn next_occupied_seat_wraps_around() {
        let mut table = Table::new(TableId::new(), "t", TableConfig::default(), PlayerId::new());
        table.seat_player(1, Player::new(PlayerId::new(), "a", 100, 1));
        table.seat_player(9, Player::new(PlayerId::new(), "b", 100, 9));
        assert_eq!(table.next_occupied_seat(9), Some(1));
    }

    #[test]
    fn remove_player_frees_seat() {
        let mut table = Table::new(TableId::new(), "t", TableConfig::default(), PlayerId::new());
        let id = PlayerId::new();
        table.seat_player(1, Player::new(id, "a", 100, 1));
        assert!(table.remove_player(id).is_some());
        assert!(table.seats.is_empty());
    }
}
