//! Sanitizer (§4.10): per-viewer projection of table state. Grounded
//! on the teacher's `gameplay::Observation` (which already encodes
//! "what one seat is allowed to see": own hand + board, never
//! opponents' hole cards) generalized from a single-seat CFR
//! observation into a full per-viewer `TableGameState` with pots,
//! timers, and a spectator variant.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::Hand;
use crate::ids::PlayerId;
use crate::player::{Player, PlayerStatus};
use crate::table::{Table, TableStatus};
use crate::Chips;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub display_name: String,
    pub stack: Chips,
    pub seat: u8,
    pub status: PlayerStatus,
    pub current_bet: Chips,
    /// `Some` iff the viewer may see these hole cards right now.
    pub hole_cards: Option<Vec<Card>>,
    /// True when the player has live, undisclosed hole cards the
    /// viewer is not entitled to see.
    pub has_hidden_cards: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotView {
    pub amount: Chips,
    pub eligible_player_ids: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableGameState {
    pub table_status: TableStatus,
    pub players: Vec<PlayerView>,
    pub community_cards: Vec<Card>,
    pub second_board: Option<Vec<Card>>,
    pub pots: Vec<PotView>,
    pub current_player_id: Option<PlayerId>,
    pub current_bet: Chips,
    pub button_seat: Option<u8>,
    pub server_timestamp_ms: u64,
}

pub struct Sanitizer;

impl Sanitizer {
    /// `viewer` is `None` for a spectator projection. `shown_cards`
    /// lists players whose hole cards have been revealed at showdown
    /// this hand and so are visible to every viewer, spectators
    /// included.
    pub fn project(
        table: &Table,
        viewer: Option<PlayerId>,
        shown_cards: &HashMap<PlayerId, Vec<Card>>,
        now_ms: u64,
    ) -> TableGameState {
        let players = table
            .seats
            .values()
            .map(|p| Self::project_player(p, viewer, shown_cards))
            .collect();

        let (community_cards, second_board, pots, current_player_id, current_bet) =
            match &table.current_hand {
                Some(hand) => (
                    hand.community_cards.clone(),
                    hand.second_board.clone(),
                    hand.pots
                        .iter()
                        .map(|pot| PotView {
                            amount: pot.amount,
                            eligible_player_ids: pot.eligible.iter().copied().collect(),
                        })
                        .collect(),
                    hand.current_player_id,
                    hand.current_bet,
                ),
                None => (Vec::new(), None, Vec::new(), None, 0),
            };

        TableGameState {
            table_status: table.status,
            players,
            community_cards,
            second_board,
            pots,
            current_player_id,
            current_bet,
            button_seat: table.button_seat,
            server_timestamp_ms: now_ms,
        }
    }

    fn project_player(
        player: &Player,
        viewer: Option<PlayerId>,
        shown_cards: &HashMap<PlayerId, Vec<Card>>,
    ) -> PlayerView {
        let visible = viewer == Some(player.id) || shown_cards.contains_key(&player.id);
        // Folded players' mucked cards are never disclosed, and they
        // never surface `has_hidden_cards` either — that flag means
        // "still live, still hiding a hand", which a fold is not.
        let has_cards = !player.hole_cards.is_empty() && player.status.is_in_hand();
        PlayerView {
            player_id: player.id,
            display_name: player.display_name.clone(),
            stack: player.stack,
            seat: player.seat,
            status: player.status,
            current_bet: player.current_bet,
            hole_cards: if visible { Some(player.hole_cards.clone()) } else { None },
            has_hidden_cards: has_cards && !visible,
        }
    }

    /// Convenience used by the Broadcaster to know which connections
    /// need their own personalized projection versus the single
    /// shared spectator one.
    pub fn viewer_ids(table: &Table) -> HashSet<PlayerId> {
        table.seats.values().map(|p| p.id).collect()
    }
}
