//! Wire message catalogue (§6). Grounded on the teacher's
//! `gameroom::Event` enum (`Play(Action)`, `ShowHand`, `YourTurn`) —
//! a single internally-tagged enum per direction — generalized from
//! that protocol's three message kinds into the full client/server
//! vocabulary §6 enumerates. Internally tagged (`#[serde(tag =
//! "type")]`) so a client can match on a single field without peeking
//! into a payload shape first.

use serde::{Deserialize, Serialize};

use crate::action::ActionKind;
use crate::ids::{PlayerId, TableId};
use crate::sanitizer::TableGameState;
use crate::Chips;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    JoinTable { table_id: TableId, player_id: PlayerId },
    JoinAsSpectator { table_id: TableId },
    LeaveTable,
    Fold,
    Check,
    Call,
    Raise { amount: Chips },
    AllIn,
    GetAvailableActions,
    GetTimerState,
    RequestMuck,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerInfo {
    pub player_id: PlayerId,
    pub amount: Chips,
    pub shown_cards: Option<Vec<crate::cards::Card>>,
    pub hand_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    PlayerJoined { player_id: PlayerId },
    PlayerLeft { player_id: PlayerId },
    PlayerDisconnected { player_id: PlayerId },
    SpectatorJoined,
    SpectatorLeft,
    GameStateUpdated { state: TableGameState },
    HandStarted { state: TableGameState, your_hole_cards: Option<Vec<crate::cards::Card>> },
    ActionExecuted {
        player_id: PlayerId,
        kind: ActionKind,
        amount: Chips,
        next_player_id: Option<PlayerId>,
        betting_round_complete: bool,
        hand_complete: bool,
    },
    HandCompleted {
        table_id: TableId,
        hand_number: u64,
        winners: Vec<WinnerInfo>,
        final_pot: Chips,
    },
    ActionRequired { player_id: PlayerId, timeout_seconds: u32 },
    AvailableActions { actions: Vec<ActionKind> },
    TimerStarted { player_id: PlayerId, total_seconds: u32, time_bank_available: u32 },
    TimerTick { player_id: PlayerId, remaining_seconds: u32, is_time_bank_active: bool, time_bank_remaining: u32 },
    TimerWarning { player_id: PlayerId, remaining_seconds: u32 },
    TimeBankActivated { player_id: PlayerId, time_bank_seconds_added: u32, time_bank_remaining: u32 },
    TimerCancelled { player_id: PlayerId },
    TimerExpired { player_id: PlayerId },
    ActionRejected { reason: String },
}
