//! ActionValidator (§4.4): given a player, the current betting round,
//! and an intent, produce a `ValidatedAction` or a rejection reason.
//! Grounded on the teacher's `gameplay::seat::Seat::valid_actions`
//! (can_check/can_call/can_raise/can_shove predicates), generalized
//! to explicit validation of a single proposed action rather than
//! enumeration of all legal ones (the wire-level `GetAvailableActions`
//! request in §6 is built from the same predicates, see
//! `ActionValidator::legal_actions`).

use crate::betting::BettingRound;
use crate::error::{EngineError, EngineResult};
use crate::player::Player;
use crate::Chips;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
    AllIn,
}

/// What a client asks for. `amount` is only meaningful for `Raise`: it
/// is the player's desired new total round contribution (not the
/// incremental add-on), matching how `Hand.CurrentBet` and
/// `BettingRound.current_bet` are expressed.
#[derive(Debug, Clone, Copy)]
pub struct ActionIntent {
    pub kind: ActionKind,
    pub amount: Chips,
}

#[derive(Debug, Clone, Copy)]
pub struct ValidatedAction {
    pub kind: ActionKind,
    /// Chips moved from stack to pot by this action.
    pub amount: Chips,
    /// The player's round contribution after this action.
    pub new_total_bet: Chips,
    pub is_raise: bool,
    /// Whether this action reopens betting for players who already
    /// acted at the prior bet level (always true for a full raise;
    /// false for an under-min all-in).
    pub reopens_action: bool,
    pub remaining_stack: Chips,
}

pub struct ActionValidator;

impl ActionValidator {
    pub fn validate(
        player: &Player,
        round: &BettingRound,
        intent: ActionIntent,
        is_players_turn: bool,
    ) -> EngineResult<ValidatedAction> {
        if !is_players_turn {
            return Err(EngineError::ValidationRejected {
                reason: "it is not this player's turn to act".into(),
            });
        }

        let to_call = round.current_bet - player.current_bet;

        match intent.kind {
            ActionKind::Fold => Ok(ValidatedAction {
                kind: ActionKind::Fold,
                amount: 0,
                new_total_bet: player.current_bet,
                is_raise: false,
                reopens_action: false,
                remaining_stack: player.stack,
            }),

            ActionKind::Check => {
                if to_call != 0 {
                    return Err(EngineError::ValidationRejected {
                        reason: format!(
                            "cannot check: {to_call} chips face this player"
                        ),
                    });
                }
                Ok(ValidatedAction {
                    kind: ActionKind::Check,
                    amount: 0,
                    new_total_bet: player.current_bet,
                    is_raise: false,
                    reopens_action: false,
                    remaining_stack: player.stack,
                })
            }

            ActionKind::Call => {
                if to_call <= 0 {
                    return Err(EngineError::ValidationRejected {
                        reason: "no bet faces this player to call".into(),
                    });
                }
                let call_amount = to_call.min(player.stack);
                Ok(ValidatedAction {
                    kind: ActionKind::Call,
                    amount: call_amount,
                    new_total_bet: player.current_bet + call_amount,
                    is_raise: false,
                    reopens_action: false,
                    remaining_stack: player.stack - call_amount,
                })
            }

            ActionKind::Raise => {
                let min_legal_total =
                    round.current_bet + round.min_raise.max(player_big_blind_floor(round));
                if intent.amount < min_legal_total {
                    return Err(EngineError::ValidationRejected {
                        reason: format!(
                            "raise to {} is below the minimum legal raise to {min_legal_total}; use AllIn if short",
                            intent.amount
                        ),
                    });
                }
                let needed = intent.amount - player.current_bet;
                if needed > player.stack {
                    return Err(EngineError::ValidationRejected {
                        reason: "raise amount exceeds remaining stack; use AllIn".into(),
                    });
                }
                if needed == player.stack {
                    // a full-stack bet that happens to land exactly on
                    // the requested raise total is still an all-in.
                    return Ok(ValidatedAction {
                        kind: ActionKind::AllIn,
                        amount: needed,
                        new_total_bet: intent.amount,
                        is_raise: intent.amount > round.current_bet,
                        reopens_action: true,
                        remaining_stack: 0,
                    });
                }
                Ok(ValidatedAction {
                    kind: ActionKind::Raise,
                    amount: needed,
                    new_total_bet: intent.amount,
                    is_raise: true,
                    reopens_action: true,
                    remaining_stack: player.stack - needed,
                })
            }

            ActionKind::AllIn => {
                let needed = player.stack;
                let new_total_bet = player.current_bet + needed;
                let is_raise = new_total_bet > round.current_bet;
                let reopens_action = is_raise && (new_total_bet - round.current_bet) >= round.min_raise;
                Ok(ValidatedAction {
                    kind: ActionKind::AllIn,
                    amount: needed,
                    new_total_bet,
                    is_raise,
                    reopens_action,
                    remaining_stack: 0,
                })
            }
        }
    }

    /// The set of action kinds currently legal for `player`, used to
    /// answer the `GetAvailableActions` client request (§6).
    pub fn legal_actions(player: &Player, round: &BettingRound) -> Vec<ActionKind> {
        let mut legal = vec![ActionKind::Fold];
        let to_call = round.current_bet - player.current_bet;
        if to_call <= 0 {
            legal.push(ActionKind::Check);
        } else {
            legal.push(ActionKind::Call);
        }
        if player.stack > 0 {
            legal.push(ActionKind::AllIn);
            let min_legal_total = round.current_bet + round.min_raise;
            if player.current_bet + player.stack > min_legal_total {
                legal.push(ActionKind::Raise);
            }
        }
        legal
    }
}

/// Defends against a zero `min_raise` on a malformed round; the big
/// blind is always the absolute floor for an opening raise size.
fn player_big_blind_floor(round: &BettingRound) -> Chips {
    round.min_raise.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use crate::player::{Player, PlayerStatus};

    fn active_player(stack: Chips, current_bet: Chips) -> Player {
        let mut p = Player::new(PlayerId::new(), "p", stack, 1);
        p.status = PlayerStatus::Active;
        p.current_bet = current_bet;
        p
    }

    #[test]
    fn check_rejected_when_bet_faces_player() {
        let player = active_player(100, 0);
        let round = BettingRound {
            current_bet: 2,
            ..BettingRound::new(2)
        };
        let result = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::Check, amount: 0 },
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn call_for_less_than_needed_is_implicit_all_in() {
        let player = active_player(5, 0);
        let round = BettingRound {
            current_bet: 20,
            ..BettingRound::new(2)
        };
        let validated = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::Call, amount: 0 },
            true,
        )
        .unwrap();
        assert_eq!(validated.amount, 5);
        assert_eq!(validated.remaining_stack, 0);
    }

    #[test]
    fn under_min_raise_rejected_unless_all_in() {
        let player = active_player(1000, 0);
        let round = BettingRound {
            current_bet: 10,
            min_raise: 10,
            ..BettingRound::new(10)
        };
        let result = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::Raise, amount: 15 },
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn all_in_under_min_raise_does_not_reopen_action() {
        let player = active_player(15, 0);
        let round = BettingRound {
            current_bet: 10,
            min_raise: 10,
            ..BettingRound::new(10)
        };
        let validated = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::AllIn, amount: 0 },
            true,
        )
        .unwrap();
        assert!(validated.is_raise);
        assert!(!validated.reopens_action);
    }

    #[test]
    fn full_raise_reopens_action() {
        let player = active_player(1000, 0);
        let round = BettingRound {
            current_bet: 10,
            min_raise: 10,
            ..BettingRound::new(10)
        };
        let validated = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::Raise, amount: 20 },
            true,
        )
        .unwrap();
        assert!(validated.reopens_action);
        assert_eq!(validated.amount, 20);
    }

    #[test]
    fn out_of_turn_action_rejected() {
        let player = active_player(100, 0);
        let round = BettingRound::new(2);
        let result = ActionValidator::validate(
            &player,
            &round,
            ActionIntent { kind: ActionKind::Fold, amount: 0 },
            false,
        );
        assert!(result.is_err());
    }
}
