//! HandStateMachine (§4.5). A static edge set over `Phase`, keyed by
//! `Trigger`; illegal transitions are rejected without side effects.
//! Grounded on the teacher's `gameplay::Turn`/`mccfr::phase::Phase`
//! enums (phase as explicit state rather than implicit from street
//! index) and the `gameroom::Room::run` dispatch-by-phase loop.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    StartHand,
    BettingComplete,
    AllFolded,
    ShowdownComplete,
    ForceEnd,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone)]
pub struct HandStateTransition {
    pub from: Phase,
    pub to: Phase,
    pub trigger: Trigger,
}

/// Holds the current phase and the history of transitions for one
/// hand's lifetime. Recreated per hand (§3 "BettingRound replaced at
/// each street transition" applies analogously here: the machine
/// itself is scoped to one Hand).
#[derive(Debug, Clone)]
pub struct HandStateMachine {
    phase: Phase,
    history: Vec<HandStateTransition>,
}

impl Default for HandStateMachine {
    fn default() -> Self {
        Self {
            phase: Phase::Waiting,
            history: Vec::new(),
        }
    }
}

impl HandStateMachine {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[HandStateTransition] {
        &self.history
    }

    /// Validates and applies `trigger` from the current phase,
    /// returning the new phase. No entry/exit side effects are
    /// performed here — callers (the Orchestrator) run those around
    /// this call, since they require access to Hand/Player/Pot state
    /// this type deliberately does not hold.
    pub fn apply(&mut self, trigger: Trigger) -> EngineResult<Phase> {
        let to = Self::next_phase(self.phase, trigger)?;
        self.history.push(HandStateTransition {
            from: self.phase,
            to,
            trigger,
        });
        self.phase = to;
        Ok(to)
    }

    fn next_phase(from: Phase, trigger: Trigger) -> EngineResult<Phase> {
        use Phase::*;
        use Trigger::*;
        let to = match (from, trigger) {
            (Waiting, StartHand) => Preflop,
            (Preflop, BettingComplete) => Flop,
            (Flop, BettingComplete) => Turn,
            (Turn, BettingComplete) => River,
            (River, BettingComplete) => Showdown,
            // a betting round can also complete by running out the
            // board when only one player with a decision remains
            // (§4.8 step 6); the Orchestrator drives the intermediate
            // street transitions itself and only calls this machine
            // once more to land on Showdown.
            (Showdown, ShowdownComplete) => Complete,
            (Preflop | Flop | Turn | River, AllFolded) => Complete,
            (_, ForceEnd) => Complete,
            _ => {
                return Err(EngineError::InvalidTransition {
                    from: format!("{from:?}"),
                    trigger: trigger.to_string(),
                })
            }
        };
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hand_reaches_showdown() {
        let mut m = HandStateMachine::default();
        assert_eq!(m.apply(Trigger::StartHand).unwrap(), Phase::Preflop);
        assert_eq!(m.apply(Trigger::BettingComplete).unwrap(), Phase::Flop);
        assert_eq!(m.apply(Trigger::BettingComplete).unwrap(), Phase::Turn);
        assert_eq!(m.apply(Trigger::BettingComplete).unwrap(), Phase::River);
        assert_eq!(m.apply(Trigger::BettingComplete).unwrap(), Phase::Showdown);
        assert_eq!(m.apply(Trigger::ShowdownComplete).unwrap(), Phase::Complete);
        assert_eq!(m.history().len(), 6);
    }

    #[test]
    fn all_folded_short_circuits_from_any_betting_phase() {
        let mut m = HandStateMachine::default();
        m.apply(Trigger::StartHand).unwrap();
        m.apply(Trigger::BettingComplete).unwrap(); // Flop
        assert_eq!(m.apply(Trigger::AllFolded).unwrap(), Phase::Complete);
    }

    #[test]
    fn rejects_transition_not_in_static_edge_set() {
        let mut m = HandStateMachine::default();
        assert!(m.apply(Trigger::BettingComplete).is_err());
        assert_eq!(m.phase(), Phase::Waiting);
    }

    #[test]
    fn force_end_always_legal() {
        let mut m = HandStateMachine::default();
        m.apply(Trigger::StartHand).unwrap();
        assert_eq!(m.apply(Trigger::ForceEnd).unwrap(), Phase::Complete);
    }
}
