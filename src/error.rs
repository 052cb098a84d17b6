//! Error taxonomy (§7). Kinds are semantic, not a grab-bag of
//! `From` conversions: each variant maps to exactly one propagation
//! policy described in the spec.

use crate::ids::{HandId, PlayerId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad intent: out of turn, below-min raise, check facing a bet,
    /// insufficient chips. Reported to the caller only; no state
    /// change, no event recorded.
    #[error("action rejected: {reason}")]
    ValidationRejected { reason: String },

    /// The state machine refused a transition. No side effects.
    #[error("invalid transition: {from:?} -> {trigger} not permitted")]
    InvalidTransition { from: String, trigger: String },

    /// EventStore saw a duplicate sequence number for a hand. This is
    /// a programming bug; it must abort the enclosing operation.
    #[error("sequence conflict for hand {hand}: sequence {sequence} already recorded")]
    SequenceConflict { hand: HandId, sequence: u64 },

    /// The deck was drawn empty. Programming bug or hostile state;
    /// the caller must force-end the hand.
    #[error("deck exhausted: requested {requested} cards, {remaining} remain")]
    ResourceExhausted { requested: usize, remaining: usize },

    /// A timer cancel/expiry arrived for a timer already removed.
    /// Expected under race; callers should no-op, not propagate.
    #[error("timer race for player {player}: timer already removed")]
    TimerRace { player: PlayerId },

    /// A broadcast to one connection failed. Non-fatal: log and
    /// continue fanning out to the rest; the connection is dropped by
    /// the `ConnectionManager`.
    #[error("failed to deliver to connection: {reason}")]
    ExternalSendFailure { reason: String },

    /// Table-level setup/configuration problems (not in the original
    /// taxonomy verbatim, but required to reject bad `TableConfig`
    /// values before a hand ever starts).
    #[error("invalid table configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Programming-level invariant failure (chip conservation, pot
    /// sum mismatch). Always fatal to the current hand.
    #[error("invariant violated: {reason}")]
    InvariantViolated { reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
