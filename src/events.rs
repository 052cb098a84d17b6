//! EventStore (§4.7): append-only per-hand log with dense monotonic
//! sequencing. Grounded on the teacher's `gameroom::Room` action
//! `history: Vec<Action>` (replace a flat per-room vector with a
//! per-hand, sequence-numbered, queryable store, since §4.7 needs
//! random access by sequence and cross-hand table history, not just
//! replay-in-order).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::ids::{HandId, PlayerId, TableId};
use crate::Chips;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    HandStarted { is_bomb_pot: bool, is_double_board: bool, ante: Option<Chips> },
    BlindsPosted { small_blind: PlayerId, big_blind: PlayerId },
    AntePosted { player: PlayerId, amount: Chips },
    HoleCardsDealt,
    PlayerActed { player: PlayerId, kind: crate::action::ActionKind, amount: Chips },
    BettingRoundCompleted,
    CommunityCardsDealt { phase: crate::state_machine::Phase },
    PlayerShowedCards { player: PlayerId },
    PlayerMuckedCards { player: PlayerId },
    PotAwarded { pot_id: crate::pot::PotId, winners: Vec<PlayerId>, amount: Chips },
    HandCompleted(HandSummary),
}

#[derive(Debug, Clone)]
pub struct Event {
    pub hand_id: HandId,
    pub sequence: u64,
    pub timestamp_ms: u64,
    pub kind: EventKind,
}

/// Persisted shape for a completed hand (§6 "Persisted shape").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandSummary {
    pub hand_id: HandId,
    pub table_id: TableId,
    pub hand_number: u64,
    pub total_pot: Chips,
    pub duration_ms: u64,
    pub player_count: usize,
    pub went_to_showdown: bool,
    pub final_phase: crate::state_machine::Phase,
    pub winner_ids: Vec<PlayerId>,
    pub player_results: HashMap<PlayerId, i64>,
}

/// Append-only log, keyed by hand, shared across a table's hand
/// history and (optionally) across tables — per §5 "EventStore may be
/// shared across tables; per-hand append is the serialization unit".
#[derive(Debug, Default)]
pub struct EventStore {
    by_hand: HashMap<HandId, Vec<Event>>,
    table_hands: HashMap<TableId, Vec<HandId>>,
    summaries: HashMap<HandId, HandSummary>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_last_sequence_number(&self, hand_id: HandId) -> u64 {
        self.by_hand
            .get(&hand_id)
            .and_then(|events| events.last())
            .map(|e| e.sequence)
            .unwrap_or(0)
    }

    /// Appends `kind` to `hand_id`'s log, assigning the next dense
    /// sequence number. `timestamp_ms` is supplied by the caller since
    /// this type must stay deterministic and testable (no wall-clock
    /// reads inside the store).
    pub fn append(&mut self, hand_id: HandId, table_id: TableId, timestamp_ms: u64, kind: EventKind) -> EngineResult<u64> {
        let sequence = self.get_last_sequence_number(hand_id) + 1;
        self.append_at(hand_id, table_id, sequence, timestamp_ms, kind)?;
        Ok(sequence)
    }

    fn append_at(
        &mut self,
        hand_id: HandId,
        table_id: TableId,
        sequence: u64,
        timestamp_ms: u64,
        kind: EventKind,
    ) -> EngineResult<()> {
        let events = self.by_hand.entry(hand_id).or_default();
        if events.iter().any(|e| e.sequence == sequence) {
            return Err(EngineError::SequenceConflict { hand: hand_id, sequence });
        }
        if let EventKind::HandCompleted(ref summary) = kind {
            self.summaries.insert(hand_id, summary.clone());
            self.table_hands.entry(table_id).or_default().push(hand_id);
        } else if events.is_empty() {
            // first event for a hand we haven't seen under this table yet
            self.table_hands.entry(table_id).or_default();
        }
        events.push(Event {
            hand_id,
            sequence,
            timestamp_ms,
            kind,
        });
        Ok(())
    }

    /// Atomic within one call: rejects the whole batch if any sequence
    /// in it collides with an existing one, applying none of them.
    pub fn append_range(
        &mut self,
        hand_id: HandId,
        table_id: TableId,
        entries: Vec<(u64, u64, EventKind)>,
    ) -> EngineResult<()> {
        let existing = self.by_hand.entry(hand_id).or_default();
        for (sequence, _, _) in &entries {
            if existing.iter().any(|e| e.sequence == *sequence) {
                return Err(EngineError::SequenceConflict { hand: hand_id, sequence: *sequence });
            }
        }
        for (sequence, timestamp_ms, kind) in entries {
            self.append_at(hand_id, table_id, sequence, timestamp_ms, kind)?;
        }
        Ok(())
    }

    pub fn get_events(&self, hand_id: HandId) -> &[Event] {
        self.by_hand.get(&hand_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get_events_from(&self, hand_id: HandId, from_sequence: u64) -> Vec<&Event> {
        self.get_events(hand_id)
            .iter()
            .filter(|e| e.sequence >= from_sequence)
            .collect()
    }

    pub fn get_hand_summary(&self, hand_id: HandId) -> Option<&HandSummary> {
        self.summaries.get(&hand_id)
    }

    /// Completed hands only, newest first, up to `limit`.
    pub fn get_table_history(&self, table_id: TableId, limit: usize) -> Vec<&HandSummary> {
        self.table_hands
            .get(&table_id)
            .into_iter()
            .flatten()
            .rev()
            .filter_map(|hand_id| self.summaries.get(hand_id))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_dense_and_starts_at_one() {
        let mut store = EventStore::new();
        let hand = HandId::new();
        let table = TableId::new();
        let s1 = store.append(hand, table, 0, EventKind::HoleCardsDealt).unwrap();
        let s2 = store.append(hand, table, 1, EventKind::BettingRoundCompleted).unwrap();
        assert_eq!((s1, s2), (1, 2));
    }

    #[test]
    fn duplicate_sequence_rejected() {
        let mut store = EventStore::new();
        let hand = HandId::new();
        let table = TableId::new();
        store.append(hand, table, 0, EventKind::HoleCardsDealt).unwrap();
        let err = store.append_at(hand, table, 1, 1, EventKind::BettingRoundCompleted);
        assert!(err.is_err());
    }

    #[test]
    fn summary_absent_until_hand_completed() {
        let mut store = EventStore::new();
        let hand = HandId::new();
        let table = TableId::new();
        store.append(hand, table, 0, EventKind::HoleCardsDealt).unwrap();
        assert!(store.get_hand_summary(hand).is_none());
    }

    #[test]
    fn table_history_newest_first_and_limited() {
        let mut store = EventStore::new();
        let table = TableId::new();
        for n in 0..3u64 {
            let hand = HandId::new();
            let summary = HandSummary {
                hand_id: hand,
                table_id: table,
                hand_number: n,
                total_pot: 10,
                duration_ms: 100,
                player_count: 2,
                went_to_showdown: false,
                final_phase: crate::state_machine::Phase::Complete,
                winner_ids: vec![],
                player_results: HashMap::new(),
            };
            store.append(hand, table, n, EventKind::HandCompleted(summary)).unwrap();
        }
        let history = store.get_table_history(table, 2);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].hand_number, 2);
    }
}
