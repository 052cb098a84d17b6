//! Broadcaster (§4.10): fans sanitized projections and targeted
//! messages out to a table's connections. Grounded on the teacher's
//! `gameroom::Room::{unicast, broadcast}` (send-and-log-on-error,
//! never propagate a single failed send) generalized from a fixed
//! in-process `Vec<UnboundedSender<Event>>` to connections resolved
//! through the `ConnectionManager`, and extended with the per-viewer
//! sanitization and the p95-latency warning §4.10 requires.

use std::collections::HashMap;

use crate::connection::ConnectionManager;
use crate::ids::{ConnectionId, TableId};
use crate::messages::ServerMessage;
use crate::sanitizer::Sanitizer;
use crate::table::Table;

/// Anything that can take a fire-and-forget `ServerMessage` for one
/// connection. A real transport (actix-ws session handle) and a test
/// double both implement this; the Broadcaster itself never touches
/// a socket.
pub trait Outbox {
    fn send(&self, connection_id: ConnectionId, message: ServerMessage) -> Result<(), String>;
}

pub struct Broadcaster<'a, O: Outbox> {
    connections: &'a ConnectionManager,
    outbox: &'a O,
}

/// Target action-to-client latency (§2, §4.10): p95 under 100ms
/// within a single process. The Broadcaster cannot enforce this
/// itself (send is fire-and-forget), but it can detect and warn when
/// the time from trigger to fan-out already exceeds budget.
pub const LATENCY_WARN_MS: u64 = 100;

impl<'a, O: Outbox> Broadcaster<'a, O> {
    pub fn new(connections: &'a ConnectionManager, outbox: &'a O) -> Self {
        Self { connections, outbox }
    }

    /// Sends a personalized `GameStateUpdated` to each seated
    /// player's connections and one shared spectator projection to
    /// every spectator connection, per §4.10.
    pub fn broadcast_state(
        &self,
        table: &Table,
        shown_cards: &HashMap<crate::ids::PlayerId, Vec<crate::cards::Card>>,
        now_ms: u64,
        triggered_at_ms: u64,
    ) {
        if now_ms.saturating_sub(triggered_at_ms) > LATENCY_WARN_MS {
            log::warn!(
                "broadcast for table {} exceeded {}ms latency budget ({}ms)",
                table.id,
                LATENCY_WARN_MS,
                now_ms - triggered_at_ms
            );
        }

        for (connection_id, player_id) in self.connections.player_connections(table.id) {
            let state = Sanitizer::project(table, Some(player_id), shown_cards, now_ms);
            self.unicast(connection_id, ServerMessage::GameStateUpdated { state });
        }

        if !self.connections.spectator_connections(table.id).is_empty() {
            let state = Sanitizer::project(table, None, shown_cards, now_ms);
            for connection_id in self.connections.spectator_connections(table.id) {
                self.unicast(
                    connection_id,
                    ServerMessage::GameStateUpdated { state: state.clone() },
                );
            }
        }
    }

    /// `HandStarted`: each player gets their own hole cards alongside
    /// state; spectators get state only (§4.10).
    pub fn broadcast_hand_started(
        &self,
        table: &Table,
        shown_cards: &HashMap<crate::ids::PlayerId, Vec<crate::cards::Card>>,
        now_ms: u64,
    ) {
        for (connection_id, player_id) in self.connections.player_connections(table.id) {
            let state = Sanitizer::project(table, Some(player_id), shown_cards, now_ms);
            let hole_cards = table.player(player_id).map(|p| p.hole_cards.clone());
            self.unicast(
                connection_id,
                ServerMessage::HandStarted { state, your_hole_cards: hole_cards },
            );
        }
        for connection_id in self.connections.spectator_connections(table.id) {
            let state = Sanitizer::project(table, None, shown_cards, now_ms);
            self.unicast(
                connection_id,
                ServerMessage::HandStarted { state, your_hole_cards: None },
            );
        }
    }

    /// Addressed to the whole table group; only `player_id` may act
    /// on it, but everyone needs to see whose turn it is.
    pub fn broadcast_to_table(&self, table_id: TableId, message: ServerMessage) {
        for (connection_id, _) in self.connections.player_connections(table_id) {
            self.unicast(connection_id, message.clone());
        }
        for connection_id in self.connections.spectator_connections(table_id) {
            self.unicast(connection_id, message.clone());
        }
    }

    pub fn unicast(&self, connection_id: ConnectionId, message: ServerMessage) {
        if let Err(err) = self.outbox.send(connection_id, message) {
            log::warn!("failed to deliver to connection {connection_id}: {err}");
        }
    }
}
