//! ConnectionManager (§4.11): maps transport connections to
//! (table, player|spectator) and back, safe under concurrent
//! add/remove/lookup. Grounded on the teacher's
//! `hosting::casino::Casino` registry (a `DashMap`-style sharded
//! table registry keyed by table id) generalized to also track the
//! per-connection and per-table-membership maps §4.11 names, which
//! the teacher's `Casino` does not need since it only routes whole
//! `Client` sessions rather than distinguishing player vs spectator
//! membership per table.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use crate::ids::{ConnectionId, PlayerId, TableId};

#[derive(Debug, Clone, Copy)]
pub struct ConnectionInfo {
    pub table_id: TableId,
    pub player_id: Option<PlayerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Membership {
    connection_id: ConnectionId,
    player_id: PlayerId,
}

#[derive(Debug, Default)]
struct Maps {
    connections: HashMap<ConnectionId, ConnectionInfo>,
    players_by_table: HashMap<TableId, HashSet<Membership>>,
    spectators_by_table: HashMap<TableId, HashSet<ConnectionId>>,
}

/// Thread-safe under concurrent add/remove/lookup via a single
/// `RwLock` guarding all three maps together, keeping them
/// consistent without a cross-map ordering protocol — §4.11 only
/// requires O(1) expected lookups, not per-shard concurrency.
#[derive(Debug, Default)]
pub struct ConnectionManager {
    maps: RwLock<Maps>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&self, connection_id: ConnectionId, table_id: TableId, player_id: PlayerId) {
        let mut maps = self.maps.write().expect("connection manager lock poisoned");
        maps.connections.insert(connection_id, ConnectionInfo { table_id, player_id: Some(player_id) });
        maps.players_by_table
            .entry(table_id)
            .or_default()
            .insert(Membership { connection_id, player_id });
    }

    pub fn add_spectator(&self, connection_id: ConnectionId, table_id: TableId) {
        let mut maps = self.maps.write().expect("connection manager lock poisoned");
        maps.connections.insert(connection_id, ConnectionInfo { table_id, player_id: None });
        maps.spectators_by_table.entry(table_id).or_default().insert(connection_id);
    }

    /// Removes a connection, returning what it had been registered as
    /// so the caller can broadcast the appropriate disconnect event.
    pub fn remove(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        let mut maps = self.maps.write().expect("connection manager lock poisoned");
        let info = maps.connections.remove(&connection_id)?;
        if let Some(player_id) = info.player_id {
            if let Some(members) = maps.players_by_table.get_mut(&info.table_id) {
                members.remove(&Membership { connection_id, player_id });
            }
        } else if let Some(spectators) = maps.spectators_by_table.get_mut(&info.table_id) {
            spectators.remove(&connection_id);
        }
        Some(info)
    }

    pub fn lookup(&self, connection_id: ConnectionId) -> Option<ConnectionInfo> {
        self.maps.read().expect("connection manager lock poisoned").connections.get(&connection_id).copied()
    }

    pub fn player_connections(&self, table_id: TableId) -> Vec<(ConnectionId, PlayerId)> {
        self.maps
            .read()
            .expect("connection manager lock poisoned")
            .players_by_table
            .get(&table_id)
            .into_iter()
            .flatten()
            .map(|m| (m.connection_id, m.player_id))
            .collect()
    }

    pub fn spectator_connections(&self, table_id: TableId) -> Vec<ConnectionId> {
        self.maps
            .read()
            .expect("connection manager lock poisoned")
            .spectators_by_table
            .get(&table_id)
            .into_iter()
            .flatten()
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_player_clears_membership() {
        let manager = ConnectionManager::new();
        let table = TableId::new();
        let player = PlayerId::new();
        let conn = ConnectionId::new();
        manager.add_player(conn, table, player);
        assert_eq!(manager.player_connections(table).len(), 1);
        let removed = manager.remove(conn).unwrap();
        assert_eq!(removed.player_id, Some(player));
        assert!(manager.player_connections(table).is_empty());
        assert!(manager.lookup(conn).is_none());
    }

    #[test]
    fn spectators_tracked_separately_from_players() {
        let manager = ConnectionManager::new();
        let table = TableId::new();
        manager.add_player(ConnectionId::new(), table, PlayerId::new());
        manager.add_spectator(ConnectionId::new(), table);
        assert_eq!(manager.player_connections(table).len(), 1);
        assert_eq!(manager.spectator_connections(table).len(), 1);
    }
}
