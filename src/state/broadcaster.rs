use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::events::SessionEvent;

/// Outbound channel of one player socket.
#[derive(Clone)]
pub struct PlayerConnection {
    /// Distinguishes the sockets a player has open.
    pub connection_id: Uuid,
    /// Writer side of the socket's event queue.
    pub tx: mpsc::UnboundedSender<SessionEvent>,
}

/// Fans session events out to the whole room or to a single player.
///
/// A player may hold several sockets at once; player events reach all of them.
/// Delivery is best-effort: events sent while nobody listens are dropped and
/// nothing is retried.
pub struct SessionBroadcaster {
    room: broadcast::Sender<SessionEvent>,
    connections: DashMap<Uuid, Vec<PlayerConnection>>,
}

impl SessionBroadcaster {
    /// Construct a broadcaster whose room channel buffers `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (room, _receiver) = broadcast::channel(capacity);
        Self {
            room,
            connections: DashMap::new(),
        }
    }

    /// Register a new room subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.room.subscribe()
    }

    /// Publish `event` to every room subscriber.
    pub fn broadcast_to_room(&self, event: SessionEvent) {
        let name = event.name();
        if self.room.send(event).is_err() {
            debug!(event = name, "no room subscriber; event dropped");
        }
    }

    /// Deliver `event` to every open socket of `player_id`.
    pub fn send_to_player(&self, player_id: &Uuid, event: SessionEvent) {
        let connections = self
            .connections
            .get(player_id)
            .map(|entry| entry.clone())
            .unwrap_or_default();
        if connections.is_empty() {
            debug!(%player_id, event = event.name(), "player not connected; event dropped");
            return;
        }

        let name = event.name();
        for connection in connections {
            if connection.tx.send(event.clone()).is_err() {
                warn!(%player_id, event = name, "player channel closed; dropping connection");
                self.unregister(player_id, connection.connection_id);
            }
        }
    }

    /// Add `tx` to the live connections of `player_id` and return its connection id.
    pub fn register(&self, player_id: Uuid, tx: mpsc::UnboundedSender<SessionEvent>) -> Uuid {
        let connection_id = Uuid::new_v4();
        self.connections
            .entry(player_id)
            .or_default()
            .push(PlayerConnection { connection_id, tx });
        connection_id
    }

    /// Drop the connection `connection_id` of `player_id`.
    ///
    /// Returns `true` when the player has no connection left.
    pub fn unregister(&self, player_id: &Uuid, connection_id: Uuid) -> bool {
        if let Some(mut connections) = self.connections.get_mut(player_id) {
            connections.retain(|connection| connection.connection_id != connection_id);
        }
        self.connections
            .remove_if(player_id, |_, connections| connections.is_empty());
        !self.is_connected(player_id)
    }

    /// Whether at least one socket is open for `player_id`.
    pub fn is_connected(&self, player_id: &Uuid) -> bool {
        self.connections
            .get(player_id)
            .is_some_and(|connections| !connections.is_empty())
    }

    /// Number of sockets currently open for `player_id`.
    pub fn connection_count(&self, player_id: &Uuid) -> usize {
        self.connections
            .get(player_id)
            .map_or(0, |connections| connections.len())
    }
}
