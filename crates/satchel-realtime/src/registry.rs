//! Room registry for the delivery channel.
//!
//! Each identity owns a room; every live connection that joined the room
//! holds a sender handle. Notification is best-effort fan-out: closed
//! connections are evicted on the next push, and an identity with no
//! connections simply misses the event and re-queries over REST later.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use satchel_core::IdentityId;

use crate::events::DeliveryEvent;

/// Opaque handle for one delivery channel connection.
pub type ConnectionId = u64;

/// Tracks which connections belong to which identity rooms.
///
/// All methods are lock-free reads/writes over sharded maps; none of them
/// block on peer sockets.
#[derive(Default)]
pub struct DeliveryRegistry {
    /// Room membership: identity -> (connection -> sender).
    rooms: DashMap<IdentityId, HashMap<ConnectionId, UnboundedSender<DeliveryEvent>>>,
    /// Reverse index so leave() does not scan every room.
    by_connection: DashMap<ConnectionId, IdentityId>,
    /// Counter for connection handles.
    next_connection: AtomicU64,
}

impl DeliveryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for a new connection.
    ///
    /// The connection is not in any room until [`join`](Self::join) is
    /// called with an identity.
    pub fn open(&self) -> (ConnectionId, UnboundedReceiver<DeliveryEvent>, UnboundedSender<DeliveryEvent>) {
        let connection = self.next_connection.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        (connection, rx, tx)
    }

    /// Bind a connection to an identity's room.
    ///
    /// A connection already bound elsewhere is moved, so a repeated join
    /// rebinds rather than duplicating delivery.
    pub fn join(
        &self,
        connection: ConnectionId,
        identity: IdentityId,
        sender: UnboundedSender<DeliveryEvent>,
    ) {
        if let Some(previous) = self.by_connection.insert(connection, identity) {
            if previous != identity {
                self.remove_from_room(previous, connection);
            }
        }
        self.rooms
            .entry(identity)
            .or_default()
            .insert(connection, sender);

        debug!(connection, identity = %identity, "joined delivery room");
    }

    /// Drop a connection from whatever room it joined.
    ///
    /// Safe to call for connections that never joined.
    pub fn leave(&self, connection: ConnectionId) {
        if let Some((_, identity)) = self.by_connection.remove(&connection) {
            self.remove_from_room(identity, connection);
            debug!(connection, identity = %identity, "left delivery room");
        }
    }

    /// Push an event to every connection in an identity's room.
    ///
    /// Returns how many connections received it. Senders whose receiving
    /// task is gone are evicted here.
    pub fn notify(&self, identity: IdentityId, event: DeliveryEvent) -> usize {
        let Some(mut room) = self.rooms.get_mut(&identity) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (connection, sender) in room.iter() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*connection);
            }
        }
        for connection in &dead {
            room.remove(connection);
        }
        drop(room);

        for connection in dead {
            self.by_connection.remove(&connection);
            debug!(connection, identity = %identity, "evicted dead delivery connection");
        }

        debug!(identity = %identity, delivered, "delivery fan-out");
        delivered
    }

    /// Number of live connections in an identity's room.
    pub fn room_size(&self, identity: IdentityId) -> usize {
        self.rooms.get(&identity).map_or(0, |room| room.len())
    }

    /// Total connections bound to any room.
    pub fn connection_count(&self) -> usize {
        self.by_connection.len()
    }

    fn remove_from_room(&self, identity: IdentityId, connection: ConnectionId) {
        if let Some(mut room) = self.rooms.get_mut(&identity) {
            room.remove(&connection);
            let empty = room.is_empty();
            drop(room);
            if empty {
                self.rooms.remove_if(&identity, |_, room| room.is_empty());
            }
        }
    }
}
