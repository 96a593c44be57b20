//! Connection Registry
//!
//! Tracks the outbound side of every open duplex connection. The
//! WebSocket task owns the socket; the registry only holds a channel
//! sender per connection, so a snapshot can be sent to without holding
//! the lock.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::domain::incident::Envelope;

/// Identity assigned to a connection at accept time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound half of a registered connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ConnectionHandle {
    /// Queue an envelope for the connection's writer
    ///
    /// Returns `false` when the connection is already gone.
    pub fn send(&self, envelope: Envelope) -> bool {
        self.tx.send(envelope).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Set of currently open connections
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly accepted connection by its outbound channel
    pub async fn register(&self, tx: mpsc::UnboundedSender<Envelope>) -> ConnectionId {
        let id = ConnectionId::new();
        let mut conns = self.connections.write().await;
        conns.insert(id, ConnectionHandle { id, tx });
        debug!(conn_id = %id, total = conns.len(), "Connection registered");
        id
    }

    /// Remove a connection; unknown or already removed ids are ignored
    pub async fn unregister(&self, id: ConnectionId) {
        let mut conns = self.connections.write().await;
        if conns.remove(&id).is_some() {
            debug!(conn_id = %id, total = conns.len(), "Connection unregistered");
        }
    }

    /// Handle for a single connection, if it is still registered
    pub async fn get(&self, id: ConnectionId) -> Option<ConnectionHandle> {
        self.connections.read().await.get(&id).cloned()
    }

    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&id)
    }

    /// Copy of the current connection set
    ///
    /// The copy is detached from the registry: connections registered
    /// later are not in it, and a handle in it that closes afterwards
    /// simply fails its next send.
    pub async fn snapshot(&self) -> Vec<ConnectionHandle> {
        self.connections.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Drop every connection (router shutdown)
    pub async fn clear(&self) {
        let mut conns = self.connections.write().await;
        debug!(total = conns.len(), "Clearing connection registry");
        conns.clear();
    }
}
