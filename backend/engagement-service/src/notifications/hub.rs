/// Notification Hub
///
/// In-memory pub/sub keyed by recipient identity. Each WebSocket session
/// registers one connection handle; publishing fans out to every live handle
/// for the recipient and is a silent no-op when none exist. Delivery is
/// at-most-once and non-durable: no buffering, no queueing, no retries.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::messages::{NotificationEvent, WsServerMessage};

/// Unique identifier for one connection handle.
///
/// A recipient with several open sessions holds several handles; the id lets
/// disconnect paths remove exactly their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

struct Connection {
    id: ConnectionId,
    sender: UnboundedSender<WsServerMessage>,
}

/// Process-wide map of recipient -> live connection handles.
///
/// Owned by the composition root and injected into whatever needs to
/// publish; there is no global instance.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<RwLock<HashMap<Uuid, Vec<Connection>>>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection handle for a recipient.
    ///
    /// Returns the handle id (needed for cleanup) and the receiving half the
    /// session drains.
    pub async fn subscribe(
        &self,
        recipient_id: Uuid,
    ) -> (ConnectionId, UnboundedReceiver<WsServerMessage>) {
        let (tx, rx) = unbounded_channel();
        let connection_id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        guard.entry(recipient_id).or_default().push(Connection {
            id: connection_id,
            sender: tx,
        });

        tracing::debug!(
            recipient_id = %recipient_id,
            connections = guard.get(&recipient_id).map(|v| v.len()).unwrap_or(0),
            "notification hub subscribed"
        );

        (connection_id, rx)
    }

    /// Remove one connection handle. Must run on every disconnect path,
    /// whatever the cause.
    pub async fn unsubscribe(&self, recipient_id: Uuid, connection_id: ConnectionId) {
        let mut guard = self.inner.write().await;

        if let Some(connections) = guard.get_mut(&recipient_id) {
            connections.retain(|c| c.id != connection_id);
            if connections.is_empty() {
                guard.remove(&recipient_id);
            }
        }
    }

    /// Fan a notification out to every live handle for the recipient.
    ///
    /// Non-blocking: each handle gets one unbounded send. Handles whose
    /// receiver is gone are pruned on the spot. Returns the number of
    /// handles the event was delivered to; zero handles is not an error.
    pub async fn publish(&self, recipient_id: Uuid, event: NotificationEvent) -> usize {
        let message = WsServerMessage::notification(event);

        let mut guard = self.inner.write().await;
        let Some(connections) = guard.get_mut(&recipient_id) else {
            return 0;
        };

        let mut delivered = 0;
        connections.retain(|c| match c.sender.send(message.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(_) => false,
        });

        if connections.is_empty() {
            guard.remove(&recipient_id);
        }

        delivered
    }

    /// Number of live handles for one recipient.
    pub async fn connection_count(&self, recipient_id: Uuid) -> usize {
        let guard = self.inner.read().await;
        guard.get(&recipient_id).map(|v| v.len()).unwrap_or(0)
    }

    /// Total live handles across all recipients.
    pub async fn total_connections(&self) -> usize {
        let guard = self.inner.read().await;
        guard.values().map(|v| v.len()).sum()
    }

    /// Number of recipients with at least one live handle.
    pub async fn connected_recipients(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }
}
