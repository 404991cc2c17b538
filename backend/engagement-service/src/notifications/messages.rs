/// Message types for real-time notification delivery
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::OwnerProfile;

pub const EVENT_SUBSCRIPTION: &str = "subscription";

/// Public profile slice attached to an outgoing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSender {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

/// An ephemeral notification.
///
/// Delivered at most once to currently-connected recipients and lost
/// otherwise; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: String,
    pub sender: NotificationSender,
    pub recipient_id: Uuid,
}

impl NotificationEvent {
    /// Notification sent to a channel owner on a new subscription.
    pub fn subscription(sender: &OwnerProfile, recipient_id: Uuid) -> Self {
        Self {
            event_type: EVENT_SUBSCRIPTION.to_string(),
            message: format!("{} subscribed to your channel!", sender.username),
            sender: NotificationSender {
                id: sender.id,
                display_name: sender.username.clone(),
                avatar_url: sender.avatar_url.clone(),
            },
            recipient_id,
        }
    }
}

/// Server-to-client WebSocket envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// A notification pushed to the recipient's live connections
    NotificationReceived(NotificationEvent),

    /// Connection established confirmation
    Connected { timestamp: i64 },

    /// Heartbeat from the server
    Ping { timestamp: i64 },

    /// Client response to a ping
    Pong { timestamp: i64 },
}

impl WsServerMessage {
    pub fn notification(event: NotificationEvent) -> Self {
        WsServerMessage::NotificationReceived(event)
    }

    pub fn connected() -> Self {
        WsServerMessage::Connected {
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn ping() -> Self {
        WsServerMessage::Ping {
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn pong(timestamp: i64) -> Self {
        WsServerMessage::Pong { timestamp }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
