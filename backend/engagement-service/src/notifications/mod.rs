/// Real-time notification delivery
///
/// 1. NotificationHub: recipient -> live connection handles, fan-out publish
/// 2. Message types: the NotificationEvent payload and its WebSocket envelope
pub mod hub;
pub mod messages;

pub use hub::{ConnectionId, NotificationHub};
pub use messages::{NotificationEvent, NotificationSender, WsServerMessage};
