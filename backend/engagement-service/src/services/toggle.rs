/// Toggle Coordinator
///
/// Atomic toggle-on/toggle-off over the relation ledger: insert if absent,
/// delete if present. Conflicts from racing toggles on the same tuple are
/// resolved here and never surfaced to callers.
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::RelationKind;
use crate::error::{AppError, Result};
use crate::notifications::{NotificationEvent, NotificationHub};
use crate::repository::{ContentStore, RelationLedger};

/// Two racing togglers settle within one retry; the bound only guards
/// against pathological interleavings.
const MAX_TOGGLE_ATTEMPTS: usize = 4;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToggleOutcome {
    pub created: bool,
}

#[derive(Clone)]
pub struct ToggleCoordinator {
    ledger: Arc<dyn RelationLedger>,
    content: Arc<dyn ContentStore>,
    hub: NotificationHub,
}

impl ToggleCoordinator {
    pub fn new(
        ledger: Arc<dyn RelationLedger>,
        content: Arc<dyn ContentStore>,
        hub: NotificationHub,
    ) -> Self {
        Self {
            ledger,
            content,
            hub,
        }
    }

    /// Flip the relation for (actor, target, kind).
    ///
    /// Returns `created = true` when this call brought the relation into
    /// existence, `created = false` when it removed one.
    pub async fn toggle(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<ToggleOutcome> {
        if kind == RelationKind::Subscription && actor_id == target_id {
            return Err(AppError::InvalidOperation(
                "you cannot subscribe to your own channel".to_string(),
            ));
        }

        self.ensure_target_exists(target_id, kind).await?;

        for attempt in 1..=MAX_TOGGLE_ATTEMPTS {
            match self.ledger.insert(actor_id, target_id, kind).await {
                Ok(_) => {
                    if kind == RelationKind::Subscription {
                        self.notify_subscription(actor_id, target_id).await;
                    }
                    return Ok(ToggleOutcome { created: true });
                }
                Err(AppError::Conflict(_)) => {
                    if self
                        .ledger
                        .delete_if_exists(actor_id, target_id, kind)
                        .await?
                    {
                        return Ok(ToggleOutcome { created: false });
                    }
                    // A concurrent toggle deleted the row between our insert
                    // and delete; take the insert path again.
                    tracing::debug!(
                        actor_id = %actor_id,
                        target_id = %target_id,
                        kind = kind.as_str(),
                        attempt,
                        "toggle lost delete race, retrying insert"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(AppError::Internal(format!(
            "toggle did not settle: actor={} target={} kind={}",
            actor_id,
            target_id,
            kind.as_str()
        )))
    }

    /// The target must reference an existing entity of the kind's expected
    /// type.
    async fn ensure_target_exists(&self, target_id: Uuid, kind: RelationKind) -> Result<()> {
        let found = match kind {
            RelationKind::LikeVideo => self.content.video_exists(target_id).await?,
            RelationKind::LikeComment => self.content.comment_exists(target_id).await?,
            RelationKind::LikeTweet => self.content.tweet_exists(target_id).await?,
            RelationKind::Subscription => self.content.user_profile(target_id).await?.is_some(),
        };

        if found {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "target {} not found for kind {}",
                target_id,
                kind.as_str()
            )))
        }
    }

    /// Best-effort push to the channel owner's live connections. Failures
    /// are logged and swallowed; they never fail or delay the toggle.
    async fn notify_subscription(&self, actor_id: Uuid, channel_id: Uuid) {
        let profile = match self.content.user_profile(actor_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(
                    actor_id = %actor_id,
                    channel_id = %channel_id,
                    error = %err,
                    "skipping subscription notification, sender profile lookup failed"
                );
                return;
            }
        };

        let event = NotificationEvent::subscription(&profile, channel_id);
        let delivered = self.hub.publish(channel_id, event).await;
        tracing::debug!(
            channel_id = %channel_id,
            delivered,
            "subscription notification published"
        );
    }
}
