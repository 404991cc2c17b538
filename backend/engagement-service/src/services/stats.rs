/// Aggregation Engine
///
/// Read-only consumer of the relation ledger and content store. Results are
/// computed fresh per call; aggregations take no locks, so a toggle landing
/// mid-computation may appear on either side (read-committed is enough).
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{ChannelStats, FeedEntry, RelationKind, SubscriptionEntry};
use crate::error::{AppError, Result};
use crate::repository::{ContentStore, RelationLedger};

#[derive(Clone)]
pub struct AggregationEngine {
    ledger: Arc<dyn RelationLedger>,
    content: Arc<dyn ContentStore>,
}

impl AggregationEngine {
    pub fn new(ledger: Arc<dyn RelationLedger>, content: Arc<dyn ContentStore>) -> Self {
        Self { ledger, content }
    }

    /// Derived statistics for a channel owner.
    ///
    /// Staged computation: subscriber count from the ledger, then the
    /// owner's video rollup, then like totals over exactly that video set,
    /// so no video is counted twice. An owner with no videos or subscribers
    /// yields zero-valued stats; only an unresolvable owner is an error.
    pub async fn channel_stats(&self, owner_id: Uuid) -> Result<ChannelStats> {
        if self.content.user_profile(owner_id).await?.is_none() {
            return Err(AppError::NotComputable(format!(
                "owner {} cannot be resolved",
                owner_id
            )));
        }

        let subscriber_count = self
            .ledger
            .count_for_target(owner_id, RelationKind::Subscription)
            .await?;

        let rollup = self.content.video_rollup_for_owner(owner_id).await?;
        let video_count = rollup.len() as i64;
        let total_views: i64 = rollup.iter().map(|v| v.views).sum();

        let video_ids: Vec<Uuid> = rollup.iter().map(|v| v.id).collect();
        let total_likes = self
            .ledger
            .count_for_targets(&video_ids, RelationKind::LikeVideo)
            .await?;

        Ok(ChannelStats {
            subscriber_count,
            video_count,
            total_views,
            total_likes,
        })
    }

    /// Videos the actor has liked, newest like first.
    ///
    /// Likes whose video no longer exists are silently dropped. Deleting a
    /// target does not cascade into the ledger, so stale relations are
    /// filtered at read time.
    pub async fn liked_videos(&self, actor_id: Uuid) -> Result<Vec<FeedEntry>> {
        let relations = self
            .ledger
            .relations_by_actor(actor_id, RelationKind::LikeVideo)
            .await?;

        let video_ids: Vec<Uuid> = relations.iter().map(|r| r.target_id).collect();
        let mut entries = self.content.feed_entries_by_ids(&video_ids).await?;

        Ok(relations
            .iter()
            .filter_map(|r| entries.remove(&r.target_id))
            .collect())
    }

    /// Who subscribes to a channel, newest first, with public profiles.
    pub async fn channel_subscribers(&self, channel_id: Uuid) -> Result<Vec<SubscriptionEntry>> {
        let relations = self
            .ledger
            .relations_by_target(channel_id, RelationKind::Subscription)
            .await?;

        let subscriber_ids: Vec<Uuid> = relations.iter().map(|r| r.actor_id).collect();
        let profiles = self.content.user_profiles(&subscriber_ids).await?;

        Ok(relations
            .iter()
            .filter_map(|r| {
                profiles.get(&r.actor_id).map(|profile| SubscriptionEntry {
                    profile: profile.clone(),
                    subscribed_at: r.created_at,
                })
            })
            .collect())
    }

    /// Which channels a user subscribes to, newest first, with profiles.
    pub async fn subscribed_channels(&self, user_id: Uuid) -> Result<Vec<SubscriptionEntry>> {
        let relations = self
            .ledger
            .relations_by_actor(user_id, RelationKind::Subscription)
            .await?;

        let channel_ids: Vec<Uuid> = relations.iter().map(|r| r.target_id).collect();
        let profiles = self.content.user_profiles(&channel_ids).await?;

        Ok(relations
            .iter()
            .filter_map(|r| {
                profiles.get(&r.target_id).map(|profile| SubscriptionEntry {
                    profile: profile.clone(),
                    subscribed_at: r.created_at,
                })
            })
            .collect())
    }
}
