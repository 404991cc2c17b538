use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of engagement relation, stored as a closed tag.
///
/// The kind is always explicit; it is never inferred from which reference
/// happens to be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "relation_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    LikeVideo,
    LikeComment,
    LikeTweet,
    Subscription,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::LikeVideo => "like_video",
            RelationKind::LikeComment => "like_comment",
            RelationKind::LikeTweet => "like_tweet",
            RelationKind::Subscription => "subscription",
        }
    }
}

/// A single toggle-style fact linking an actor to a target.
///
/// At most one relation exists per (actor_id, target_id, kind) tuple.
/// Relations are created and deleted by the toggle path, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Relation {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub target_id: Uuid,
    pub kind: RelationKind,
    pub created_at: DateTime<Utc>,
}

/// Public profile fields of a user/channel owner.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

/// A video row as the content store holds it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Minimal per-video slice used by the stats rollup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoRollup {
    pub id: Uuid,
    pub views: i64,
}

/// A video projected with its owner's public profile, as listings return it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_secs: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: OwnerProfile,
}

impl FeedEntry {
    pub fn from_parts(video: VideoRecord, owner: OwnerProfile) -> Self {
        Self {
            id: video.id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration_secs: video.duration_secs,
            views: video.views,
            is_published: video.is_published,
            created_at: video.created_at,
            owner,
        }
    }
}

/// Derived channel statistics, recomputed on demand and never cached here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub subscriber_count: i64,
    pub video_count: i64,
    pub total_views: i64,
    pub total_likes: i64,
}

/// A subscription listing row joined with the counterpart's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub profile: OwnerProfile,
    pub subscribed_at: DateTime<Utc>,
}

/// Offset-paginated result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        // Query planning rejects page_size < 1; guard anyway so a direct
        // caller cannot divide by zero
        let total_pages = if total_items == 0 || page_size == 0 {
            0
        } else {
            (total_items + page_size as i64 - 1) / page_size as i64
        };
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_kind_tags() {
        assert_eq!(RelationKind::LikeVideo.as_str(), "like_video");
        assert_eq!(RelationKind::Subscription.as_str(), "subscription");

        let json = serde_json::to_string(&RelationKind::LikeComment).unwrap();
        assert_eq!(json, "\"like_comment\"");
    }

    #[test]
    fn test_page_totals() {
        let page = Page::new(vec![1, 2], 1, 2, 5);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], 1, 10, 0);
        assert_eq!(empty.total_pages, 0);

        let degenerate: Page<i32> = Page::new(vec![], 1, 0, 5);
        assert_eq!(degenerate.total_pages, 0);
    }
}
