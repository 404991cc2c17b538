/// Storage contracts for the engagement core.
///
/// Two backends implement these traits: `postgres` for production and
/// `memory` for local development and the integration suites.
pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{FeedEntry, OwnerProfile, Page, Relation, RelationKind, VideoRollup};
use crate::error::Result;

/// Whitelisted sort fields for video listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Views,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A validated, normalized video listing plan.
///
/// Built by the feed query planner; executed verbatim by a content store.
#[derive(Debug, Clone)]
pub struct VideoQuery {
    /// Case-insensitive substring match against title/description
    pub search: Option<String>,
    /// Restrict to a single owner
    pub owner_id: Option<Uuid>,
    /// Only rows with is_published = true
    pub published_only: bool,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl VideoQuery {
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }
}

/// Durable store of actor -> target toggle relations.
///
/// `insert` and `delete_if_exists` must be atomic with respect to each other
/// for the same (actor_id, target_id, kind) tuple; operations on different
/// tuples proceed in parallel.
#[async_trait]
pub trait RelationLedger: Send + Sync {
    /// Insert a relation; fails with `AppError::Conflict` if the tuple
    /// already exists.
    async fn insert(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Relation>;

    /// Delete the relation if present; returns true when a row was removed.
    async fn delete_if_exists(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<bool>;

    /// Check whether the tuple exists.
    async fn exists(&self, actor_id: Uuid, target_id: Uuid, kind: RelationKind) -> Result<bool>;

    /// Count relations of a kind pointing at a single target.
    async fn count_for_target(&self, target_id: Uuid, kind: RelationKind) -> Result<i64>;

    /// Count relations of a kind pointing at any of the given targets.
    async fn count_for_targets(&self, target_ids: &[Uuid], kind: RelationKind) -> Result<i64>;

    /// Relations created by an actor under a kind, newest first.
    async fn relations_by_actor(&self, actor_id: Uuid, kind: RelationKind)
        -> Result<Vec<Relation>>;

    /// Relations pointing at a target under a kind, newest first.
    async fn relations_by_target(
        &self,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Vec<Relation>>;
}

/// Read-only window onto the external content and profile stores.
///
/// The engagement core never mutates content through this interface.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a user's public profile.
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<OwnerProfile>>;

    /// Batch-resolve public profiles; absent users are simply missing from
    /// the result map.
    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, OwnerProfile>>;

    async fn video_exists(&self, video_id: Uuid) -> Result<bool>;

    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool>;

    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool>;

    /// (id, views) rollup of every video owned by `owner_id`.
    async fn video_rollup_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRollup>>;

    /// Resolve videos (with owner profile joined) by id; videos that no
    /// longer exist are simply missing from the result map.
    async fn feed_entries_by_ids(&self, video_ids: &[Uuid])
        -> Result<HashMap<Uuid, FeedEntry>>;

    /// Execute a validated listing plan: filter, sort, paginate.
    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<FeedEntry>>;
}
