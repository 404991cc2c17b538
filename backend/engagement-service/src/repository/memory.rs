/// In-memory stores for local development and the integration suites.
///
/// A single RwLock guards each store, which makes insert/delete on the same
/// tuple mutually exclusive. This is the same per-tuple serializability the
/// Postgres backend gets from its unique constraint, just coarser.
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    FeedEntry, OwnerProfile, Page, Relation, RelationKind, VideoRecord, VideoRollup,
};
use crate::error::{AppError, Result};
use crate::repository::{ContentStore, RelationLedger, SortField, SortOrder, VideoQuery};

struct StoredRelation {
    relation: Relation,
    /// Monotonic insertion counter; breaks created_at ties for newest-first
    /// ordering when inserts land within the same clock tick.
    seq: u64,
}

#[derive(Default)]
struct LedgerState {
    rows: HashMap<(Uuid, Uuid, RelationKind), StoredRelation>,
    next_seq: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryRelationLedger {
    inner: Arc<RwLock<LedgerState>>,
}

impl InMemoryRelationLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelationLedger for InMemoryRelationLedger {
    async fn insert(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Relation> {
        let mut state = self.inner.write().await;

        let key = (actor_id, target_id, kind);
        if state.rows.contains_key(&key) {
            return Err(AppError::Conflict(format!(
                "relation exists: actor={} target={} kind={}",
                actor_id,
                target_id,
                kind.as_str()
            )));
        }

        let relation = Relation {
            id: Uuid::new_v4(),
            actor_id,
            target_id,
            kind,
            created_at: Utc::now(),
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.rows.insert(
            key,
            StoredRelation {
                relation: relation.clone(),
                seq,
            },
        );

        Ok(relation)
    }

    async fn delete_if_exists(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<bool> {
        let mut state = self.inner.write().await;
        Ok(state.rows.remove(&(actor_id, target_id, kind)).is_some())
    }

    async fn exists(&self, actor_id: Uuid, target_id: Uuid, kind: RelationKind) -> Result<bool> {
        let state = self.inner.read().await;
        Ok(state.rows.contains_key(&(actor_id, target_id, kind)))
    }

    async fn count_for_target(&self, target_id: Uuid, kind: RelationKind) -> Result<i64> {
        let state = self.inner.read().await;
        Ok(state
            .rows
            .values()
            .filter(|s| s.relation.target_id == target_id && s.relation.kind == kind)
            .count() as i64)
    }

    async fn count_for_targets(&self, target_ids: &[Uuid], kind: RelationKind) -> Result<i64> {
        let targets: HashSet<Uuid> = target_ids.iter().copied().collect();
        let state = self.inner.read().await;
        Ok(state
            .rows
            .values()
            .filter(|s| s.relation.kind == kind && targets.contains(&s.relation.target_id))
            .count() as i64)
    }

    async fn relations_by_actor(
        &self,
        actor_id: Uuid,
        kind: RelationKind,
    ) -> Result<Vec<Relation>> {
        let state = self.inner.read().await;
        let mut rows: Vec<_> = state
            .rows
            .values()
            .filter(|s| s.relation.actor_id == actor_id && s.relation.kind == kind)
            .collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(rows.into_iter().map(|s| s.relation.clone()).collect())
    }

    async fn relations_by_target(
        &self,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Vec<Relation>> {
        let state = self.inner.read().await;
        let mut rows: Vec<_> = state
            .rows
            .values()
            .filter(|s| s.relation.target_id == target_id && s.relation.kind == kind)
            .collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(rows.into_iter().map(|s| s.relation.clone()).collect())
    }
}

#[derive(Default)]
struct ContentState {
    users: HashMap<Uuid, OwnerProfile>,
    videos: HashMap<Uuid, VideoRecord>,
    comments: HashSet<Uuid>,
    tweets: HashSet<Uuid>,
}

#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    inner: Arc<RwLock<ContentState>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, profile: OwnerProfile) {
        self.inner.write().await.users.insert(profile.id, profile);
    }

    pub async fn insert_video(&self, video: VideoRecord) {
        self.inner.write().await.videos.insert(video.id, video);
    }

    pub async fn insert_comment(&self, comment_id: Uuid) {
        self.inner.write().await.comments.insert(comment_id);
    }

    pub async fn insert_tweet(&self, tweet_id: Uuid) {
        self.inner.write().await.tweets.insert(tweet_id);
    }

    /// Simulates an upstream deletion; relations pointing at the video stay
    /// in the ledger and get filtered at read time.
    pub async fn remove_video(&self, video_id: Uuid) {
        self.inner.write().await.videos.remove(&video_id);
    }
}

fn matches(video: &VideoRecord, query: &VideoQuery) -> bool {
    if query.published_only && !video.is_published {
        return false;
    }
    if let Some(owner_id) = query.owner_id {
        if video.owner_id != owner_id {
            return false;
        }
    }
    if let Some(search) = &query.search {
        let needle = search.to_lowercase();
        if !video.title.to_lowercase().contains(&needle)
            && !video.description.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

fn compare(a: &VideoRecord, b: &VideoRecord, field: SortField, order: SortOrder) -> Ordering {
    let primary = match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Views => a.views.cmp(&b.views),
        SortField::Duration => a.duration_secs.total_cmp(&b.duration_secs),
    };
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<OwnerProfile>> {
        let state = self.inner.read().await;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, OwnerProfile>> {
        let state = self.inner.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    async fn video_exists(&self, video_id: Uuid) -> Result<bool> {
        Ok(self.inner.read().await.videos.contains_key(&video_id))
    }

    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool> {
        Ok(self.inner.read().await.comments.contains(&comment_id))
    }

    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool> {
        Ok(self.inner.read().await.tweets.contains(&tweet_id))
    }

    async fn video_rollup_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRollup>> {
        let state = self.inner.read().await;
        Ok(state
            .videos
            .values()
            .filter(|v| v.owner_id == owner_id)
            .map(|v| VideoRollup {
                id: v.id,
                views: v.views,
            })
            .collect())
    }

    async fn feed_entries_by_ids(
        &self,
        video_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, FeedEntry>> {
        let state = self.inner.read().await;
        let mut entries = HashMap::new();
        for id in video_ids {
            let Some(video) = state.videos.get(id) else {
                continue;
            };
            let Some(owner) = state.users.get(&video.owner_id) else {
                continue;
            };
            entries.insert(*id, FeedEntry::from_parts(video.clone(), owner.clone()));
        }
        Ok(entries)
    }

    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<FeedEntry>> {
        let state = self.inner.read().await;

        let mut rows: Vec<&VideoRecord> = state
            .videos
            .values()
            .filter(|v| matches(v, query))
            .collect();
        rows.sort_by(|a, b| compare(a, b, query.sort_field, query.sort_order));

        let total = rows.len() as i64;
        let items = rows
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .filter_map(|video| {
                state
                    .users
                    .get(&video.owner_id)
                    .map(|owner| FeedEntry::from_parts(video.clone(), owner.clone()))
            })
            .collect();

        Ok(Page::new(items, query.page, query.page_size, total))
    }
}
