/// Postgres-backed stores.
///
/// Tuple uniqueness is enforced by the relations table's
/// UNIQUE (actor_id, target_id, kind) constraint, so concurrent toggles on
/// the same tuple serialize inside the database.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{FeedEntry, OwnerProfile, Page, Relation, RelationKind, VideoRollup};
use crate::error::{AppError, Result};
use crate::repository::{ContentStore, RelationLedger, SortField, SortOrder, VideoQuery};

#[derive(Clone)]
pub struct PgRelationLedger {
    pool: PgPool,
}

impl PgRelationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationLedger for PgRelationLedger {
    async fn insert(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Relation> {
        let inserted = sqlx::query_as::<_, Relation>(
            r#"
            INSERT INTO relations (id, actor_id, target_id, kind, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (actor_id, target_id, kind) DO NOTHING
            RETURNING id, actor_id, target_id, kind, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(actor_id)
        .bind(target_id)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| {
            AppError::Conflict(format!(
                "relation exists: actor={} target={} kind={}",
                actor_id,
                target_id,
                kind.as_str()
            ))
        })
    }

    async fn delete_if_exists(
        &self,
        actor_id: Uuid,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM relations
            WHERE actor_id = $1 AND target_id = $2 AND kind = $3
            "#,
        )
        .bind(actor_id)
        .bind(target_id)
        .bind(kind)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    async fn exists(&self, actor_id: Uuid, target_id: Uuid, kind: RelationKind) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM relations
                WHERE actor_id = $1 AND target_id = $2 AND kind = $3
            )
            "#,
        )
        .bind(actor_id)
        .bind(target_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn count_for_target(&self, target_id: Uuid, kind: RelationKind) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM relations
            WHERE target_id = $1 AND kind = $2
            "#,
        )
        .bind(target_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn count_for_targets(&self, target_ids: &[Uuid], kind: RelationKind) -> Result<i64> {
        if target_ids.is_empty() {
            return Ok(0);
        }

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM relations
            WHERE kind = $1 AND target_id = ANY($2)
            "#,
        )
        .bind(kind)
        .bind(target_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn relations_by_actor(
        &self,
        actor_id: Uuid,
        kind: RelationKind,
    ) -> Result<Vec<Relation>> {
        let relations = sqlx::query_as::<_, Relation>(
            r#"
            SELECT id, actor_id, target_id, kind, created_at
            FROM relations
            WHERE actor_id = $1 AND kind = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(actor_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(relations)
    }

    async fn relations_by_target(
        &self,
        target_id: Uuid,
        kind: RelationKind,
    ) -> Result<Vec<Relation>> {
        let relations = sqlx::query_as::<_, Relation>(
            r#"
            SELECT id, actor_id, target_id, kind, created_at
            FROM relations
            WHERE target_id = $1 AND kind = $2
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(target_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(relations)
    }
}

/// Flat row shape for feed listings before the owner profile is nested.
#[derive(sqlx::FromRow)]
struct FeedRow {
    id: Uuid,
    title: String,
    description: String,
    video_url: String,
    thumbnail_url: String,
    duration_secs: f64,
    views: i64,
    is_published: bool,
    created_at: DateTime<Utc>,
    owner_id: Uuid,
    username: String,
    full_name: String,
    avatar_url: Option<String>,
}

impl From<FeedRow> for FeedEntry {
    fn from(row: FeedRow) -> Self {
        FeedEntry {
            id: row.id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            duration_secs: row.duration_secs,
            views: row.views,
            is_published: row.is_published,
            created_at: row.created_at,
            owner: OwnerProfile {
                id: row.owner_id,
                username: row.username,
                full_name: row.full_name,
                avatar_url: row.avatar_url,
            },
        }
    }
}

const FEED_SELECT: &str = r#"
    SELECT v.id, v.title, v.description, v.video_url, v.thumbnail_url,
           v.duration_secs, v.views, v.is_published, v.created_at,
           u.id AS owner_id, u.username, u.full_name, u.avatar_url
    FROM videos v
    JOIN users u ON u.id = v.owner_id
"#;

const FEED_FILTERS: &str = r#"
    WHERE ($1::text IS NULL
           OR v.title ILIKE '%' || $1 || '%'
           OR v.description ILIKE '%' || $1 || '%')
      AND ($2::uuid IS NULL OR v.owner_id = $2)
      AND (NOT $3 OR v.is_published)
"#;

/// Escape LIKE metacharacters so the search term matches as a literal
/// substring, the same semantics the in-memory backend's `contains` gives.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn order_clause(field: SortField, order: SortOrder) -> String {
    let column = match field {
        SortField::CreatedAt => "v.created_at",
        SortField::Views => "v.views",
        SortField::Duration => "v.duration_secs",
    };
    let direction = match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    // created_at/id keep pagination stable when the primary key has duplicates
    let mut clause = format!("ORDER BY {} {}", column, direction);
    if field != SortField::CreatedAt {
        clause.push_str(", v.created_at DESC");
    }
    clause.push_str(", v.id DESC");
    clause
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn user_profile(&self, user_id: Uuid) -> Result<Option<OwnerProfile>> {
        let profile = sqlx::query_as::<_, OwnerProfile>(
            r#"
            SELECT id, username, full_name, avatar_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn user_profiles(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, OwnerProfile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, OwnerProfile>(
            r#"
            SELECT id, username, full_name, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn video_exists(&self, video_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM videos WHERE id = $1)"#)
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn comment_exists(&self, comment_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM comments WHERE id = $1)"#)
                .bind(comment_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn tweet_exists(&self, tweet_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM tweets WHERE id = $1)"#)
                .bind(tweet_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn video_rollup_for_owner(&self, owner_id: Uuid) -> Result<Vec<VideoRollup>> {
        let rollup = sqlx::query_as::<_, VideoRollup>(
            r#"
            SELECT id, views
            FROM videos
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rollup)
    }

    async fn feed_entries_by_ids(
        &self,
        video_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, FeedEntry>> {
        if video_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!("{} WHERE v.id = ANY($1)", FEED_SELECT);
        let rows = sqlx::query_as::<_, FeedRow>(&sql)
            .bind(video_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(FeedEntry::from)
            .map(|e| (e.id, e))
            .collect())
    }

    async fn query_videos(&self, query: &VideoQuery) -> Result<Page<FeedEntry>> {
        let count_sql = format!(
            "SELECT COUNT(*) FROM videos v JOIN users u ON u.id = v.owner_id {}",
            FEED_FILTERS
        );
        let search = query.search.as_deref().map(escape_like);

        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(search.as_deref())
            .bind(query.owner_id)
            .bind(query.published_only)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = format!(
            "{} {} {} LIMIT $4 OFFSET $5",
            FEED_SELECT,
            FEED_FILTERS,
            order_clause(query.sort_field, query.sort_order)
        );
        let rows = sqlx::query_as::<_, FeedRow>(&page_sql)
            .bind(search.as_deref())
            .bind(query.owner_id)
            .bind(query.published_only)
            .bind(query.page_size as i64)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(FeedEntry::from).collect();

        Ok(Page::new(items, query.page, query.page_size, total))
    }
}
