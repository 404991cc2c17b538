/// Feed Query Planner
///
/// Validates raw listing parameters and normalizes them into a `VideoQuery`
/// plan the content store executes. Independent of the relation subsystem.
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{FeedEntry, Page};
use crate::error::{AppError, Result};
use crate::repository::{ContentStore, SortField, SortOrder, VideoQuery};

/// Raw query parameters for video listings
#[derive(Debug, Clone, Deserialize)]
pub struct VideoListingParams {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size", alias = "limit")]
    pub page_size: u32,

    /// Free-text match against title/description
    #[serde(default, alias = "q")]
    pub query: Option<String>,

    /// Restrict to one owner's videos
    #[serde(default, alias = "user_id")]
    pub owner_id: Option<Uuid>,

    /// One of: created_at, views, duration
    #[serde(default)]
    pub sort_by: Option<String>,

    /// asc or desc
    #[serde(default)]
    pub sort_order: Option<String>,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl Default for VideoListingParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            query: None,
            owner_id: None,
            sort_by: None,
            sort_order: None,
        }
    }
}

#[derive(Clone)]
pub struct FeedQueryPlanner {
    content: Arc<dyn ContentStore>,
}

impl FeedQueryPlanner {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }

    /// Public listing: the published-only filter is always enforced.
    pub async fn public_videos(&self, params: &VideoListingParams) -> Result<Page<FeedEntry>> {
        let query = build_query(params, params.owner_id, true)?;
        self.content.query_videos(&query).await
    }

    /// Dashboard listing: scoped to the caller's own videos, unpublished
    /// included.
    pub async fn dashboard_videos(
        &self,
        owner_id: Uuid,
        params: &VideoListingParams,
    ) -> Result<Page<FeedEntry>> {
        let query = build_query(params, Some(owner_id), false)?;
        self.content.query_videos(&query).await
    }
}

fn build_query(
    params: &VideoListingParams,
    owner_id: Option<Uuid>,
    published_only: bool,
) -> Result<VideoQuery> {
    if params.page < 1 {
        return Err(AppError::InvalidArgument("page must be >= 1".to_string()));
    }
    if params.page_size < 1 {
        return Err(AppError::InvalidArgument(
            "page_size must be >= 1".to_string(),
        ));
    }

    let sort_field = match params.sort_by.as_deref() {
        None | Some("created_at") | Some("createdAt") => SortField::CreatedAt,
        Some("views") => SortField::Views,
        Some("duration") => SortField::Duration,
        Some(other) => {
            return Err(AppError::InvalidArgument(format!(
                "unsupported sort field: {}",
                other
            )))
        }
    };

    let sort_order = match params.sort_order.as_deref() {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(other) => {
            return Err(AppError::InvalidArgument(format!(
                "unsupported sort order: {}",
                other
            )))
        }
    };

    let search = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(VideoQuery {
        search,
        owner_id,
        published_only,
        sort_field,
        sort_order,
        page: params.page,
        page_size: params.page_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = VideoListingParams::default();
        let query = build_query(&params, None, true).unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort_field, SortField::CreatedAt);
        assert_eq!(query.sort_order, SortOrder::Desc);
        assert!(query.published_only);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_rejects_bad_pagination() {
        let params = VideoListingParams {
            page: 0,
            ..Default::default()
        };
        assert!(matches!(
            build_query(&params, None, true),
            Err(AppError::InvalidArgument(_))
        ));

        let params = VideoListingParams {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            build_query(&params, None, true),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_sort() {
        let params = VideoListingParams {
            sort_by: Some("owner_id".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_query(&params, None, true),
            Err(AppError::InvalidArgument(_))
        ));

        let params = VideoListingParams {
            sort_order: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            build_query(&params, None, true),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_blank_search_dropped() {
        let params = VideoListingParams {
            query: Some("   ".to_string()),
            ..Default::default()
        };
        let query = build_query(&params, None, true).unwrap();
        assert!(query.search.is_none());
    }

    #[test]
    fn test_offset_math() {
        let params = VideoListingParams {
            page: 3,
            page_size: 25,
            ..Default::default()
        };
        let query = build_query(&params, None, true).unwrap();
        assert_eq!(query.offset(), 50);
    }
}
