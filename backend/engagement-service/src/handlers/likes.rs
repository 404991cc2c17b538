/// Like handlers - toggle endpoints for videos, comments and tweets,
/// plus the caller's liked-video listing.
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::domain::RelationKind;
use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// POST /api/v1/likes/video/{video_id}
pub async fn toggle_video_like(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .toggles
        .toggle(user_id.0, path.into_inner(), RelationKind::LikeVideo)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "is_liked": outcome.created })))
}

/// POST /api/v1/likes/comment/{comment_id}
pub async fn toggle_comment_like(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .toggles
        .toggle(user_id.0, path.into_inner(), RelationKind::LikeComment)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "is_liked": outcome.created })))
}

/// POST /api/v1/likes/tweet/{tweet_id}
pub async fn toggle_tweet_like(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .toggles
        .toggle(user_id.0, path.into_inner(), RelationKind::LikeTweet)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "is_liked": outcome.created })))
}

/// GET /api/v1/likes/videos
pub async fn liked_videos(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let videos = state.aggregation.liked_videos(user_id.0).await?;
    Ok(HttpResponse::Ok().json(videos))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/likes")
            .route("/video/{video_id}", web::post().to(toggle_video_like))
            .route("/comment/{comment_id}", web::post().to(toggle_comment_like))
            .route("/tweet/{tweet_id}", web::post().to(toggle_tweet_like))
            .route("/videos", web::get().to(liked_videos)),
    );
}
