/// Dashboard handlers - the owner's channel statistics and video listing.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::UserId;
use crate::services::VideoListingParams;
use crate::state::AppState;

/// GET /api/v1/dashboard/stats
pub async fn channel_stats(state: web::Data<AppState>, user_id: UserId) -> Result<HttpResponse> {
    let stats = state.aggregation.channel_stats(user_id.0).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// GET /api/v1/dashboard/videos
///
/// Scoped to the caller's own videos; unpublished rows are included.
pub async fn channel_videos(
    state: web::Data<AppState>,
    user_id: UserId,
    params: web::Query<VideoListingParams>,
) -> Result<HttpResponse> {
    let page = state.feed.dashboard_videos(user_id.0, &params).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/dashboard")
            .route("/stats", web::get().to(channel_stats))
            .route("/videos", web::get().to(channel_videos)),
    );
}
