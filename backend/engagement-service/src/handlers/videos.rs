/// Public video listing - filtered, sorted, offset-paginated.
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::services::VideoListingParams;
use crate::state::AppState;

/// GET /api/v1/videos
///
/// Public endpoint: only published videos are ever listed.
pub async fn list_videos(
    state: web::Data<AppState>,
    params: web::Query<VideoListingParams>,
) -> Result<HttpResponse> {
    let page = state.feed.public_videos(&params).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/videos").route("", web::get().to(list_videos)));
}
