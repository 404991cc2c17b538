/// Subscription handlers - toggle plus the two listing directions.
///
/// A successful subscribe additionally pushes a best-effort notification to
/// the channel owner's live connections; that side effect never fails the
/// request.
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::domain::RelationKind;
use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// POST /api/v1/subscriptions/{channel_id}
pub async fn toggle_subscription(
    state: web::Data<AppState>,
    user_id: UserId,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let outcome = state
        .toggles
        .toggle(user_id.0, path.into_inner(), RelationKind::Subscription)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "subscribed": outcome.created })))
}

/// GET /api/v1/subscriptions/subscribers/{channel_id}
pub async fn channel_subscribers(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let subscribers = state
        .aggregation
        .channel_subscribers(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(subscribers))
}

/// GET /api/v1/subscriptions/subscribed/{user_id}
pub async fn subscribed_channels(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let channels = state
        .aggregation
        .subscribed_channels(path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(channels))
}

pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/subscriptions")
            .route(
                "/subscribers/{channel_id}",
                web::get().to(channel_subscribers),
            )
            .route("/subscribed/{user_id}", web::get().to(subscribed_channels))
            .route("/{channel_id}", web::post().to(toggle_subscription)),
    );
}
