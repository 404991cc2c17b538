/// HTTP surface of the engagement core.
pub mod dashboard;
pub mod likes;
pub mod subscriptions;
pub mod videos;
pub mod ws;

use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

/// GET /health
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "engagement-service",
    }))
}

/// Register every route this service exposes.
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    likes::register_routes(cfg);
    subscriptions::register_routes(cfg);
    dashboard::register_routes(cfg);
    videos::register_routes(cfg);
    ws::register_routes(cfg);
    cfg.route("/health", web::get().to(health));
}
