use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use engagement_service::config::Config;
use engagement_service::handlers;
use engagement_service::notifications::NotificationHub;
use engagement_service::repository::postgres::{PgContentStore, PgRelationLedger};
use engagement_service::repository::{ContentStore, RelationLedger};
use engagement_service::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting engagement-service");

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    let ledger: Arc<dyn RelationLedger> = Arc::new(PgRelationLedger::new(pool.clone()));
    let content: Arc<dyn ContentStore> = Arc::new(PgContentStore::new(pool));
    let hub = NotificationHub::new();
    let state = AppState::new(ledger, content, hub);

    let bind_addr = (config.app.host.clone(), config.app.http_port);
    info!(
        host = %config.app.host,
        port = config.app.http_port,
        env = %config.app.env,
        "HTTP server listening"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::register_routes)
    })
    .bind(bind_addr)
    .context("failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server terminated")?;

    Ok(())
}
