use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::config::config;
use crate::database::{ddl, DatabaseManager, PgStore};
use crate::is_production;
use crate::routes::{app, AppState};

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config();
    info!("Starting Quarry Statistics API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        warn!("JWT_SECRET is not set; every protected request will fail");
    }
    if is_production!() && config.security.cors_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin in production");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.auto_migrate {
        ddl::migrate(&pool).await?;
    }

    let state = AppState::new(Arc::new(PgStore::new(pool)));

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Quarry Statistics API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
