// handlers/public/root.rs - service index and health probe
//
// Routes: GET /, GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::routes::AppState;

pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "Quarry Statistics API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Regional quarry and mining statistics, one private dataset per user",
        "endpoints": {
            "health": "/health (public)",
            "entities": "/api/v1/entities/:entity[/:id | /all | /batch] (protected)",
            "config": "/api/v1/config/{provinces,materials,price-materials,foreign-destinations} (protected)",
            "data_reset": "/api/v1/data-reset/reset (protected)",
            "admin": "/api/v1/admin/reset_cave_autorizzate (protected)",
            "db_admin": "/api/v1/db-admin/* (protected)",
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store().health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable"
                })),
            )
        }
    }
}
