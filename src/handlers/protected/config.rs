// handlers/protected/config.rs - per-user lookup lists
//
// Route Prefix: /api/v1/config/{provinces,materials,price-materials,foreign-destinations}

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde_json::{json, Map, Value};
use tracing::error;

use crate::database::store::EntityStore;
use crate::error::ApiError;
use crate::handlers::protected::entities::path_id;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{ConfigLookup, ConfigService};

pub fn routes(store: Arc<dyn EntityStore>) -> Router {
    ConfigLookup::ALL
        .into_iter()
        .fold(Router::new(), |router, lookup| {
            let base = format!("/api/v1/config/{}", lookup.path());
            router.merge(
                Router::new()
                    .route(&base, get(list).post(create))
                    .route(&format!("{}/:id", base), delete(remove))
                    .with_state(ConfigService::new(lookup, store.clone())),
            )
        })
}

/// GET - `{<collection>: [...]}`, oldest first
pub async fn list(
    State(service): State<ConfigService>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let items = service.list(&user.id).await?;
    let mut body = Map::new();
    body.insert(service.lookup().collection_key().to_string(), Value::Array(items));
    Ok(ApiResponse::success(Value::Object(body)))
}

/// POST - create an entry stamped with the current time
pub async fn create(
    State(service): State<ConfigService>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    match service.create(&payload, &user.id).await {
        Ok(created) => Ok(ApiResponse::success(created)),
        Err(e) if e.is_item_failure() => Err(e.into()),
        Err(e) => {
            error!("Error creating {} entry: {}", service.lookup().path(), e);
            Err(ApiError::bad_request(format!(
                "Failed to create {} entry",
                service.lookup().path()
            )))
        }
    }
}

/// DELETE /:id - always `{success: true}`
pub async fn remove(
    State(service): State<ConfigService>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let id = path_id(path)?;
    service.delete(id, &user.id).await?;
    Ok(ApiResponse::success(json!({ "success": true })))
}
