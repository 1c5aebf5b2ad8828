use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::entity::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{BatchUpdateItem, EntityService, ServiceError};

#[derive(Debug, Deserialize)]
pub struct BatchCreateRequest {
    pub items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateRequest {
    pub items: Vec<BatchUpdateItem>,
}

#[derive(Debug, Deserialize)]
pub struct BatchDeleteRequest {
    pub ids: Vec<i64>,
}

fn body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(b)| b)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Only a failure that escaped the per-item loop reaches here.
fn batch_failed(op: &str, entity: &str, err: ServiceError) -> ApiError {
    error!("Error in batch {} of {}: {}", op, entity, err);
    ApiError::internal_server_error(format!("Batch {} failed", op))
}

/// POST /api/v1/entities/:entity/batch - `{items: [...]}`
pub async fn create(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    request: Result<Json<BatchCreateRequest>, JsonRejection>,
) -> ApiResult<Vec<Record>> {
    let request = body(request)?;
    let name = service.entity().name;
    debug!("Batch creating {} {}", request.items.len(), name);

    let created = service
        .batch_create(&request.items, &user.id)
        .await
        .map_err(|e| batch_failed("create", name, e))?;
    Ok(ApiResponse::created(created))
}

/// PUT /api/v1/entities/:entity/batch - `{items: [{id, updates}]}`
pub async fn update(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    request: Result<Json<BatchUpdateRequest>, JsonRejection>,
) -> ApiResult<Vec<Record>> {
    let request = body(request)?;
    let name = service.entity().name;
    debug!("Batch updating {} {}", request.items.len(), name);

    let updated = service
        .batch_update(&request.items, &user.id)
        .await
        .map_err(|e| batch_failed("update", name, e))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/entities/:entity/batch - `{ids: [...]}`
pub async fn delete(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    request: Result<Json<BatchDeleteRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let request = body(request)?;
    let name = service.entity().name;
    debug!("Batch deleting {} {}", request.ids.len(), name);

    let deleted = service
        .batch_delete(&request.ids, &user.id)
        .await
        .map_err(|e| batch_failed("delete", name, e))?;
    Ok(ApiResponse::success(json!({
        "message": format!("Successfully deleted {} {}s", deleted, name),
        "deleted_count": deleted,
    })))
}
