use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::path_id;
use crate::entity::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::EntityService;

/// GET /api/v1/entities/:entity/:id
///
/// `fields` may be passed but is ignored.
pub async fn get(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Record> {
    let id = path_id(path)?;
    debug!("Fetching {} {} for {}", service.entity().name, id, user.id);

    match service.get_by_id(id, Some(&user.id)).await? {
        Some(row) => Ok(ApiResponse::success(row)),
        None => Err(service.not_found().into()),
    }
}

/// PUT /api/v1/entities/:entity/:id - partial update of an owned row
pub async fn update(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let id = path_id(path)?;
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    debug!("Updating {} {} with {}", service.entity().name, id, payload);

    match service.update(id, &payload, Some(&user.id)).await? {
        Some(row) => Ok(ApiResponse::success(row)),
        None => {
            warn!("{} with id {} not found for update", service.entity().label, id);
            Err(service.not_found().into())
        }
    }
}

/// DELETE /api/v1/entities/:entity/:id
pub async fn delete(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Value> {
    let id = path_id(path)?;

    if !service.delete(id, Some(&user.id)).await? {
        warn!("{} with id {} not found for deletion", service.entity().label, id);
        return Err(service.not_found().into());
    }

    Ok(ApiResponse::success(json!({
        "message": format!("{} deleted successfully", service.entity().label),
        "id": id,
    })))
}
