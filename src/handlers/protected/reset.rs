// handlers/protected/reset.rs - bulk removal of a chapter's yearly data
//
// Routes: POST /api/v1/data-reset/reset, POST /api/v1/admin/reset_cave_autorizzate

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ResetService;

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub chapter: String,
    pub anno: i64,
}

pub fn routes(service: ResetService) -> Router {
    Router::new()
        .route("/api/v1/data-reset/reset", post(reset_chapter))
        .route("/api/v1/admin/reset_cave_autorizzate", post(reset_cave_autorizzate))
        .with_state(service)
}

pub async fn reset_chapter(
    State(service): State<ResetService>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<ResetRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let deleted = service
        .reset_chapter(&request.chapter, request.anno, &user.id)
        .await?;
    Ok(ApiResponse::success(json!({
        "success": true,
        "message": format!(
            "Deleted {} records for chapter '{}' and year {}",
            deleted, request.chapter, request.anno
        ),
        "deleted_count": deleted,
    })))
}

pub async fn reset_cave_autorizzate(
    State(service): State<ResetService>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let deleted = service.reset_cave_autorizzate(&user.id).await?;
    Ok(ApiResponse::success(json!({
        "success": true,
        "message": format!("Successfully deleted {} records from Cave Autorizzate", deleted),
        "deleted_count": deleted,
    })))
}
