use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config;
use crate::entity::Record;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{EntityService, ListParams, ListResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// JSON object of exact-match conditions.
    pub query: Option<String>,
    pub sort: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    /// Accepted for compatibility; projections are not applied.
    pub fields: Option<String>,
}

impl ListQuery {
    pub fn into_params(self) -> Result<ListParams, ApiError> {
        let api = &config::config().api;

        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ApiError::bad_request("skip must be greater than or equal to 0"));
        }

        let limit = self.limit.unwrap_or(api.default_limit);
        if !(1..=api.max_limit).contains(&limit) {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {}",
                api.max_limit
            )));
        }

        let query = match self.query.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => return Err(ApiError::bad_request("Invalid query JSON format")),
            },
        };

        if let Some(fields) = &self.fields {
            debug!("Ignoring field projection: {}", fields);
        }

        Ok(ListParams {
            skip,
            limit,
            query,
            sort: self.sort.filter(|s| !s.trim().is_empty()),
        })
    }
}

fn list_params(query: Result<Query<ListQuery>, QueryRejection>) -> Result<ListParams, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    query.into_params()
}

/// GET /api/v1/entities/:entity - caller's rows
pub async fn list(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ListResult> {
    let params = list_params(query)?;
    let result = service.get_list(params, Some(&user.id)).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/entities/:entity/all - every owner's rows
pub async fn list_all(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<ListResult> {
    let params = list_params(query)?;
    debug!("Unscoped {} list requested by {}", service.entity().name, user.id);
    let result = service.get_list(params, None).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/entities/:entity
pub async fn create(
    State(service): State<EntityService>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Record> {
    let Json(payload) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    debug!("Creating {} for {}", service.entity().name, user.id);

    let row = service.create(&payload, &user.id).await?;
    Ok(ApiResponse::created(row))
}
