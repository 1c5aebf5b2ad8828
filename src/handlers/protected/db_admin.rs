// handlers/protected/db_admin.rs - read-only table inspection
//
// Route Prefix: /api/v1/db-admin

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::admin_service::TableData;
use crate::services::AdminService;

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub fn routes(service: AdminService) -> Router {
    Router::new()
        .route("/api/v1/db-admin/tables", get(tables))
        .route("/api/v1/db-admin/table/:table/schema", get(schema))
        .route("/api/v1/db-admin/table/:table/data", get(data))
        .with_state(service)
}

pub async fn tables(State(service): State<AdminService>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({ "tables": service.tables() })))
}

pub async fn schema(
    State(service): State<AdminService>,
    Path(table): Path<String>,
) -> ApiResult<Value> {
    Ok(ApiResponse::success(service.schema(&table)?))
}

pub async fn data(
    State(service): State<AdminService>,
    Path(table): Path<String>,
    query: Result<Query<DataQuery>, QueryRejection>,
) -> ApiResult<TableData> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let limit = query.limit.unwrap_or(100).clamp(1, config().api.max_limit);
    let offset = query.offset.unwrap_or(0);

    let page = service.data(&table, limit, offset).await?;
    Ok(ApiResponse::success(page))
}
