//! Resource HTTP Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::application::{CreateResource, ListResources};
use crate::infrastructure::http::dto::{ApiResponse, CreateResourceRequest, ResourceResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 创建资源
pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<Json<ApiResponse<ResourceResponse>>, ApiError> {
    let command = CreateResource {
        name: request.name,
        content_type: request.content_type,
    };

    let record = state.create_resource_handler.handle(command).await?;
    Ok(Json(ApiResponse::success(record.into())))
}

/// 列出所有资源
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ResourceResponse>>>, ApiError> {
    let records = state.list_resources_handler.handle(ListResources).await?;
    Ok(Json(ApiResponse::success(
        records.into_iter().map(Into::into).collect(),
    )))
}
