//! Color catalogue handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use md_models::ColorInput;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, JsonBody};

/// GET /colors
pub async fn list_colors(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.colors.list().await?))
}

/// POST /colors
pub async fn create_color(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<ColorInput>,
) -> ApiResult<impl IntoResponse> {
    let color = state.colors.create(dto).await?;
    Ok((StatusCode::CREATED, Json(color)))
}

/// PUT /colors/:id
pub async fn update_color(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<ColorInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.colors.update(&id, dto).await?))
}

/// DELETE /colors/:id
pub async fn delete_color(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.colors.delete(&id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `{"success": true}`, with the id of the removed record when there is one
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            id: None,
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
        }
    }
}
