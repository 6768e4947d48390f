//! Stock handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use md_models::{MovementInput, StockItemInput};

use crate::error::ApiResult;
use crate::extractors::{AppState, JsonBody};
use crate::handlers::colors::SuccessResponse;

/// GET /stock/items
pub async fn list_items(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.stock.list_items().await?))
}

/// POST /stock/items
pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<StockItemInput>,
) -> ApiResult<impl IntoResponse> {
    let item = state.stock.create_item(dto).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /stock/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<StockItemInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.stock.update_item(&id, dto).await?))
}

/// DELETE /stock/items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let removed = state.stock.delete_item(&id).await?;
    Ok(Json(SuccessResponse::with_id(removed.id)))
}

/// GET /stock/movements
pub async fn list_movements(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.stock.list_movements().await?))
}

/// POST /stock/movements
///
/// Returns the updated item together with the new ledger entry.
pub async fn create_movement(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<MovementInput>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.stock.record_movement(dto).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /stock/reservations
pub async fn list_reservations(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.stock.list_reservations().await?))
}
