//! Customer handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use md_models::CustomerInput;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, JsonBody};

/// GET /customers
pub async fn list_customers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.customers.list().await?))
}

/// POST /customers
pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<CustomerInput>,
) -> ApiResult<impl IntoResponse> {
    let customer = state.customers.create(dto).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT /customers/:id
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<CustomerInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.customers.update(&id, dto).await?))
}

/// DELETE /customers/:id
///
/// Soft delete: the customer stays in the list with `deleted: true`.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let customer = state.customers.soft_delete(&id).await?;
    Ok(Json(DeletedResponse {
        id: customer.id,
        deleted: customer.deleted,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}
