//! Job pipeline handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use md_models::{
    ApprovalStart, AssemblyCompleteRequest, AssemblyScheduleRequest, FinanceClose, JobCreate,
    MeasureUpdate, OfferUpdate, ProductionUpdate, StatusUpdate, StockUpdate,
};

use crate::error::ApiResult;
use crate::extractors::{AppState, JsonBody};

/// GET /jobs
pub async fn list_jobs(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.list().await?))
}

/// GET /jobs/:id
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.get(&id).await?))
}

/// POST /jobs
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(dto): JsonBody<JobCreate>,
) -> ApiResult<impl IntoResponse> {
    let job = state.jobs.create(dto).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /jobs/:id/measure
pub async fn update_measure(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<MeasureUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.update_measure(&id, dto).await?))
}

/// PUT /jobs/:id/offer
pub async fn update_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<OfferUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.update_offer(&id, dto).await?))
}

/// POST /jobs/:id/approval/start
pub async fn start_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<ApprovalStart>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.start_approval(&id, dto).await?))
}

/// PUT /jobs/:id/stock
pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<StockUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.update_stock(&id, dto).await?))
}

/// PUT /jobs/:id/production
pub async fn update_production(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<ProductionUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.update_production(&id, dto).await?))
}

/// PUT /jobs/:id/assembly/schedule
pub async fn schedule_assembly(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<AssemblyScheduleRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.schedule_assembly(&id, dto).await?))
}

/// PUT /jobs/:id/assembly/complete
pub async fn complete_assembly(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<AssemblyCompleteRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.complete_assembly(&id, dto).await?))
}

/// PUT /jobs/:id/finance/close
pub async fn close_finance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<FinanceClose>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.close_finance(&id, dto).await?))
}

/// PUT /jobs/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(dto): JsonBody<StatusUpdate>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.jobs.set_status(&id, dto).await?))
}
