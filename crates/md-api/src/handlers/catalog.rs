//! Read-only collections: dashboard, tasks, planning, archive, reports,
//! settings, purchasing and finance lists

use axum::{extract::State, response::IntoResponse, Json};

use crate::error::ApiResult;
use crate::extractors::AppState;

/// GET /dashboard/summary
pub async fn dashboard_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.dashboard_summary().await?))
}

/// GET /tasks
pub async fn tasks(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.tasks().await?))
}

/// GET /planning/events
pub async fn planning_events(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.planning_events().await?))
}

/// GET /archive/files
pub async fn archive_files(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.archive_files().await?))
}

/// GET /reports
pub async fn reports(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.reports().await?))
}

/// GET /settings
pub async fn settings(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.settings().await?))
}

/// GET /purchase/orders
pub async fn purchase_orders(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.purchase_orders().await?))
}

/// GET /purchase/suppliers
pub async fn suppliers(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.suppliers().await?))
}

/// GET /purchase/requests
pub async fn purchase_requests(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.purchase_requests().await?))
}

/// GET /finance/invoices
pub async fn invoices(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.invoices().await?))
}

/// GET /finance/payments
pub async fn payments(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.catalog.payments().await?))
}
