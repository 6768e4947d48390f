//! API routes
//!
//! Collection roots answer with and without a trailing slash since the web
//! client uses both forms.

use axum::{
    routing::{get, post, put, MethodRouter},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{catalog, colors, customers, documents, jobs, stock};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(jobs_router())
        .merge(customers_router())
        .merge(stock_router())
        .merge(colors_router())
        .merge(documents_router())
        .merge(catalog_router())
}

fn jobs_router() -> Router<AppState> {
    fn root() -> MethodRouter<AppState> {
        get(jobs::list_jobs).post(jobs::create_job)
    }

    Router::new()
        .route("/jobs", root())
        .route("/jobs/", root())
        .route("/jobs/:id", get(jobs::get_job))
        .route("/jobs/:id/measure", put(jobs::update_measure))
        .route("/jobs/:id/offer", put(jobs::update_offer))
        .route("/jobs/:id/approval/start", post(jobs::start_approval))
        .route("/jobs/:id/stock", put(jobs::update_stock))
        .route("/jobs/:id/production", put(jobs::update_production))
        .route("/jobs/:id/assembly/schedule", put(jobs::schedule_assembly))
        .route("/jobs/:id/assembly/complete", put(jobs::complete_assembly))
        .route("/jobs/:id/finance/close", put(jobs::close_finance))
        .route("/jobs/:id/status", put(jobs::update_status))
}

fn customers_router() -> Router<AppState> {
    fn root() -> MethodRouter<AppState> {
        get(customers::list_customers).post(customers::create_customer)
    }

    Router::new()
        .route("/customers", root())
        .route("/customers/", root())
        .route(
            "/customers/:id",
            put(customers::update_customer).delete(customers::delete_customer),
        )
}

fn stock_router() -> Router<AppState> {
    Router::new()
        .route(
            "/stock/items",
            get(stock::list_items).post(stock::create_item),
        )
        .route(
            "/stock/items/:id",
            put(stock::update_item).delete(stock::delete_item),
        )
        .route(
            "/stock/movements",
            get(stock::list_movements).post(stock::create_movement),
        )
        .route("/stock/reservations", get(stock::list_reservations))
}

fn colors_router() -> Router<AppState> {
    fn root() -> MethodRouter<AppState> {
        get(colors::list_colors).post(colors::create_color)
    }

    Router::new()
        .route("/colors", root())
        .route("/colors/", root())
        .route(
            "/colors/:id",
            put(colors::update_color).delete(colors::delete_color),
        )
}

fn documents_router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(documents::list_documents))
        .route("/documents/", get(documents::list_documents))
        .route("/documents/upload", post(documents::upload_document))
        .route("/documents/job/:job_id", get(documents::job_documents))
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/documents/:id/download", get(documents::download_document))
}

fn catalog_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard/summary", get(catalog::dashboard_summary))
        .route("/tasks", get(catalog::tasks))
        .route("/tasks/", get(catalog::tasks))
        .route("/planning/events", get(catalog::planning_events))
        .route("/archive/files", get(catalog::archive_files))
        .route("/reports", get(catalog::reports))
        .route("/reports/", get(catalog::reports))
        .route("/settings", get(catalog::settings))
        .route("/settings/", get(catalog::settings))
        .route("/purchase/orders", get(catalog::purchase_orders))
        .route("/purchase/suppliers", get(catalog::suppliers))
        .route("/purchase/requests", get(catalog::purchase_requests))
        .route("/finance/invoices", get(catalog::invoices))
        .route("/finance/payments", get(catalog::payments))
}
