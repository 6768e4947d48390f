//! Application state and extractors

use std::sync::Arc;

use axum::extract::FromRequest;
use md_documents::{DocumentService, Storage};
use md_services::{CatalogService, ColorService, CustomerService, JobService, StockService};
use md_store::{DataDir, DocumentRepository};

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub jobs: JobService,
    pub customers: CustomerService,
    pub stock: StockService,
    pub colors: ColorService,
    pub catalog: CatalogService,
    pub documents: DocumentService,
}

impl AppState {
    pub fn new(dir: DataDir, storage: Arc<dyn Storage>, max_upload_bytes: u64) -> Self {
        let documents = DocumentService::new(DocumentRepository::new(dir.clone()), storage)
            .with_max_upload_bytes(max_upload_bytes);
        Self {
            jobs: JobService::new(dir.clone()),
            customers: CustomerService::new(dir.clone()),
            stock: StockService::new(dir.clone()),
            colors: ColorService::new(dir.clone()),
            catalog: CatalogService::new(dir),
            documents,
        }
    }
}

/// `Json` whose rejections are reported as `{"detail": ...}`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
