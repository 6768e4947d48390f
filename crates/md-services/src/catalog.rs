//! Read-only collections
//!
//! Dashboard figures, tasks, planning events and the like are maintained
//! outside this service and returned exactly as stored.

use md_core::result::MdResult;
use md_models::PurchaseOrder;
use md_store::{files, DataDir, PurchaseOrderRepository};
use serde_json::Value;
use tracing::instrument;

#[derive(Clone)]
pub struct CatalogService {
    dir: DataDir,
    purchase_orders: PurchaseOrderRepository,
}

impl CatalogService {
    pub fn new(dir: DataDir) -> Self {
        Self {
            purchase_orders: PurchaseOrderRepository::new(dir.clone()),
            dir,
        }
    }

    /// A file's JSON as stored; a missing file is an error
    #[instrument(skip(self))]
    pub async fn raw(&self, file: &str) -> MdResult<Value> {
        Ok(self.dir.read_value(file).await?)
    }

    pub async fn dashboard_summary(&self) -> MdResult<Value> {
        self.raw(files::DASHBOARD).await
    }

    pub async fn tasks(&self) -> MdResult<Value> {
        self.raw(files::TASKS).await
    }

    pub async fn planning_events(&self) -> MdResult<Value> {
        self.raw(files::PLANNING).await
    }

    pub async fn archive_files(&self) -> MdResult<Value> {
        self.raw(files::ARCHIVE).await
    }

    pub async fn reports(&self) -> MdResult<Value> {
        self.raw(files::REPORTS).await
    }

    pub async fn settings(&self) -> MdResult<Value> {
        self.raw(files::SETTINGS).await
    }

    pub async fn suppliers(&self) -> MdResult<Value> {
        self.raw(files::SUPPLIERS).await
    }

    pub async fn purchase_requests(&self) -> MdResult<Value> {
        self.raw(files::REQUESTS).await
    }

    pub async fn invoices(&self) -> MdResult<Value> {
        self.raw(files::INVOICES).await
    }

    pub async fn payments(&self) -> MdResult<Value> {
        self.raw(files::PAYMENTS).await
    }

    pub async fn purchase_orders(&self) -> MdResult<Vec<PurchaseOrder>> {
        Ok(self.purchase_orders.find_all().await?)
    }
}
