//! Collection files and typed repositories

use md_models::{
    Color, Customer, Document, Job, PurchaseOrder, Reservation, StockItem, StockMovement,
};

use crate::repository::{JsonRepository, Record};

/// File names of collections served without a typed model
pub mod files {
    pub const DASHBOARD: &str = "dashboard.json";
    pub const TASKS: &str = "tasks.json";
    pub const PLANNING: &str = "planningEvents.json";
    pub const ARCHIVE: &str = "archiveFiles.json";
    pub const REPORTS: &str = "reports.json";
    pub const SETTINGS: &str = "settings.json";
    pub const SUPPLIERS: &str = "suppliers.json";
    pub const REQUESTS: &str = "requests.json";
    pub const INVOICES: &str = "invoices.json";
    pub const PAYMENTS: &str = "payments.json";
}

impl Record for Job {
    const FILE: &'static str = "jobs.json";
    const ENTITY: &'static str = "Job";
    const NEWEST_FIRST: bool = true;
}

impl Record for Customer {
    const FILE: &'static str = "customers.json";
    const ENTITY: &'static str = "Customer";
}

impl Record for StockItem {
    const FILE: &'static str = "stockItems.json";
    const ENTITY: &'static str = "Stock item";
}

impl Record for StockMovement {
    const FILE: &'static str = "stockMovements.json";
    const ENTITY: &'static str = "Stock movement";
    const NEWEST_FIRST: bool = true;
}

impl Record for Reservation {
    const FILE: &'static str = "reservations.json";
    const ENTITY: &'static str = "Reservation";
    const NEWEST_FIRST: bool = true;
}

impl Record for PurchaseOrder {
    const FILE: &'static str = "purchaseOrders.json";
    const ENTITY: &'static str = "Purchase order";
    const NEWEST_FIRST: bool = true;
}

impl Record for Color {
    const FILE: &'static str = "colors.json";
    const ENTITY: &'static str = "Color";
}

impl Record for Document {
    const FILE: &'static str = "documents.json";
    const ENTITY: &'static str = "Document";
    const NEWEST_FIRST: bool = true;
}

pub type JobRepository = JsonRepository<Job>;
pub type CustomerRepository = JsonRepository<Customer>;
pub type StockItemRepository = JsonRepository<StockItem>;
pub type StockMovementRepository = JsonRepository<StockMovement>;
pub type ReservationRepository = JsonRepository<Reservation>;
pub type PurchaseOrderRepository = JsonRepository<PurchaseOrder>;
pub type ColorRepository = JsonRepository<Color>;
pub type DocumentRepository = JsonRepository<Document>;
