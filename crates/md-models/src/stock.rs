//! Stock models
//!
//! Quantities are `f64`; items are measured in pieces, sheets, metres or
//! kilograms depending on `unit`.

use md_core::traits::Identifiable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inventory item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_warehouse")]
    pub warehouse: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub on_hand: f64,
    #[serde(default)]
    pub reserved: f64,
    #[serde(default)]
    pub critical: f64,
    #[serde(default)]
    pub reorder_point: f64,
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: f64,
    #[serde(default = "default_lead_time_days")]
    pub lead_time_days: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub notes: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_unit() -> String {
    "adet".to_string()
}

fn default_category() -> String {
    "Genel".to_string()
}

fn default_warehouse() -> String {
    "Ana Depo".to_string()
}

fn default_min_order_qty() -> f64 {
    1.0
}

fn default_lead_time_days() -> f64 {
    2.0
}

impl Default for StockItem {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            sku: String::new(),
            unit: default_unit(),
            supplier: String::new(),
            category: default_category(),
            warehouse: default_warehouse(),
            barcode: String::new(),
            color: String::new(),
            on_hand: 0.0,
            reserved: 0.0,
            critical: 0.0,
            reorder_point: 0.0,
            min_order_qty: default_min_order_qty(),
            lead_time_days: default_lead_time_days(),
            unit_cost: 0.0,
            notes: String::new(),
            extra: Map::new(),
        }
    }
}

impl StockItem {
    /// Quantity not yet promised to a job, never negative
    pub fn available(&self) -> f64 {
        (self.on_hand - self.reserved).max(0.0)
    }

    /// Threshold below which the item counts as critical
    pub fn threshold(&self) -> f64 {
        self.critical.max(self.reorder_point)
    }
}

impl Identifiable for StockItem {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Direction of a manual stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MovementType {
    StockIn,
    StockOut,
}

impl MovementType {
    /// Signed change for a quantity
    pub fn signed(&self, qty: f64) -> f64 {
        match self {
            MovementType::StockIn => qty,
            MovementType::StockOut => -qty,
        }
    }

    pub fn default_reason(&self) -> &'static str {
        match self {
            MovementType::StockIn => "Stok girişi",
            MovementType::StockOut => "Stok çıkışı",
        }
    }
}

/// Stock ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Item name at the time of the movement
    #[serde(default)]
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Signed quantity
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identifiable for StockMovement {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Quantity of an item held for a job
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    /// Job id
    #[serde(default)]
    pub job: String,
    /// Item name
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub due_date: String,
    /// `Ayrıldı` once taken out of stock, `Beklemede` while held
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identifiable for Reservation {
    fn id(&self) -> &str {
        &self.id
    }
}
