//! Purchase order model

use md_core::traits::Identifiable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pending supplier order
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: String,
    #[serde(default)]
    pub supplier: String,
    /// Display total (`₺0`)
    #[serde(default)]
    pub total: Value,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub expected_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default)]
    pub lines: Vec<PurchaseOrderLine>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PurchaseOrderLine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub qty: f64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub color: String,
}

impl Identifiable for PurchaseOrder {
    fn id(&self) -> &str {
        &self.id
    }
}
