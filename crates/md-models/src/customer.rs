//! Customer model

use md_core::traits::{Identifiable, SoftDeletable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Customer entity
///
/// Customers are never removed; deleting one sets `deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub location: String,
    /// Number of jobs opened for this customer
    #[serde(default)]
    pub jobs: u32,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub deleted: bool,
    /// Account code (`C-2025-1234`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Identifiable for Customer {
    fn id(&self) -> &str {
        &self.id
    }
}

impl SoftDeletable for Customer {
    fn is_deleted(&self) -> bool {
        self.deleted
    }
}
