//! Request payloads
//!
//! Shared by the REST handlers that accept them and the client that sends
//! them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::job::{Discount, JobStatus, PaymentPlan, PendingLine, Received, StartType, StockLine};
use crate::stock::MovementType;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JobCreate {
    #[validate(length(min = 1, message = "is required"))]
    pub customer_id: String,
    #[validate(length(min = 1, message = "is required"))]
    pub customer_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub title: String,
    pub start_type: StartType,
    #[serde(default)]
    pub roles: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureUpdate {
    pub measurements: Value,
    #[serde(default)]
    pub appointment: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferUpdate {
    #[serde(default)]
    pub lines: Vec<Value>,
    pub total: f64,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalStart {
    pub payment_plan: PaymentPlan,
    #[serde(default)]
    pub contract_url: Option<String>,
    #[serde(default)]
    pub stock_needs: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub ready: bool,
    #[serde(default)]
    pub purchase_notes: Option<String>,
    #[serde(default)]
    pub items: Vec<StockLine>,
    #[serde(default)]
    pub pending: Vec<PendingLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionUpdate {
    pub status: JobStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agreement_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyScheduleRequest {
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyCompleteRequest {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default = "default_completed")]
    pub completed: bool,
    #[serde(default)]
    pub proof: Option<Value>,
}

fn default_completed() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceClose {
    pub total: f64,
    #[serde(default)]
    pub payments: Received,
    #[serde(default)]
    pub discount: Option<Discount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub segment: String,
    pub location: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StockItemInput {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub sku: String,
    #[validate(length(min = 1, message = "is required"))]
    pub unit: String,
    #[validate(length(min = 1, message = "is required"))]
    pub supplier: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[validate(length(min = 1, message = "is required"))]
    pub color: String,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub on_hand: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub reserved: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub critical: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub reorder_point: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub min_order_qty: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub lead_time_days: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub unit_cost: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementInput {
    pub item_id: String,
    pub qty: f64,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ColorInput {
    #[validate(length(min = 1, message = "is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub code: String,
}

/// Entry for the client-side activity log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLogInput {
    #[serde(default)]
    pub id: Option<String>,
    pub job_id: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRoleInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_name_length() {
        let input = CustomerInput {
            name: "A".into(),
            segment: "B2C".into(),
            location: "İzmir".into(),
            contact: "0532".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_stock_item_input_rejects_negative() {
        let input: StockItemInput = serde_json::from_value(json!({
            "name": "Kulp", "sku": "KLP-1", "unit": "adet",
            "supplier": "Hafele", "color": "Siyah", "onHand": -1
        }))
        .unwrap();
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("on_hand"));
    }

    #[test]
    fn test_assembly_complete_defaults_to_completed() {
        let req: AssemblyCompleteRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.completed);
    }

    #[test]
    fn test_start_type_must_be_known() {
        let result: Result<JobCreate, _> = serde_json::from_value(json!({
            "customerId": "CST-1", "customerName": "Ayşe", "title": "Dolap",
            "startType": "MONTAJ"
        }));
        assert!(result.is_err());
    }
}
