//! Stock contracts

use md_core::error::ValidationErrors;
use md_models::{MovementInput, StockItemInput};

use crate::base::{derive_errors, Contract, ValidationResult};

/// Contract for creating and updating stock items
#[derive(Debug, Default)]
pub struct StockItemContract;

impl Contract<StockItemInput> for StockItemContract {
    fn validate(&self, entity: &StockItemInput) -> ValidationResult {
        let mut errors = derive_errors(entity);
        for (field, value) in [
            ("name", &entity.name),
            ("sku", &entity.sku),
            ("unit", &entity.unit),
            ("supplier", &entity.supplier),
            ("color", &entity.color),
        ] {
            if value.trim().is_empty() && !errors.has_error(field) {
                errors.add(field, "is required");
            }
        }
        errors.into_result()
    }
}

/// Contract for manual stock movements
#[derive(Debug, Default)]
pub struct MovementContract;

impl Contract<MovementInput> for MovementContract {
    fn validate(&self, entity: &MovementInput) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if entity.item_id.trim().is_empty() {
            errors.add("itemId", "is required");
        }
        if entity.qty <= 0.0 || !entity.qty.is_finite() {
            errors.add("qty", "must be positive");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use md_models::MovementType;
    use serde_json::json;

    #[test]
    fn test_blank_required_fields() {
        let input: StockItemInput = serde_json::from_value(json!({
            "name": "Sunta", "sku": " ", "unit": "levha", "supplier": "Kastamonu",
            "color": ""
        }))
        .unwrap();
        let errors = StockItemContract.validate(&input).unwrap_err();
        assert!(errors.has_error("sku"));
        assert!(errors.has_error("color"));
        assert!(!errors.has_error("name"));
    }

    #[test]
    fn test_movement_requires_positive_qty() {
        let input = MovementInput {
            item_id: "STK-1".into(),
            qty: 0.0,
            movement_type: MovementType::StockIn,
            reason: None,
            operator: None,
            reference: None,
            location: None,
        };
        let errors = MovementContract.validate(&input).unwrap_err();
        assert!(errors.has_error("qty"));
    }
}
