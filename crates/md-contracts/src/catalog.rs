//! Color catalogue contract

use md_models::ColorInput;

use crate::base::{derive_errors, Contract, ValidationResult};

#[derive(Debug, Default)]
pub struct ColorContract;

impl Contract<ColorInput> for ColorContract {
    fn validate(&self, entity: &ColorInput) -> ValidationResult {
        let mut errors = derive_errors(entity);
        if entity.code.trim().is_empty() && !errors.has_error("code") {
            errors.add("code", "is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_code_required() {
        let input = ColorInput {
            name: "Antrasit".into(),
            code: "  ".into(),
        };
        assert!(ColorContract.validate(&input).unwrap_err().has_error("code"));
    }
}
