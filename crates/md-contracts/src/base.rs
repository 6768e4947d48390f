//! Base contract system

use md_core::error::ValidationErrors;
pub use md_core::result::ValidationResult;
use validator::Validate;

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Run the derived `validator` rules of a payload and collect them
pub fn derive_errors<T: Validate>(entity: &T) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if let Err(derived) = entity.validate() {
        for (field, field_errors) in derived.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.add(field.to_string(), message);
            }
        }
    }
    errors
}

/// Add an error when a money or quantity field is negative
pub fn non_negative(errors: &mut ValidationErrors, field: &str, value: f64) {
    if value < 0.0 {
        errors.add(field, "must not be negative");
    } else if !value.is_finite() {
        errors.add(field, "must be a number");
    }
}
