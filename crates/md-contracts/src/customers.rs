//! Customer contracts

use md_models::CustomerInput;

use crate::base::{derive_errors, Contract, ValidationResult};

/// Contract for creating and updating customers
#[derive(Debug, Default)]
pub struct CustomerContract;

impl Contract<CustomerInput> for CustomerContract {
    fn validate(&self, entity: &CustomerInput) -> ValidationResult {
        let mut errors = derive_errors(entity);
        if entity.name.trim().chars().count() < 2 && !errors.has_error("name") {
            errors.add("name", "must be at least 2 characters");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CustomerInput {
        CustomerInput {
            name: name.into(),
            segment: "B2B".into(),
            location: "Ankara".into(),
            contact: "info@example.com".into(),
        }
    }

    #[test]
    fn test_valid_customer() {
        assert!(CustomerContract.validate(&input("Ak Mobilya")).is_ok());
    }

    #[test]
    fn test_short_name() {
        let errors = CustomerContract.validate(&input("A")).unwrap_err();
        assert_eq!(
            errors.get("name"),
            Some(&vec!["must be at least 2 characters".to_string()])
        );
    }

    #[test]
    fn test_whitespace_padded_name() {
        assert!(CustomerContract.validate(&input(" A ")).is_err());
    }
}
