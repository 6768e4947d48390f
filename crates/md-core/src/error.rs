//! Core error types
//!
//! Every layer maps its failures into [`MdError`] before they reach the HTTP
//! boundary.

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all MD operations
#[derive(Error, Debug)]
pub enum MdError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// A request that is well-formed but breaks a business rule
    /// (unbalanced finance close, closed job, stock shortfall).
    #[error("{message}")]
    BusinessRule { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MdError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        MdError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn business(message: impl Into<String>) -> Self {
        MdError::BusinessRule {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MdError::Conflict {
            message: message.into(),
        }
    }

    /// HTTP status code mapping
    pub fn status_code(&self) -> u16 {
        match self {
            MdError::NotFound { .. } => 404,
            MdError::Validation(_) => 422,
            MdError::BusinessRule { .. } => 400,
            MdError::Conflict { .. } => 409,
            MdError::Storage(_) | MdError::Internal(_) | MdError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            MdError::NotFound { .. } => "not_found",
            MdError::Validation(_) => "validation_failed",
            MdError::BusinessRule { .. } => "business_rule",
            MdError::Conflict { .. } => "conflict",
            MdError::Storage(_) => "storage_error",
            MdError::Internal(_) => "internal_error",
            MdError::Config(_) => "configuration_error",
        }
    }
}

impl From<crate::config::ConfigError> for MdError {
    fn from(err: crate::config::ConfigError) -> Self {
        MdError::Config(err.to_string())
    }
}

/// Validation errors collection
///
/// Field errors are kept in a sorted map so messages come out in a stable
/// order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// Errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
