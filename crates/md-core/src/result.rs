//! Result type aliases

use crate::error::{MdError, ValidationErrors};

/// Standard Result type for MD operations
pub type MdResult<T> = Result<T, MdError>;

/// Result of a contract check
pub type ValidationResult = Result<(), ValidationErrors>;
