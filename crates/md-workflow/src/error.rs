//! Workflow errors

use md_core::error::MdError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("payment total does not match offer total (difference: {difference})")]
    PaymentMismatch { difference: f64 },

    #[error("cheque amount must not be zero")]
    EmptyCheque,

    #[error("balance must be 0 (difference: {balance})")]
    Unbalanced { balance: f64 },

    #[error("discount note is required")]
    DiscountNoteRequired,

    #[error("at least one stock line is required")]
    EmptyReservation,

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("{name} has no available stock")]
    NothingAvailable { name: String },

    #[error("stock line {0} not found")]
    LineNotFound(String),

    #[error("job is closed")]
    JobClosed,
}

impl From<WorkflowError> for MdError {
    fn from(err: WorkflowError) -> Self {
        MdError::business(err.to_string())
    }
}
