//! # md-services
//!
//! Business logic for the MD service. Each service validates its input
//! through a contract from `md-contracts`, applies the change to the JSON
//! collections in `md-store` and returns the stored record.
//!
//! - [`JobService`]: the job pipeline transitions
//! - [`CustomerService`]: customers and account codes
//! - [`StockService`]: items, manual movements and reservations
//! - [`ColorService`]: the color catalogue
//! - [`CatalogService`]: read-only collections served as stored

pub mod catalog;
pub mod colors;
pub mod customers;
pub mod jobs;
pub mod stock;

pub use catalog::CatalogService;
pub use colors::ColorService;
pub use customers::CustomerService;
pub use jobs::JobService;
pub use stock::{MovementOutcome, StockService};

use md_contracts::Contract;
use md_core::error::MdError;
use md_core::result::MdResult;

/// Run a contract and turn its failures into a 422 error
pub(crate) fn validate_with<T, C: Contract<T>>(contract: &C, input: &T) -> MdResult<()> {
    contract.validate(input).map_err(MdError::from)
}
