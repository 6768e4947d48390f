//! # md-contracts
//!
//! Contracts validate request payloads before a service touches stored
//! data. Failures are collected into [`ValidationErrors`] and surface as 422.

pub mod base;
pub mod catalog;
pub mod customers;
pub mod jobs;
pub mod stock;

pub use base::*;
pub use catalog::*;
pub use customers::*;
pub use jobs::*;
pub use stock::*;

pub use md_core::error::ValidationErrors;
