//! # md-models
//!
//! Serde records for everything the shop tracks. Wire names are camelCase;
//! fields a record does not model are kept in an `extra` map so records
//! written by other tools survive a load/save cycle.

pub mod color;
pub mod customer;
pub mod document;
pub mod job;
pub mod job_log;
pub mod purchase;
pub mod requests;
pub mod stock;

pub use color::*;
pub use customer::*;
pub use document::*;
pub use job::*;
pub use job_log::*;
pub use purchase::*;
pub use requests::*;
pub use stock::*;
