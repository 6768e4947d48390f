//! # md-core
//!
//! Core types, traits, and utilities shared by every MD crate.
//!
//! - Common error types
//! - Result type alias
//! - Record traits (Identifiable, SoftDeletable)
//! - Id, timestamp and money helpers
//! - Configuration types

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::*;
pub use result::*;
pub use traits::*;
pub use types::*;
