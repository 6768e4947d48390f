//! # md-store
//!
//! Storage for the MD service: one JSON document per collection inside a
//! data directory (`jobs.json`, `customers.json`, ...).
//!
//! - [`DataDir`] reads and writes files and owns the write gate
//! - [`JsonRepository`] gives typed CRUD over one collection
//!
//! ## Example
//!
//! ```ignore
//! use md_store::{DataDir, JobRepository};
//!
//! let dir = DataDir::open("./md.data").await?;
//! let jobs = JobRepository::new(dir.clone());
//! let job = jobs.get("JOB-1A2B3C4D").await?;
//! ```

pub mod collections;
pub mod data_dir;
pub mod repository;

pub use collections::*;
pub use data_dir::DataDir;
pub use repository::{JsonRepository, Record, RepositoryError, RepositoryResult};
