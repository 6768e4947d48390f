//! # md-documents
//!
//! Job document archive.
//!
//! ## Features
//!
//! - Storage abstraction (local filesystem, in-memory)
//! - Upload with type and MIME checks
//! - Listing by job and document type
//! - Download and best-effort file removal
//!
//! ## Example
//!
//! ```rust,ignore
//! use md_documents::{DocumentService, LocalStorage, UploadParams};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(LocalStorage::new("./md.docs"));
//! let service = DocumentService::new(DocumentRepository::new(dir), storage);
//!
//! let doc = service
//!     .upload(UploadParams::new("JOB-1A2B3C4D", "olcu", "plan.pdf"), bytes)
//!     .await?;
//! ```

pub mod service;
pub mod storage;

pub use service::{
    extension_for, DocumentError, DocumentFilter, DocumentResult, DocumentService, Download,
    UploadParams, ALLOWED_MIME_TYPES,
};
pub use storage::{FileMetadata, LocalStorage, MemoryStorage, Storage, StorageError, StorageResult};
