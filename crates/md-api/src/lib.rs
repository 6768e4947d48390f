//! # md-api
//!
//! REST handlers for the MD service. Routes mirror the paths the web client
//! calls; errors come back as `{"detail": "..."}`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
