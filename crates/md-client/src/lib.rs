//! # md-client
//!
//! Data access used by the web client: REST calls against the MD service,
//! the cached mock dataset behind the screens the service does not cover,
//! and a stepper session that drives one job through its stages.

pub mod data_service;
pub mod error;
pub mod local;
pub mod mock;
pub mod stepper;

pub use data_service::{DataService, MovementResult, UploadFile};
pub use error::{ClientError, ClientResult};
pub use local::{ReservationOptions, MOVEMENT_LIMIT};
pub use mock::{MockCache, MockData};
pub use stepper::JobStepperSession;
