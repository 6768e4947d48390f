//! # md-workflow
//!
//! The job pipeline as plain values:
//!
//! - [`stage`]: the fixed stage order and the status codes each stage owns
//! - [`stepper`]: `JobStepper`, the wizard state machine
//! - [`payments`]: payment plan drafting and finance close reconciliation
//! - [`reservation`]: stock picking, shortfalls and stock health
//!
//! Nothing here performs I/O; the server and the client both build on it.

pub mod error;
pub mod payments;
pub mod reservation;
pub mod stage;
pub mod stepper;

pub use error::*;
pub use payments::*;
pub use reservation::*;
pub use stage::*;
pub use stepper::*;
