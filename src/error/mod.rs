//! Error handling
//!
//! Domain-specific error types for the transfer subsystem.

pub mod types;

pub use types::{DriverError, TransferError};
