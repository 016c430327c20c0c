//! Error types
//!
//! Defines domain-specific error types for the transfer subsystem. The
//! textual form of a driver error is forwarded verbatim into the reply
//! sent to the client, so `Display` output is written to be shown.

use std::fmt;
use std::io;

/// Storage driver errors
#[derive(Debug)]
pub enum DriverError {
    FileNotFound(String),
    PermissionDenied(String),
    InvalidPath(String),
    IoError(io::Error),
    Other(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::FileNotFound(p) => write!(f, "File not found: {}", p),
            DriverError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            DriverError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            DriverError::IoError(e) => write!(f, "IO error: {}", e),
            DriverError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<io::Error> for DriverError {
    fn from(error: io::Error) -> Self {
        DriverError::IoError(error)
    }
}

/// Transfer executor errors
///
/// Either the driver refused to hand out a file handle, or the byte copy
/// itself failed. `Display` forwards the underlying cause unchanged.
#[derive(Debug)]
pub enum TransferError {
    Driver(DriverError),
    Io(io::Error),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Driver(e) => write!(f, "{}", e),
            TransferError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<DriverError> for TransferError {
    fn from(error: DriverError) -> Self {
        TransferError::Driver(error)
    }
}

impl From<io::Error> for TransferError {
    fn from(error: io::Error) -> Self {
        TransferError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let e = DriverError::FileNotFound("/a.txt".to_string());
        assert_eq!(e.to_string(), "File not found: /a.txt");
    }

    #[test]
    fn test_transfer_error_forwards_cause_verbatim() {
        let e = TransferError::from(DriverError::PermissionDenied("/b".to_string()));
        assert_eq!(e.to_string(), "Permission denied: /b");

        let e = TransferError::from(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"));
        assert_eq!(e.to_string(), "peer reset");
    }
}
