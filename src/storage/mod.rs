//! Storage backend boundary
//!
//! The transfer subsystem talks to storage only through the
//! `StorageDriver` trait; `FsDriver` is the filesystem implementation
//! shipped with the crate.

pub mod filesystem;

pub use filesystem::FsDriver;

use std::io::{Read, Write};
use std::time::SystemTime;

use crate::client::Session;
use crate::error::DriverError;

/// How a file handle is opened for a transfer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only, for downloads
    Read,
    /// Write, truncating any existing content
    Write,
    /// Write, appending to existing content
    Append,
}

/// Metadata reported for a stored file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub size: u64,
    pub modified: SystemTime,
}

/// Abstract storage backend invoked by the command handlers.
///
/// Error text is forwarded verbatim to clients inside reply messages, so
/// implementations should produce messages that are fit to show.
pub trait StorageDriver {
    /// Open file handle. A handle is scoped to a single command
    /// invocation and released by drop on every exit path.
    type File: Read + Write + Send;

    /// Opens `path` in the given mode.
    fn open_file(
        &self,
        session: &Session,
        path: &str,
        mode: OpenMode,
    ) -> Result<Self::File, DriverError>;

    /// Removes the file at `path`.
    fn delete_file(&self, session: &Session, path: &str) -> Result<(), DriverError>;

    /// Reports size and modification time for `path`.
    fn file_info(&self, session: &Session, path: &str) -> Result<FileInfo, DriverError>;

    /// Moves `src` to `dst`.
    fn rename_file(&self, session: &Session, src: &str, dst: &str) -> Result<(), DriverError>;
}
