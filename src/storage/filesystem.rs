//! Module `filesystem`
//!
//! Filesystem-backed `StorageDriver` rooted at a server directory.
//! Absolute virtual paths (`/dir/file`) map onto real paths under the
//! root; traversal outside the root is refused.

use log::debug;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::client::Session;
use crate::error::DriverError;
use crate::storage::{FileInfo, OpenMode, StorageDriver};

pub struct FsDriver {
    root: PathBuf,
}

impl FsDriver {
    /// Creates a driver rooted at the given directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Maps a virtual absolute path onto the real path under the root.
    fn real_path(&self, virtual_path: &str) -> Result<PathBuf, DriverError> {
        if virtual_path.contains("..") {
            return Err(DriverError::InvalidPath(virtual_path.to_string()));
        }
        Ok(self.root.join(virtual_path.trim_start_matches('/')))
    }

    fn map_io_error(err: io::Error, path: &str) -> DriverError {
        match err.kind() {
            io::ErrorKind::NotFound => DriverError::FileNotFound(path.to_string()),
            io::ErrorKind::PermissionDenied => DriverError::PermissionDenied(path.to_string()),
            _ => DriverError::IoError(err),
        }
    }
}

impl StorageDriver for FsDriver {
    type File = File;

    fn open_file(
        &self,
        _session: &Session,
        path: &str,
        mode: OpenMode,
    ) -> Result<File, DriverError> {
        let real = self.real_path(path)?;
        debug!("Opening {} ({:?})", real.display(), mode);
        let result = match mode {
            OpenMode::Read => OpenOptions::new().read(true).open(&real),
            OpenMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&real),
            OpenMode::Append => OpenOptions::new()
                .write(true)
                .create(true)
                .append(true)
                .open(&real),
        };
        result.map_err(|e| Self::map_io_error(e, path))
    }

    fn delete_file(&self, _session: &Session, path: &str) -> Result<(), DriverError> {
        let real = self.real_path(path)?;
        debug!("Removing {}", real.display());
        fs::remove_file(&real).map_err(|e| Self::map_io_error(e, path))
    }

    fn file_info(&self, _session: &Session, path: &str) -> Result<FileInfo, DriverError> {
        let real = self.real_path(path)?;
        let metadata = fs::metadata(&real).map_err(|e| Self::map_io_error(e, path))?;
        let modified = metadata.modified().map_err(DriverError::IoError)?;
        Ok(FileInfo {
            size: metadata.len(),
            modified,
        })
    }

    fn rename_file(&self, _session: &Session, src: &str, dst: &str) -> Result<(), DriverError> {
        let real_src = self.real_path(src)?;
        let real_dst = self.real_path(dst)?;
        debug!("Renaming {} to {}", real_src.display(), real_dst.display());
        fs::rename(&real_src, &real_dst).map_err(|e| Self::map_io_error(e, src))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_round_trip() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        let mut file = driver
            .open_file(&session, "/hello.txt", OpenMode::Write)
            .unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);

        let mut file = driver
            .open_file(&session, "/hello.txt", OpenMode::Read)
            .unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        assert_eq!(content, "hello world");
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        let mut file = driver
            .open_file(&session, "/log.txt", OpenMode::Write)
            .unwrap();
        file.write_all(b"first;").unwrap();
        drop(file);

        let mut file = driver
            .open_file(&session, "/log.txt", OpenMode::Append)
            .unwrap();
        file.write_all(b"second").unwrap();
        drop(file);

        assert_eq!(
            fs::read(root.path().join("log.txt")).unwrap(),
            b"first;second"
        );
    }

    #[test]
    fn test_file_info_reports_size() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        fs::write(root.path().join("data.bin"), vec![0u8; 42]).unwrap();
        let info = driver.file_info(&session, "/data.bin").unwrap();
        assert_eq!(info.size, 42);
    }

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        let err = driver.file_info(&session, "/missing.txt").unwrap_err();
        assert!(matches!(err, DriverError::FileNotFound(_)));
        let err = driver.delete_file(&session, "/missing.txt").unwrap_err();
        assert!(matches!(err, DriverError::FileNotFound(_)));
    }

    #[test]
    fn test_rename_moves_file() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        fs::write(root.path().join("old.txt"), b"content").unwrap();
        driver
            .rename_file(&session, "/old.txt", "/new.txt")
            .unwrap();
        assert!(!root.path().join("old.txt").exists());
        assert_eq!(fs::read(root.path().join("new.txt")).unwrap(), b"content");
    }

    #[test]
    fn test_traversal_is_refused() {
        let root = TempDir::new().unwrap();
        let driver = FsDriver::new(root.path());
        let session = Session::default();

        let err = driver
            .open_file(&session, "/../escape.txt", OpenMode::Write)
            .unwrap_err();
        assert!(matches!(err, DriverError::InvalidPath(_)));
    }
}
