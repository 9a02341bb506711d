//! core::lock
//!
//! Exclusive run lock.
//!
//! # Architecture
//!
//! Two certward runs working on the same directories at once could register
//! the same account twice or interleave installer checkpoints. The run lock
//! makes sure only one process drives the workflow at a time.
//!
//! # Storage
//!
//! - `<work_dir>/.certward.lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is held for the entire workflow
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::files::{make_or_verify_dir, PRIVATE_DIR_MODE};
use crate::core::paths::StoragePaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("another certward instance is already running")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// An exclusive lock on the certward working directory.
///
/// The lock is released when this guard is dropped.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    file: Option<File>,
}

impl RunLock {
    /// Attempt to acquire the run lock.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &StoragePaths) -> Result<Self, LockError> {
        make_or_verify_dir(paths.work_dir(), PRIVATE_DIR_MODE).map_err(|e| {
            LockError::CreateFailed(format!(
                "cannot create {}: {}",
                paths.work_dir().display(),
                e
            ))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Best-effort release on drop
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, ConfigFile, DirsConfig};
    use tempfile::TempDir;

    fn test_paths(dir: &Path) -> StoragePaths {
        let flags = ConfigFile {
            dirs: Some(DirsConfig {
                config_dir: Some(dir.join("etc")),
                work_dir: Some(dir.join("work")),
                ..Default::default()
            }),
            ..Default::default()
        };
        StoragePaths::from_config(&Config::resolve(ConfigFile::default(), flags).unwrap())
    }

    #[test]
    fn lock_acquire_creates_work_dir() {
        let temp = TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        let lock = RunLock::acquire(&paths).expect("acquire lock");
        assert!(lock.is_held());
        assert!(lock.path().exists());
        assert_eq!(lock.path(), paths.lock_path());
    }

    #[test]
    fn lock_prevents_second_acquire() {
        let temp = TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        let _lock = RunLock::acquire(&paths).expect("first acquire");
        let result = RunLock::acquire(&paths);
        assert!(matches!(result, Err(LockError::AlreadyLocked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let paths = test_paths(temp.path());

        {
            let lock = RunLock::acquire(&paths).expect("first acquire");
            assert!(lock.is_held());
        }

        let lock = RunLock::acquire(&paths).expect("second acquire");
        assert!(lock.is_held());
    }
}
