//! Exclusive manifest lock.
//!
//! The lock is an advisory `flock(LOCK_EX)` on a sibling `<manifest>.lock`
//! file. It serializes writers across tasks, threads and processes; each
//! acquisition opens its own handle, so two holders in one process still
//! exclude each other.
//!
//! # Example
//!
//! ```ignore
//! use upgrades_manifest::ManifestLock;
//!
//! let lock = ManifestLock::acquire(".openzeppelin/mainnet.json.lock")?;
//! // ... read, mutate, write ...
//! // Lock released on drop
//! ```

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::ManifestError;
use crate::paths::ensure_parent_dirs;

/// Held exclusive lock over one manifest.
#[derive(Debug)]
pub struct ManifestLock {
    file: File,
    path: PathBuf,
}

fn open_lock_file(path: &Path) -> Result<File, ManifestError> {
    ensure_parent_dirs(path)?;
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)
        .map_err(|e| ManifestError::Lock {
            path: path.to_path_buf(),
            source: e,
        })
}

impl ManifestLock {
    /// Acquire the lock, blocking until it is available.
    pub fn acquire<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref().to_path_buf();
        let file = open_lock_file(&path)?;

        file.lock_exclusive().map_err(|e| ManifestError::Lock {
            path: path.clone(),
            source: e,
        })?;

        debug!(path = %path.display(), "acquired manifest lock");
        Ok(Self { file, path })
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns:
    /// - `Ok(Some(lock))` if the lock was acquired
    /// - `Ok(None)` if someone else holds it
    /// - `Err` on I/O errors
    pub fn try_acquire<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ManifestError> {
        let path = path.as_ref().to_path_buf();
        let file = open_lock_file(&path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired manifest lock");
                Ok(Some(Self { file, path }))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                debug!(path = %path.display(), "manifest lock already held");
                Ok(None)
            }
            Err(e) => Err(ManifestError::Lock { path, source: e }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        // Closing the handle releases the lock too; unlock early so waiters
        // wake before the file is closed.
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "released manifest lock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sub").join("mainnet.json.lock");

        let lock = ManifestLock::acquire(&path).unwrap();
        assert!(path.exists());
        assert_eq!(lock.path(), path.as_path());
        assert!(ManifestLock::try_acquire(&path).unwrap().is_none());

        drop(lock);
        assert!(ManifestLock::try_acquire(&path).unwrap().is_some());
    }

    #[test]
    fn test_blocking_acquire_waits_for_holder() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wait.lock");

        let held = ManifestLock::acquire(&path).unwrap();
        let waiter_path = path.clone();
        let waiter = std::thread::spawn(move || {
            let _lock = ManifestLock::acquire(&waiter_path).unwrap();
        });

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!waiter.is_finished());
        drop(held);
        waiter.join().unwrap();
    }
}
