//! Path utilities for the manifest directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ManifestError;
use crate::network::manifest_file_name;

/// Manifest root relative to the project directory.
pub const DEFAULT_MANIFEST_DIR: &str = ".openzeppelin";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Get the manifest file path for a chain.
pub fn manifest_path(root: &Path, chain_id: u64) -> PathBuf {
    root.join(manifest_file_name(chain_id))
}

/// Get the lock file path guarding `file`.
pub fn lock_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Ensure all parent directories exist for a path.
pub fn ensure_parent_dirs(path: &Path) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| ManifestError::io(parent, e))?;
        }
    }
    Ok(())
}

/// Write a file atomically (write and sync a temp file, then rename).
///
/// Readers see either the old contents or the new ones, never a prefix.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), ManifestError> {
    ensure_parent_dirs(path)?;
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let tmp_path = PathBuf::from(tmp_name);

    let result = (|| {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        std::fs::rename(&tmp_path, path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(ManifestError::io(path, e));
    }
    Ok(())
}

/// Write a JSON file atomically (pretty-printed, trailing newline).
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ManifestError> {
    let mut json = serde_json::to_vec_pretty(value).map_err(ManifestError::Serialize)?;
    json.push(b'\n');
    atomic_write(path, &json)
}
