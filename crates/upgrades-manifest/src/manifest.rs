//! Manifest handles.
//!
//! [`ManifestStore`] is the session-scoped factory: it owns the manifest root
//! and hands out a [`Manifest`] per chain id. Handles are cheap, hold no open
//! files, and two handles for the same chain point at the same file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::data::ManifestData;
use crate::error::ManifestError;
use crate::lock::ManifestLock;
use crate::normalize::normalize_manifest_data;
use crate::paths::{atomic_write_json, lock_path, manifest_path, DEFAULT_MANIFEST_DIR};

/// Factory for per-network manifests under one root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestStore {
    root: PathBuf,
}

impl Default for ManifestStore {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_DIR)
    }
}

impl ManifestStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest for `chain_id`.
    pub fn for_network(&self, chain_id: u64) -> Manifest {
        Manifest {
            chain_id,
            file: manifest_path(&self.root, chain_id),
        }
    }
}

/// Handle to one network's manifest file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    chain_id: u64,
    file: PathBuf,
}

impl Manifest {
    /// Manifest for `chain_id` under the default root.
    pub fn new(chain_id: u64) -> Self {
        ManifestStore::default().for_network(chain_id)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn lock_file(&self) -> PathBuf {
        lock_path(&self.file)
    }

    /// Load and normalize the manifest, or an empty one if none exists yet.
    pub fn read(&self) -> Result<ManifestData, ManifestError> {
        let text = match std::fs::read_to_string(&self.file) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %self.file.display(), "no manifest yet");
                return Ok(ManifestData::new());
            }
            Err(e) => return Err(ManifestError::io(&self.file, e)),
        };
        let raw: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| ManifestError::Parse {
                path: self.file.clone(),
                source: e,
            })?;
        let data = normalize_manifest_data(&raw)?;
        debug!(
            file = %self.file.display(),
            impls = data.impls.len(),
            proxies = data.proxies.len(),
            "read manifest"
        );
        Ok(data)
    }

    /// Persist `data` atomically.
    pub fn write(&self, data: &ManifestData) -> Result<(), ManifestError> {
        atomic_write_json(&self.file, data)?;
        debug!(file = %self.file.display(), "wrote manifest");
        Ok(())
    }

    /// Take the exclusive lock, blocking until it is free.
    pub fn lock(&self) -> Result<ManifestLock, ManifestError> {
        ManifestLock::acquire(self.lock_file())
    }

    /// Read-modify-write under the exclusive lock.
    ///
    /// `mutator` sees the current data. If it fails, nothing is written. The
    /// file is replaced only when the data changed (or did not exist yet), and
    /// the lock is released on every path.
    pub fn locked_update<T, E, F>(&self, mutator: F) -> Result<T, E>
    where
        F: FnOnce(&mut ManifestData) -> Result<T, E>,
        E: From<ManifestError>,
    {
        let _lock = self.lock()?;
        let original = self.read()?;
        let mut data = original.clone();
        let output = mutator(&mut data)?;
        if data != original || !self.file.exists() {
            self.write(&data)?;
        } else {
            debug!(file = %self.file.display(), "manifest unchanged");
        }
        Ok(output)
    }

    /// [`Manifest::locked_update`] on the blocking pool.
    pub async fn locked_update_async<T, E, F>(&self, mutator: F) -> Result<T, E>
    where
        F: FnOnce(&mut ManifestData) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<ManifestError> + Send + 'static,
    {
        let manifest = self.clone();
        match tokio::task::spawn_blocking(move || manifest.locked_update(mutator)).await {
            Ok(result) => result,
            Err(e) => Err(ManifestError::Task(e.to_string()).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use upgrades_types::{Address, ProxyDeployment, ProxyKind};

    #[test]
    fn test_file_names() {
        assert_eq!(Manifest::new(1).file(), Path::new(".openzeppelin/mainnet.json"));
        assert_eq!(
            Manifest::new(55555).file(),
            Path::new(".openzeppelin/unknown-55555.json")
        );
        assert_eq!(Manifest::new(1), ManifestStore::default().for_network(1));
    }

    #[test]
    fn test_read_missing_is_empty() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(1);
        assert_eq!(manifest.read().unwrap(), ManifestData::new());
        assert!(!manifest.file().exists());
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(5);
        let mut data = ManifestData::new();
        data.proxies
            .push(ProxyDeployment::new(Address::repeat_byte(1), ProxyKind::Uups));

        manifest.write(&data).unwrap();
        assert_eq!(manifest.read().unwrap(), data);
        assert!(std::fs::read_to_string(manifest.file()).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_read_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(1);
        std::fs::write(manifest.file(), "{ not json").unwrap();
        assert!(matches!(manifest.read(), Err(ManifestError::Parse { .. })));

        std::fs::write(manifest.file(), r#"{"manifestVersion":"1.0"}"#).unwrap();
        assert!(matches!(
            manifest.read(),
            Err(ManifestError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_locked_update_persists() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(1);

        let count = manifest
            .locked_update(|data| {
                data.proxies
                    .push(ProxyDeployment::new(Address::repeat_byte(1), ProxyKind::Beacon));
                Ok::<_, ManifestError>(data.proxies.len())
            })
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(manifest.read().unwrap().proxies.len(), 1);
        // Lock was released.
        assert!(ManifestLock::try_acquire(manifest.lock_file()).unwrap().is_some());
    }

    #[test]
    fn test_failed_mutator_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(1);
        manifest.write(&ManifestData::new()).unwrap();
        let before = std::fs::read(manifest.file()).unwrap();

        let result: Result<(), ManifestError> = manifest.locked_update(|data| {
            data.proxies
                .push(ProxyDeployment::new(Address::repeat_byte(1), ProxyKind::Uups));
            Err(ManifestError::Malformed("refused".into()))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read(manifest.file()).unwrap(), before);
        assert!(ManifestLock::try_acquire(manifest.lock_file()).unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_async_updates_do_not_lose_writes() {
        let tmp = TempDir::new().unwrap();
        let manifest = ManifestStore::new(tmp.path()).for_network(1);

        let tasks: Vec<_> = (1..=16u8)
            .map(|i| {
                let manifest = manifest.clone();
                tokio::spawn(async move {
                    manifest
                        .locked_update_async(move |data| {
                            data.proxies
                                .push(ProxyDeployment::new(Address::repeat_byte(i), ProxyKind::Uups));
                            Ok::<_, ManifestError>(())
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let data = manifest.read().unwrap();
        assert_eq!(data.proxies.len(), 16);
        for i in 1..=16u8 {
            assert!(data.proxy_by_address(&Address::repeat_byte(i)).is_some());
        }
    }
}
