use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use upgrades_types::env_utils::non_blank_or;

use crate::manifest::ManifestStore;
use crate::paths::DEFAULT_MANIFEST_DIR;

/// Where manifests live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ManifestConfig {
    pub root: PathBuf,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_MANIFEST_DIR),
        }
    }
}

impl ManifestConfig {
    /// Environment variable overriding [`ManifestConfig::root`].
    pub const ROOT_VAR: &'static str = "UPGRADES_MANIFEST_DIR";

    /// Default config with the root overridden by `UPGRADES_MANIFEST_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ManifestConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            root: PathBuf::from(non_blank_or(lookup(Self::ROOT_VAR), DEFAULT_MANIFEST_DIR)),
        }
    }

    pub fn store(&self) -> ManifestStore {
        ManifestStore::new(self.root.clone())
    }
}
