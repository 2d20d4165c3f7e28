//! EVM Upgrades
//!
//! Tracks upgradeable proxy deployments per network and brings existing ones
//! under management:
//!
//! - **Manifest**: One JSON file per chain recording proxies, implementations
//!   (with storage layouts) and the admin, updated under an exclusive lock
//! - **Inspection**: ERC-1967 slot reads and beacon detection through any
//!   [`ChainProvider`]
//! - **Validation**: Upgrade-safety checks on implementation artifacts
//! - **Force import**: Record a proxy or beacon deployed elsewhere, exactly once
//!
//! See [`engine::force_import`] for the import workflow and [`manifest`] for
//! the on-disk format.
//!
//! # Example
//!
//! ```ignore
//! use evm_upgrades::prelude::*;
//!
//! let provider = JsonRpcProvider::from_env();
//! let factory = ArtifactFactory::from_file("artifacts/Box.json".as_ref())?;
//! let handle = evm_upgrades::force_import(provider, proxy, &factory, &ImportOptions::default()).await?;
//! ```

pub use upgrades_chain as chain;
pub use upgrades_core as engine;
pub use upgrades_manifest as manifest;
pub use upgrades_types as types;

pub use upgrades_chain::{ChainProvider, InspectError, JsonRpcProvider, MockProvider, RpcConfig};
pub use upgrades_core::{
    ArtifactFactory, ContractArtifact, ContractFactory, ContractHandle, ForceImporter,
    ImportError, ImportOptions, ImportOutcome, ValidationErrorKind, ValidationOptions,
};
pub use upgrades_manifest::{Manifest, ManifestConfig, ManifestData, ManifestError, ManifestStore};
pub use upgrades_types::{Address, ProxyKind};

/// Common imports.
pub mod prelude {
    pub use crate::{
        Address, ArtifactFactory, ChainProvider, ContractFactory, ContractHandle, ForceImporter,
        ImportError, ImportOptions, JsonRpcProvider, ManifestConfig, ManifestStore, ProxyKind,
    };
}

/// Import `address` into the manifest directory configured by the environment.
///
/// Shorthand for a [`ForceImporter`] over [`ManifestConfig::from_env`].
pub async fn force_import<P: ChainProvider>(
    provider: P,
    address: Address,
    factory: &dyn ContractFactory,
    options: &ImportOptions,
) -> Result<ContractHandle, ImportError> {
    let store = ManifestConfig::from_env().store();
    tracing::debug!(root = %store.root().display(), %address, "force import");
    ForceImporter::new(provider, store)
        .force_import(address, factory, options)
        .await
}
