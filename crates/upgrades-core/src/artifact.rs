//! Compiled contracts and the factories that hand them to the engine.
//!
//! Compilation happens elsewhere; the engine only needs the facts a compiler
//! can report about a contract: its bytecode, ABI function signatures, a few
//! source-level properties that matter for upgrade safety, and the storage
//! layout.

use std::path::Path;

use alloy_primitives::{Address, Bytes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use upgrades_types::StorageLayout;

use crate::validation::ValidationErrorKind;

/// Build output for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: String,
    /// Creation bytecode.
    pub bytecode: Bytes,
    /// Runtime bytecode.
    pub deployed_bytecode: Bytes,
    /// ABI function signatures, e.g. `upgradeTo(address)`.
    pub functions: Vec<String>,
    /// Declares a non-empty constructor.
    pub has_constructor: bool,
    pub linked_libraries: Vec<String>,
    pub immutable_variables: Vec<String>,
    /// State variables initialized at declaration.
    pub state_variable_assignments: Vec<String>,
    pub storage_layout: StorageLayout,
    /// `@custom:oz-upgrades-unsafe-allow` annotations found in the source.
    pub unsafe_allow: Vec<ValidationErrorKind>,
}

impl ContractArtifact {
    /// Artifact with nothing but a name.
    pub fn named(contract_name: impl Into<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            ..Default::default()
        }
    }

    pub fn has_function(&self, signature: &str) -> bool {
        self.functions.iter().any(|f| f == signature)
    }
}

/// Typed handle to a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractHandle {
    pub address: Address,
    pub contract_name: String,
}

impl ContractHandle {
    pub const UPGRADEABLE_BEACON: &'static str = "UpgradeableBeacon";

    pub fn new(address: Address, contract_name: impl Into<String>) -> Self {
        Self {
            address,
            contract_name: contract_name.into(),
        }
    }

    /// Handle speaking the beacon interface at `address`.
    pub fn upgradeable_beacon(address: Address) -> Self {
        Self::new(address, Self::UPGRADEABLE_BEACON)
    }
}

/// Source of a contract's artifact plus the capabilities tied to it.
pub trait ContractFactory: Send + Sync {
    fn artifact(&self) -> &ContractArtifact;

    /// Account that would send deployments made through this factory.
    fn signer(&self) -> Option<Address> {
        None
    }

    /// Bind the contract's interface to a known address.
    fn attach(&self, address: Address) -> ContractHandle {
        ContractHandle::new(address, self.artifact().contract_name.clone())
    }
}

/// [`ContractFactory`] backed by an in-memory artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFactory {
    artifact: ContractArtifact,
    signer: Option<Address>,
}

impl ArtifactFactory {
    /// Contract name of the built-in admin factory.
    pub const PROXY_ADMIN: &'static str = "ProxyAdmin";

    pub fn new(artifact: ContractArtifact) -> Self {
        Self {
            artifact,
            signer: None,
        }
    }

    /// Factory for the standard proxy admin.
    ///
    /// Carries no bytecode: it can record existing admins but not deploy one.
    pub fn proxy_admin() -> Self {
        Self::new(ContractArtifact::named(Self::PROXY_ADMIN))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))
    }

    pub fn with_signer(mut self, signer: Address) -> Self {
        self.signer = Some(signer);
        self
    }
}

impl ContractFactory for ArtifactFactory {
    fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    fn signer(&self) -> Option<Address> {
        self.signer
    }
}
