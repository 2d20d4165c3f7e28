//! Upgrade-safety validation, deployment simulation and force import.
//!
//! This crate provides:
//! - [`artifact`]: Contract artifacts, factories and handles
//! - [`validation`]: Static upgrade-safety checks
//! - [`version`]: Bytecode fingerprints keying the manifest
//! - [`kind`]: Proxy kind inference and resolution
//! - [`impl_store`]: Manifest mutations with deduplication and clash detection
//! - [`deploy`]: Shared preparation for real and simulated deployments
//! - [`force_import`]: The import workflow
//!
//! # Example
//!
//! ```ignore
//! use upgrades_chain::JsonRpcProvider;
//! use upgrades_core::{ArtifactFactory, ForceImporter, ImportOptions};
//! use upgrades_manifest::ManifestConfig;
//!
//! let importer = ForceImporter::new(JsonRpcProvider::from_env(), ManifestConfig::from_env().store());
//! let factory = ArtifactFactory::from_file("artifacts/Box.json".as_ref())?;
//! let handle = importer.force_import(proxy, &factory, &ImportOptions::default()).await?;
//! ```

pub mod artifact;
pub mod deploy;
pub mod error;
pub mod force_import;
pub mod impl_store;
pub mod kind;
pub mod options;
pub mod validation;
pub mod version;

pub use artifact::{ArtifactFactory, ContractArtifact, ContractFactory, ContractHandle};
pub use deploy::{
    deploy_admin, deploy_impl, prepare_deploy, simulate_deploy_admin, simulate_deploy_impl,
    stage_admin, stage_impl, DeployMode, Deployer, PreparedDeploy, StagedAdmin, StagedImpl,
};
pub use error::ImportError;
pub use force_import::{ForceImporter, ImportOutcome};
pub use impl_store::{add_proxy, register_admin, register_impl, AdminRegistration, ImplRegistration};
pub use kind::{infer_proxy_kind, resolve_proxy_kind, KindInference};
pub use options::{ImportOptions, ValidationOptions};
pub use validation::{
    assert_upgrade_safe, validate_artifact, ValidationData, ValidationError, ValidationErrorKind,
    ValidationErrors, ValidationReport,
};
pub use version::{strip_metadata, Version};
