//! Deployment and deployment simulation.
//!
//! Real and simulated deployments share [`prepare_deploy`], so the layout and
//! version validated for an imported contract are exactly the ones a real
//! deployment of the same factory and arguments would record. The only
//! difference is where the address comes from, expressed by [`DeployMode`]:
//!
//! - `Broadcast`: a [`Deployer`] sends the creation transaction
//! - `Simulate`: the contract already lives at a known address
//!
//! The `stage_*` functions produce records without touching the manifest;
//! the `simulate_*` and `deploy_*` functions also commit them.

use alloy_primitives::{Address, Bytes};
use tracing::debug;
use upgrades_manifest::Manifest;
use upgrades_types::{Deployment, ImplDeployment, ProxyKind, StorageLayout};

use crate::artifact::{ContractArtifact, ContractFactory};
use crate::error::ImportError;
use crate::impl_store::{register_admin, register_impl};
use crate::options::ImportOptions;
use crate::validation::{assert_upgrade_safe, validate_artifact, ValidationReport};
use crate::version::Version;

/// Sends creation transactions on behalf of the engine.
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Deploy `creation_code` and return where it landed.
    ///
    /// `from` is the factory's signer, if it names one.
    async fn deploy(&self, creation_code: Bytes, from: Option<Address>)
        -> anyhow::Result<Deployment>;
}

/// Where a staged contract's address comes from.
#[derive(Clone, Copy)]
pub enum DeployMode<'a> {
    Broadcast(&'a dyn Deployer),
    Simulate(Address),
}

impl std::fmt::Debug for DeployMode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeployMode::Broadcast(_) => f.write_str("Broadcast"),
            DeployMode::Simulate(address) => f.debug_tuple("Simulate").field(address).finish(),
        }
    }
}

/// Everything needed to deploy (or recognize) one contract build.
#[derive(Debug, Clone)]
pub struct PreparedDeploy {
    pub contract_name: String,
    pub version: Version,
    pub layout: StorageLayout,
    pub report: ValidationReport,
    /// Creation bytecode followed by the constructor arguments.
    pub creation_code: Bytes,
}

/// Validate an artifact and derive its version and creation code.
///
/// Broadcasting needs creation bytecode. A simulation only records where the
/// contract already lives, so an artifact without bytecode is accepted there.
pub fn prepare_deploy(
    artifact: &ContractArtifact,
    constructor_args: &[u8],
    mode: DeployMode<'_>,
) -> Result<PreparedDeploy, ImportError> {
    if artifact.bytecode.is_empty() && matches!(mode, DeployMode::Broadcast(_)) {
        return Err(missing_bytecode(artifact));
    }

    let version = Version::compute(&artifact.bytecode, constructor_args, &artifact.storage_layout)
        .map_err(|e| ImportError::InvalidArtifact {
            contract: artifact.contract_name.clone(),
            reason: format!("storage layout is not serializable: {e}"),
        })?;

    let mut creation_code = artifact.bytecode.to_vec();
    creation_code.extend_from_slice(constructor_args);

    Ok(PreparedDeploy {
        contract_name: artifact.contract_name.clone(),
        version,
        layout: artifact.storage_layout.clone(),
        report: validate_artifact(artifact),
        creation_code: creation_code.into(),
    })
}

fn missing_bytecode(artifact: &ContractArtifact) -> ImportError {
    ImportError::InvalidArtifact {
        contract: artifact.contract_name.clone(),
        reason: "no creation bytecode".to_string(),
    }
}

/// Implementation record ready to commit.
#[derive(Debug, Clone)]
pub struct StagedImpl {
    pub version: Version,
    pub record: ImplDeployment,
    pub report: ValidationReport,
}

impl StagedImpl {
    pub fn version_key(&self) -> &str {
        self.version.manifest_key()
    }

    pub fn address(&self) -> Address {
        self.record.address
    }
}

/// Admin record ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAdmin {
    pub record: Deployment,
}

async fn place(
    mode: DeployMode<'_>,
    prepared: &PreparedDeploy,
    sender: Option<Address>,
) -> Result<Deployment, ImportError> {
    let contract = prepared.contract_name.as_str();
    match mode {
        DeployMode::Simulate(address) => {
            debug!(contract, %address, sender = ?sender, "simulated deployment");
            Ok(Deployment::new(address))
        }
        DeployMode::Broadcast(deployer) => {
            let deployment = deployer.deploy(prepared.creation_code.clone(), sender).await?;
            debug!(contract, address = %deployment.address, sender = ?sender, "deployed");
            Ok(deployment)
        }
    }
}

async fn stage_prepared(
    prepared: PreparedDeploy,
    mode: DeployMode<'_>,
    sender: Option<Address>,
) -> Result<StagedImpl, ImportError> {
    let placed = place(mode, &prepared, sender).await?;
    let mut record = ImplDeployment::new(placed.address, prepared.layout);
    record.tx_hash = placed.tx_hash;
    Ok(StagedImpl {
        version: prepared.version,
        record,
        report: prepared.report,
    })
}

/// Validate an implementation for `kind` and produce its record.
///
/// Implementations always need creation bytecode: it keys their version.
pub async fn stage_impl(
    factory: &dyn ContractFactory,
    options: &ImportOptions,
    kind: ProxyKind,
    mode: DeployMode<'_>,
) -> Result<StagedImpl, ImportError> {
    let artifact = factory.artifact();
    if artifact.bytecode.is_empty() {
        return Err(missing_bytecode(artifact));
    }
    let prepared = prepare_deploy(artifact, &options.constructor_args, mode)?;
    assert_upgrade_safe(&prepared.report, kind, &options.validation)?;
    stage_prepared(prepared, mode, factory.signer()).await
}

/// Produce an admin record.
///
/// Admins are not proxied, so no upgrade-safety assertion applies.
pub async fn stage_admin(
    factory: &dyn ContractFactory,
    mode: DeployMode<'_>,
) -> Result<StagedAdmin, ImportError> {
    let prepared = prepare_deploy(factory.artifact(), &[], mode)?;
    let record = place(mode, &prepared, factory.signer()).await?;
    Ok(StagedAdmin { record })
}

async fn commit_impl(manifest: &Manifest, staged: &StagedImpl) -> Result<(), ImportError> {
    let key = staged.version_key().to_string();
    let record = staged.record.clone();
    manifest
        .locked_update_async(move |data| register_impl(data, &key, record).map(|_| ()))
        .await
}

/// Validate the implementation at `address` and record it.
pub async fn simulate_deploy_impl(
    manifest: &Manifest,
    factory: &dyn ContractFactory,
    options: &ImportOptions,
    kind: ProxyKind,
    address: Address,
) -> Result<StagedImpl, ImportError> {
    let staged = stage_impl(factory, options, kind, DeployMode::Simulate(address)).await?;
    commit_impl(manifest, &staged).await?;
    Ok(staged)
}

/// Record the admin at `address`; returns the admin the manifest now holds.
pub async fn simulate_deploy_admin(
    manifest: &Manifest,
    factory: &dyn ContractFactory,
    address: Address,
) -> Result<Deployment, ImportError> {
    let staged = stage_admin(factory, DeployMode::Simulate(address)).await?;
    manifest
        .locked_update_async(move |data| {
            register_admin(data, staged.record.clone())?;
            Ok(data.admin.clone().unwrap_or(staged.record))
        })
        .await
}

/// Deploy an implementation unless this version is already recorded.
pub async fn deploy_impl(
    manifest: &Manifest,
    factory: &dyn ContractFactory,
    options: &ImportOptions,
    kind: ProxyKind,
    deployer: &dyn Deployer,
) -> Result<ImplDeployment, ImportError> {
    let mode = DeployMode::Broadcast(deployer);
    let prepared = prepare_deploy(factory.artifact(), &options.constructor_args, mode)?;
    assert_upgrade_safe(&prepared.report, kind, &options.validation)?;

    if let Some(existing) = manifest.read()?.impl_by_version(prepared.version.manifest_key()) {
        debug!(
            contract = %prepared.contract_name,
            address = %existing.address,
            "reusing recorded implementation"
        );
        return Ok(existing.clone());
    }

    let staged = stage_prepared(prepared, mode, factory.signer()).await?;
    commit_impl(manifest, &staged).await?;
    Ok(staged.record)
}

/// Deploy an admin unless one is already recorded.
pub async fn deploy_admin(
    manifest: &Manifest,
    factory: &dyn ContractFactory,
    deployer: &dyn Deployer,
) -> Result<Deployment, ImportError> {
    if let Some(existing) = manifest.read()?.admin {
        debug!(address = %existing.address, "reusing recorded admin");
        return Ok(existing);
    }

    let staged = stage_admin(factory, DeployMode::Broadcast(deployer)).await?;
    manifest
        .locked_update_async(move |data| {
            register_admin(data, staged.record.clone())?;
            Ok(data.admin.clone().unwrap_or(staged.record))
        })
        .await
}
