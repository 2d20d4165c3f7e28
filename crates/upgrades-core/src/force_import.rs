//! Bringing existing deployments under manifest management.
//!
//! [`ForceImporter::force_import`] takes the address of a proxy or beacon
//! deployed outside this tool and records it as if this tool had deployed it:
//!
//! ```text
//! address ──► implementation slot set? ──yes──► proxy path
//!                    │ no
//!                    ▼
//!             implementation() answers? ──yes──► beacon path
//!                    │ no
//!                    ▼
//!               Unsupported
//! ```
//!
//! All chain reads and validation happen first. The records they produce are
//! committed together in a single locked update, so a failure at any earlier
//! step leaves the manifest exactly as it was.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{debug, info};
use upgrades_chain::{
    eip1967, get_implementation_address_from_beacon, is_beacon, ChainProvider,
};
use upgrades_manifest::{Manifest, ManifestStore};
use upgrades_types::{ProxyDeployment, ProxyKind};

use crate::artifact::{ArtifactFactory, ContractFactory, ContractHandle};
use crate::deploy::{stage_admin, stage_impl, DeployMode, StagedAdmin, StagedImpl};
use crate::error::ImportError;
use crate::impl_store::{add_proxy, register_admin, register_impl};
use crate::kind::{infer_proxy_kind, resolve_proxy_kind};
use crate::options::ImportOptions;
use crate::validation::ValidationData;

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub handle: ContractHandle,
    /// Resolved proxy kind; `None` when a beacon itself was imported.
    pub kind: Option<ProxyKind>,
    pub implementation: Address,
    /// Admin recorded in the manifest after a transparent import.
    pub admin: Option<Address>,
}

/// Imports proxies and beacons on one network.
pub struct ForceImporter<P> {
    provider: P,
    store: ManifestStore,
    admin_factory: Arc<dyn ContractFactory>,
}

impl<P: ChainProvider> ForceImporter<P> {
    pub fn new(provider: P, store: ManifestStore) -> Self {
        Self {
            provider,
            store,
            admin_factory: Arc::new(ArtifactFactory::proxy_admin()),
        }
    }

    /// Use `factory` for admin contracts instead of the built-in proxy admin.
    pub fn with_admin_factory(mut self, factory: Arc<dyn ContractFactory>) -> Self {
        self.admin_factory = factory;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Manifest of the provider's network.
    pub async fn manifest(&self) -> Result<Manifest, ImportError> {
        let chain_id = self.provider.chain_id().await?;
        Ok(self.store.for_network(chain_id))
    }

    /// Import `address` and return a handle bound to it.
    pub async fn force_import(
        &self,
        address: Address,
        factory: &dyn ContractFactory,
        options: &ImportOptions,
    ) -> Result<ContractHandle, ImportError> {
        self.force_import_detailed(address, factory, options)
            .await
            .map(|outcome| outcome.handle)
    }

    /// Like [`ForceImporter::force_import`], with what was resolved.
    pub async fn force_import_detailed(
        &self,
        address: Address,
        factory: &dyn ContractFactory,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, ImportError> {
        let manifest = self.manifest().await?;

        if let Some(implementation) =
            eip1967::get_implementation_address_from_proxy(&self.provider, address).await?
        {
            debug!(%address, %implementation, "importing proxy");
            self.import_proxy(&manifest, address, implementation, factory, options)
                .await
        } else if is_beacon(&self.provider, address).await? {
            debug!(%address, "importing beacon");
            self.import_beacon(&manifest, address, factory, options).await
        } else {
            Err(ImportError::Unsupported { address })
        }
    }

    async fn import_proxy(
        &self,
        manifest: &Manifest,
        proxy: Address,
        implementation: Address,
        factory: &dyn ContractFactory,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, ImportError> {
        // Without an explicit kind the implementation is checked as transparent.
        let check_kind = options.kind.unwrap_or(ProxyKind::Transparent);
        let staged_impl = stage_impl(
            factory,
            options,
            check_kind,
            DeployMode::Simulate(implementation),
        )
        .await?;

        let kind = match options.kind {
            Some(kind) => kind,
            None => {
                let beacon_proxy = eip1967::is_beacon_proxy(&self.provider, proxy).await?;
                let mut validations = ValidationData::new();
                validations.insert(&staged_impl.version, staged_impl.report.clone());
                let inference = infer_proxy_kind(&validations, &staged_impl.version);
                resolve_proxy_kind(None, beacon_proxy, inference)
            }
        };

        let staged_admin = match kind {
            ProxyKind::Transparent => {
                let admin = eip1967::get_admin_address(&self.provider, proxy).await?;
                Some(stage_admin(self.admin_factory.as_ref(), DeployMode::Simulate(admin)).await?)
            }
            ProxyKind::Uups | ProxyKind::Beacon => None,
        };

        let admin = commit(manifest, Some(&staged_impl), staged_admin, Some((proxy, kind))).await?;
        info!(%proxy, %kind, %implementation, "imported proxy");

        Ok(ImportOutcome {
            handle: factory.attach(proxy),
            kind: Some(kind),
            implementation,
            admin,
        })
    }

    async fn import_beacon(
        &self,
        manifest: &Manifest,
        beacon: Address,
        factory: &dyn ContractFactory,
        options: &ImportOptions,
    ) -> Result<ImportOutcome, ImportError> {
        let implementation = get_implementation_address_from_beacon(&self.provider, beacon).await?;
        let check_kind = options.kind.unwrap_or(ProxyKind::Beacon);
        let staged_impl = stage_impl(
            factory,
            options,
            check_kind,
            DeployMode::Simulate(implementation),
        )
        .await?;

        commit(manifest, Some(&staged_impl), None, None).await?;
        info!(%beacon, %implementation, "imported beacon");

        Ok(ImportOutcome {
            handle: ContractHandle::upgradeable_beacon(beacon),
            kind: None,
            implementation,
            admin: None,
        })
    }
}

/// Commit staged records in one locked update; returns the recorded admin.
async fn commit(
    manifest: &Manifest,
    staged_impl: Option<&StagedImpl>,
    staged_admin: Option<StagedAdmin>,
    proxy: Option<(Address, ProxyKind)>,
) -> Result<Option<Address>, ImportError> {
    let impl_entry = staged_impl.map(|s| (s.version_key().to_string(), s.record.clone()));

    manifest
        .locked_update_async(move |data| {
            if let Some((key, record)) = impl_entry {
                register_impl(data, &key, record)?;
            }
            if let Some(admin) = staged_admin {
                register_admin(data, admin.record)?;
            }
            if let Some((address, kind)) = proxy {
                add_proxy(data, ProxyDeployment::new(address, kind))?;
            }
            Ok(data.admin.as_ref().map(|a| a.address).filter(|_| {
                matches!(proxy, Some((_, ProxyKind::Transparent)))
            }))
        })
        .await
}
