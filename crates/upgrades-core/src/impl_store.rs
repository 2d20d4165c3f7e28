//! Manifest mutations.
//!
//! Pure functions over [`ManifestData`]; callers run them inside a locked
//! update. Each one refuses to record an address that another entry already
//! claims.

use alloy_primitives::Address;
use tracing::{debug, warn};
use upgrades_manifest::{AddressOwner, ManifestData};
use upgrades_types::{Deployment, ImplDeployment, ProxyDeployment};

use crate::error::ImportError;

/// What [`register_impl`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplRegistration {
    Added,
    /// Same version at a new address.
    AddressAdded,
    /// Already recorded at this address.
    Reused,
}

/// What [`register_admin`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminRegistration {
    Added,
    Reused,
    /// A different admin is already recorded and was kept.
    Mismatch { recorded: Address },
}

fn clash(address: Address, owner: &AddressOwner) -> ImportError {
    let existing = match owner {
        AddressOwner::Admin => "admin".to_string(),
        AddressOwner::Impl { version } => format!("implementation {version}"),
        AddressOwner::Proxy => "proxy".to_string(),
    };
    ImportError::DeploymentClash { address, existing }
}

/// Record an implementation under `version`, deduplicating by version.
pub fn register_impl(
    data: &mut ManifestData,
    version: &str,
    record: ImplDeployment,
) -> Result<ImplRegistration, ImportError> {
    let address = record.address;
    match data.find_address_owner(&address) {
        None => {}
        Some(AddressOwner::Impl { version: ref v }) if v == version => {}
        Some(owner) => return Err(clash(address, &owner)),
    }

    if let Some(existing) = data.impls.get_mut(version) {
        if existing.add_address(address) {
            debug!(%version, %address, "recorded additional address for implementation");
            return Ok(ImplRegistration::AddressAdded);
        }
        debug!(%version, %address, "implementation already recorded");
        return Ok(ImplRegistration::Reused);
    }

    debug!(%version, %address, "recorded implementation");
    data.impls.insert(version.to_string(), record);
    Ok(ImplRegistration::Added)
}

/// Record the network's admin.
pub fn register_admin(
    data: &mut ManifestData,
    admin: Deployment,
) -> Result<AdminRegistration, ImportError> {
    match data.find_address_owner(&admin.address) {
        None | Some(AddressOwner::Admin) => {}
        Some(owner) => return Err(clash(admin.address, &owner)),
    }

    match data.admin {
        None => {
            debug!(address = %admin.address, "recorded admin");
            data.admin = Some(admin);
            Ok(AdminRegistration::Added)
        }
        Some(ref mut recorded) if recorded.address == admin.address => {
            if recorded.tx_hash.is_none() {
                recorded.tx_hash = admin.tx_hash;
            }
            Ok(AdminRegistration::Reused)
        }
        Some(ref recorded) => {
            warn!(
                recorded = %recorded.address,
                found = %admin.address,
                "proxy admin differs from the admin recorded in the manifest; keeping the recorded one"
            );
            Ok(AdminRegistration::Mismatch {
                recorded: recorded.address,
            })
        }
    }
}

/// Append a proxy record.
///
/// Returns `false` when the latest record for the address already has the
/// same kind.
pub fn add_proxy(data: &mut ManifestData, proxy: ProxyDeployment) -> Result<bool, ImportError> {
    match data.find_address_owner(&proxy.address) {
        None | Some(AddressOwner::Proxy) => {}
        Some(owner) => return Err(clash(proxy.address, &owner)),
    }

    if let Some(latest) = data.proxy_by_address(&proxy.address) {
        if latest.kind == proxy.kind {
            debug!(address = %proxy.address, kind = %proxy.kind, "proxy already recorded");
            return Ok(false);
        }
    }
    debug!(address = %proxy.address, kind = %proxy.kind, "recorded proxy");
    data.proxies.push(proxy);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use upgrades_types::{ProxyKind, StorageLayout};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn implementation(byte: u8) -> ImplDeployment {
        ImplDeployment::new(addr(byte), StorageLayout::default())
    }

    #[test]
    fn test_register_impl_dedupes_by_version() {
        let mut data = ManifestData::new();
        assert_eq!(
            register_impl(&mut data, "v1", implementation(1)).unwrap(),
            ImplRegistration::Added
        );
        assert_eq!(
            register_impl(&mut data, "v1", implementation(1)).unwrap(),
            ImplRegistration::Reused
        );
        assert_eq!(
            register_impl(&mut data, "v1", implementation(2)).unwrap(),
            ImplRegistration::AddressAdded
        );

        assert_eq!(data.impls.len(), 1);
        assert_eq!(data.impls["v1"].address, addr(1));
        assert_eq!(data.impls["v1"].all_addresses, Some(vec![addr(1), addr(2)]));
    }

    #[test]
    fn test_register_impl_rejects_clashes() {
        let mut data = ManifestData::new();
        register_impl(&mut data, "v1", implementation(1)).unwrap();
        data.proxies.push(ProxyDeployment::new(addr(9), ProxyKind::Uups));

        assert!(matches!(
            register_impl(&mut data, "v2", implementation(1)),
            Err(ImportError::DeploymentClash { .. })
        ));
        assert!(matches!(
            register_impl(&mut data, "v2", implementation(9)),
            Err(ImportError::DeploymentClash { .. })
        ));
        assert_eq!(data.impls.len(), 1);
    }

    #[test]
    fn test_register_admin_keeps_recorded() {
        let mut data = ManifestData::new();
        assert_eq!(
            register_admin(&mut data, Deployment::new(addr(0xa1))).unwrap(),
            AdminRegistration::Added
        );
        assert_eq!(
            register_admin(&mut data, Deployment::new(addr(0xa1))).unwrap(),
            AdminRegistration::Reused
        );
        assert_eq!(
            register_admin(&mut data, Deployment::new(addr(0xa2))).unwrap(),
            AdminRegistration::Mismatch {
                recorded: addr(0xa1)
            }
        );
        assert_eq!(data.admin.map(|a| a.address), Some(addr(0xa1)));
    }

    #[test]
    fn test_add_proxy_appends_on_kind_change_only() {
        let mut data = ManifestData::new();
        assert!(add_proxy(&mut data, ProxyDeployment::new(addr(1), ProxyKind::Uups)).unwrap());
        assert!(!add_proxy(&mut data, ProxyDeployment::new(addr(1), ProxyKind::Uups)).unwrap());
        assert!(add_proxy(&mut data, ProxyDeployment::new(addr(1), ProxyKind::Transparent)).unwrap());
        assert_eq!(data.proxies.len(), 2);

        register_impl(&mut data, "v1", implementation(2)).unwrap();
        assert!(matches!(
            add_proxy(&mut data, ProxyDeployment::new(addr(2), ProxyKind::Uups)),
            Err(ImportError::DeploymentClash { .. })
        ));
    }
}
