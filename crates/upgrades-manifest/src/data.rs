//! The current manifest schema.

use std::collections::BTreeMap;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use upgrades_types::{Deployment, ImplDeployment, ProxyDeployment};

/// Schema version written by this crate.
pub const CURRENT_MANIFEST_VERSION: &str = "3.2";

/// Contents of one network's manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestData {
    pub manifest_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<Deployment>,
    /// Implementations keyed by version hash.
    #[serde(default)]
    pub impls: BTreeMap<String, ImplDeployment>,
    /// Append-only; the latest record for an address is authoritative.
    #[serde(default)]
    pub proxies: Vec<ProxyDeployment>,
}

/// Which manifest entry claims an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressOwner {
    Admin,
    Impl { version: String },
    Proxy,
}

impl Default for ManifestData {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestData {
    /// Empty manifest at the current schema version.
    pub fn new() -> Self {
        Self {
            manifest_version: CURRENT_MANIFEST_VERSION.to_string(),
            admin: None,
            impls: BTreeMap::new(),
            proxies: Vec::new(),
        }
    }

    pub fn impl_by_version(&self, version: &str) -> Option<&ImplDeployment> {
        self.impls.get(version)
    }

    /// Implementation record living at `address`, with its version key.
    pub fn impl_by_address(&self, address: &Address) -> Option<(&str, &ImplDeployment)> {
        self.impls
            .iter()
            .find(|(_, record)| record.has_address(address))
            .map(|(version, record)| (version.as_str(), record))
    }

    /// Latest proxy record for `address`.
    pub fn proxy_by_address(&self, address: &Address) -> Option<&ProxyDeployment> {
        self.proxies.iter().rev().find(|p| p.address == *address)
    }

    /// First entry claiming `address`, checked as admin, then impls, then proxies.
    pub fn find_address_owner(&self, address: &Address) -> Option<AddressOwner> {
        if self.admin.as_ref().map(|a| a.address == *address).unwrap_or(false) {
            return Some(AddressOwner::Admin);
        }
        if let Some((version, _)) = self.impl_by_address(address) {
            return Some(AddressOwner::Impl {
                version: version.to_string(),
            });
        }
        self.proxy_by_address(address).map(|_| AddressOwner::Proxy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upgrades_types::{ProxyKind, StorageLayout};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn test_new_is_empty_current_version() {
        let data = ManifestData::new();
        assert_eq!(data.manifest_version, "3.2");
        assert!(data.admin.is_none());
        assert!(data.impls.is_empty());
        assert!(data.proxies.is_empty());

        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("admin").is_none());
        assert_eq!(json["manifestVersion"], "3.2");
    }

    #[test]
    fn test_lookups() {
        let mut data = ManifestData::new();
        data.admin = Some(Deployment::new(addr(0xad)));
        let mut record = ImplDeployment::new(addr(2), StorageLayout::default());
        record.add_address(addr(3));
        data.impls.insert("v1".to_string(), record);
        data.proxies.push(ProxyDeployment::new(addr(1), ProxyKind::Uups));
        data.proxies.push(ProxyDeployment::new(addr(1), ProxyKind::Transparent));

        assert_eq!(data.impl_by_address(&addr(3)).map(|(v, _)| v), Some("v1"));
        assert_eq!(
            data.proxy_by_address(&addr(1)).map(|p| p.kind),
            Some(ProxyKind::Transparent)
        );
        assert_eq!(data.find_address_owner(&addr(0xad)), Some(AddressOwner::Admin));
        assert_eq!(
            data.find_address_owner(&addr(2)),
            Some(AddressOwner::Impl {
                version: "v1".to_string()
            })
        );
        assert_eq!(data.find_address_owner(&addr(1)), Some(AddressOwner::Proxy));
        assert_eq!(data.find_address_owner(&addr(9)), None);
    }
}
