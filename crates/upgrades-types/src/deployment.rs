//! Canonical manifest records.
//!
//! Each record type carries only the fields that belong to its role, so the
//! manifest cannot hold a proxy with a layout or an implementation with a
//! kind. Transient data such as raw deployment transactions has no field here
//! and is dropped when older manifests are normalized.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::kind::ProxyKind;
use crate::layout::StorageLayout;

/// Admin (or any plain) deployment: where it lives and how it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub address: Address,
    /// Deployment transaction, absent for imported contracts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
}

/// Implementation deployment with the storage layout it was validated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplDeployment {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    pub layout: StorageLayout,
    /// Every address this same version is known to live at, when more than one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_addresses: Option<Vec<Address>>,
}

/// Proxy deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyDeployment {
    pub address: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    pub kind: ProxyKind,
}

impl Deployment {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            tx_hash: None,
        }
    }
}

impl ImplDeployment {
    pub fn new(address: Address, layout: StorageLayout) -> Self {
        Self {
            address,
            tx_hash: None,
            layout,
            all_addresses: None,
        }
    }

    /// Whether this record claims `address`, as primary or secondary location.
    pub fn has_address(&self, address: &Address) -> bool {
        self.address == *address
            || self
                .all_addresses
                .as_ref()
                .map(|all| all.contains(address))
                .unwrap_or(false)
    }

    /// Record an extra location for the same version.
    ///
    /// Returns `false` when the address was already known.
    pub fn add_address(&mut self, address: Address) -> bool {
        if self.has_address(&address) {
            return false;
        }
        let all = self.all_addresses.get_or_insert_with(|| vec![self.address]);
        if !all.contains(&self.address) {
            all.insert(0, self.address);
        }
        all.push(address);
        true
    }
}

impl ProxyDeployment {
    pub fn new(address: Address, kind: ProxyKind) -> Self {
        Self {
            address,
            tx_hash: None,
            kind,
        }
    }
}
