//! ERC-1967 proxy slot inspection.
//!
//! Proxies keep their implementation, admin and beacon pointers at fixed
//! pseudo-random slots (`keccak256(label) - 1`). Proxies deployed with
//! ZeppelinOS used `keccak256(label)` without the offset; those slots are read
//! as fallbacks for implementation and admin.

use alloy_primitives::{b256, Address, B256};
use tracing::trace;

use crate::beacon::get_implementation_address_from_beacon;
use crate::error::InspectError;
use crate::provider::ChainProvider;

/// `keccak256("eip1967.proxy.implementation") - 1`
pub const IMPLEMENTATION_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// `keccak256("eip1967.proxy.admin") - 1`
pub const ADMIN_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// `keccak256("eip1967.proxy.beacon") - 1`
pub const BEACON_SLOT: B256 =
    b256!("a3f0ad74e5423aebfd80d3ef4346578335a9a72aeaee59ff6cb3582b35133d50");

/// `keccak256("org.zeppelinos.proxy.implementation")`
pub const LEGACY_IMPLEMENTATION_SLOT: B256 =
    b256!("7050c9e0f4ca769c69bd3a8ef740bc37934f8e2c036e5a723fd8ee048ed3f8c3");

/// `keccak256("org.zeppelinos.proxy.admin")`
pub const LEGACY_ADMIN_SLOT: B256 =
    b256!("10d6a54a4754c8869d6886b5f5d7fbfa5b4522237ea5c60d11bc4e7a1ff9390b");

/// Read `slot` and interpret its low 20 bytes as an address.
///
/// Returns `None` for an empty (zero) slot.
async fn read_address_slot<P: ChainProvider + ?Sized>(
    provider: &P,
    address: Address,
    slot: B256,
) -> Result<Option<Address>, InspectError> {
    let word = provider.get_storage_at(address, slot).await?;
    let value = Address::from_word(word);
    trace!(%address, %slot, %value, "read proxy slot");
    Ok((!value.is_zero()).then_some(value))
}

/// Read the first non-empty slot out of `[primary, fallback]`.
async fn read_with_fallback<P: ChainProvider + ?Sized>(
    provider: &P,
    address: Address,
    primary: B256,
    fallback: B256,
) -> Result<Option<Address>, InspectError> {
    if let Some(value) = read_address_slot(provider, address, primary).await? {
        return Ok(Some(value));
    }
    read_address_slot(provider, address, fallback).await
}

/// Implementation address of an ERC-1967 (or ZeppelinOS) proxy.
pub async fn get_implementation_address<P: ChainProvider + ?Sized>(
    provider: &P,
    proxy: Address,
) -> Result<Address, InspectError> {
    read_with_fallback(provider, proxy, IMPLEMENTATION_SLOT, LEGACY_IMPLEMENTATION_SLOT)
        .await?
        .ok_or(InspectError::ImplementationNotFound { proxy })
}

/// Implementation behind `address`, or `None` when it is not a proxy.
///
/// Beacon proxies have an empty implementation slot; for those the beacon is
/// asked instead. Provider failures and broken beacons still propagate.
pub async fn get_implementation_address_from_proxy<P: ChainProvider + ?Sized>(
    provider: &P,
    address: Address,
) -> Result<Option<Address>, InspectError> {
    match get_implementation_address(provider, address).await {
        Ok(implementation) => return Ok(Some(implementation)),
        Err(InspectError::ImplementationNotFound { .. }) => {}
        Err(e) => return Err(e),
    }
    match get_beacon_address(provider, address).await {
        Ok(beacon) => get_implementation_address_from_beacon(provider, beacon)
            .await
            .map(Some),
        Err(InspectError::BeaconNotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Admin address of a transparent proxy.
pub async fn get_admin_address<P: ChainProvider + ?Sized>(
    provider: &P,
    proxy: Address,
) -> Result<Address, InspectError> {
    read_with_fallback(provider, proxy, ADMIN_SLOT, LEGACY_ADMIN_SLOT)
        .await?
        .ok_or(InspectError::AdminNotFound { proxy })
}

/// Beacon address of a beacon proxy.
pub async fn get_beacon_address<P: ChainProvider + ?Sized>(
    provider: &P,
    proxy: Address,
) -> Result<Address, InspectError> {
    read_address_slot(provider, proxy, BEACON_SLOT)
        .await?
        .ok_or(InspectError::BeaconNotFound { proxy })
}

/// Whether the proxy delegates through a beacon.
pub async fn is_beacon_proxy<P: ChainProvider + ?Sized>(
    provider: &P,
    address: Address,
) -> Result<bool, InspectError> {
    Ok(read_address_slot(provider, address, BEACON_SLOT)
        .await?
        .is_some())
}
