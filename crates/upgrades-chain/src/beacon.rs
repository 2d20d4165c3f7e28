//! Beacon detection.
//!
//! A beacon is any contract answering `implementation()` with an address.

use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::error::InspectError;
use crate::provider::ChainProvider;

/// `bytes4(keccak256("implementation()"))`
pub const IMPLEMENTATION_SELECTOR: [u8; 4] = [0x5c, 0x60, 0xda, 0x1b];

/// Decode an ABI-encoded `address` return value.
fn decode_address_word(data: &[u8]) -> Result<Address, String> {
    if data.len() != 32 {
        return Err(format!("expected 32 bytes of return data, got {}", data.len()));
    }
    if data[..12].iter().any(|b| *b != 0) {
        return Err("return value is not an address".to_string());
    }
    Ok(Address::from_slice(&data[12..]))
}

/// Current implementation of the beacon at `beacon`.
pub async fn get_implementation_address_from_beacon<P: ChainProvider + ?Sized>(
    provider: &P,
    beacon: Address,
) -> Result<Address, InspectError> {
    let data = Bytes::copy_from_slice(&IMPLEMENTATION_SELECTOR);
    let Some(output) = provider.call(beacon, data).await? else {
        let reason = if provider.get_code(beacon).await?.is_empty() {
            "no contract code at address"
        } else {
            "implementation() reverted"
        };
        return Err(InspectError::InvalidBeacon {
            beacon,
            reason: reason.to_string(),
        });
    };

    let implementation =
        decode_address_word(&output).map_err(|reason| InspectError::InvalidBeacon { beacon, reason })?;
    if implementation.is_zero() {
        return Err(InspectError::InvalidBeacon {
            beacon,
            reason: "implementation() returned the zero address".to_string(),
        });
    }
    Ok(implementation)
}

/// Whether `address` behaves like a beacon.
///
/// Only [`InspectError::InvalidBeacon`] maps to `false`; provider failures
/// propagate.
pub async fn is_beacon<P: ChainProvider + ?Sized>(
    provider: &P,
    address: Address,
) -> Result<bool, InspectError> {
    match get_implementation_address_from_beacon(provider, address).await {
        Ok(_) => Ok(true),
        Err(InspectError::InvalidBeacon { reason, .. }) => {
            debug!(%address, %reason, "not a beacon");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    fn selector() -> Bytes {
        Bytes::copy_from_slice(&IMPLEMENTATION_SELECTOR)
    }

    #[test]
    fn test_selector_matches_signature() {
        let hash = alloy_primitives::keccak256("implementation()");
        assert_eq!(&hash[..4], &IMPLEMENTATION_SELECTOR);
    }

    #[tokio::test]
    async fn test_reads_beacon_implementation() {
        let provider = MockProvider::new(1);
        let beacon = Address::repeat_byte(0xbe);
        let implementation = Address::repeat_byte(0x22);
        provider.set_call_result(
            beacon,
            selector(),
            Some(Bytes::copy_from_slice(implementation.into_word().as_slice())),
        );

        assert_eq!(
            get_implementation_address_from_beacon(&provider, beacon)
                .await
                .unwrap(),
            implementation
        );
        assert!(is_beacon(&provider, beacon).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_non_beacons() {
        let provider = MockProvider::new(1);
        let reverts = Address::repeat_byte(1);
        let short = Address::repeat_byte(2);
        let dirty = Address::repeat_byte(3);
        provider.set_call_result(short, selector(), Some(Bytes::from(vec![0u8; 20])));
        provider.set_call_result(dirty, selector(), Some(Bytes::from(vec![0xffu8; 32])));

        for address in [reverts, short, dirty] {
            assert!(!is_beacon(&provider, address).await.unwrap());
        }
        assert!(matches!(
            get_implementation_address_from_beacon(&provider, reverts).await,
            Err(InspectError::InvalidBeacon { .. })
        ));
    }

    #[tokio::test]
    async fn test_revert_reason_names_missing_code() {
        let provider = MockProvider::new(1);
        let empty = Address::repeat_byte(1);
        let deployed = Address::repeat_byte(2);
        provider.set_code(deployed, Bytes::from(vec![0x60, 0x80, 0x00]));

        for (address, expected) in [
            (empty, "no contract code at address"),
            (deployed, "implementation() reverted"),
        ] {
            match get_implementation_address_from_beacon(&provider, address).await {
                Err(InspectError::InvalidBeacon { reason, .. }) => assert_eq!(reason, expected),
                other => panic!("expected InvalidBeacon, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = MockProvider::new(1);
        provider.set_error("timeout");
        assert!(matches!(
            is_beacon(&provider, Address::repeat_byte(1)).await,
            Err(InspectError::Provider(_))
        ));
    }
}
