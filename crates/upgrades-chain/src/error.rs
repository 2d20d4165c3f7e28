//! Classified inspection failures.

use alloy_primitives::Address;

/// Errors raised while inspecting proxies and beacons on-chain.
///
/// Provider failures pass through untouched in [`InspectError::Provider`];
/// the other variants add the classification the provider cannot know.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("contract at {proxy} doesn't look like an ERC 1967 proxy with a logic contract address")]
    ImplementationNotFound { proxy: Address },

    #[error("contract at {proxy} doesn't look like an ERC 1967 proxy with an admin address")]
    AdminNotFound { proxy: Address },

    #[error("contract at {proxy} doesn't look like an ERC 1967 beacon proxy")]
    BeaconNotFound { proxy: Address },

    #[error("contract at {beacon} doesn't look like a beacon: {reason}")]
    InvalidBeacon { beacon: Address, reason: String },

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}
