//! Import and deployment errors.

use alloy_primitives::Address;
use upgrades_chain::InspectError;
use upgrades_manifest::ManifestError;

use crate::validation::ValidationErrors;

/// Failure of a force import or a (simulated) deployment.
///
/// Provider and deployer errors are carried unchanged in
/// [`ImportError::Provider`]; inspection errors that only classify a provider
/// failure are unwrapped back into it.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// Neither a recognizable proxy nor a beacon.
    #[error("Contract at {address} doesn't look like a supported UUPS/Transparent/Beacon proxy")]
    Unsupported { address: Address },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("The deployment at {address} clashes with an existing {existing} entry in the manifest")]
    DeploymentClash { address: Address, existing: String },

    #[error("invalid artifact for {contract}: {reason}")]
    InvalidArtifact { contract: String, reason: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Inspect(InspectError),

    #[error(transparent)]
    Provider(anyhow::Error),
}

impl From<InspectError> for ImportError {
    fn from(e: InspectError) -> Self {
        match e {
            InspectError::Provider(inner) => ImportError::Provider(inner),
            other => ImportError::Inspect(other),
        }
    }
}

impl From<anyhow::Error> for ImportError {
    fn from(e: anyhow::Error) -> Self {
        ImportError::Provider(e)
    }
}
