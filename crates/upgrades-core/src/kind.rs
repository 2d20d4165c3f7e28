//! Proxy kind resolution.
//!
//! Resolution order:
//! 1. Kind given by the caller
//! 2. Beacon proxy detected on-chain
//! 3. Inference from the implementation's validation data

use tracing::{debug, warn};
use upgrades_types::ProxyKind;

use crate::validation::ValidationData;
use crate::version::Version;

/// Result of static kind inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindInference {
    Uups,
    Transparent,
    /// No validation data for the version.
    Unknown,
}

/// Infer transparent vs UUPS from what validation saw.
///
/// An implementation that can upgrade its own proxy is UUPS.
pub fn infer_proxy_kind(validations: &ValidationData, version: &Version) -> KindInference {
    match validations.get(version) {
        Some(report) if report.has_upgrade_function() => KindInference::Uups,
        Some(_) => KindInference::Transparent,
        None => KindInference::Unknown,
    }
}

/// Apply the resolution order.
///
/// An inconclusive inference falls back to transparent.
pub fn resolve_proxy_kind(
    explicit: Option<ProxyKind>,
    beacon_proxy: bool,
    inference: KindInference,
) -> ProxyKind {
    if let Some(kind) = explicit {
        debug!(%kind, "using explicit proxy kind");
        return kind;
    }
    if beacon_proxy {
        debug!("proxy delegates through a beacon");
        return ProxyKind::Beacon;
    }
    match inference {
        KindInference::Uups => ProxyKind::Uups,
        KindInference::Transparent => ProxyKind::Transparent,
        KindInference::Unknown => {
            warn!("could not infer proxy kind from validation data; assuming transparent");
            ProxyKind::Transparent
        }
    }
}
