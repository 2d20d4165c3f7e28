//! Proxy kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Architectural kind of an upgradeable proxy.
///
/// The set is closed: every consumer matches on it exhaustively, and any
/// other string is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// Upgrades are controlled by a separate admin account or contract.
    Transparent,
    /// Upgrade authorization lives in the implementation (ERC-1822).
    Uups,
    /// The proxy asks a beacon for its implementation.
    Beacon,
}

impl ProxyKind {
    /// All kinds, in declaration order.
    pub const ALL: [ProxyKind; 3] = [ProxyKind::Transparent, ProxyKind::Uups, ProxyKind::Beacon];

    /// Name used in manifests and options.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Transparent => "transparent",
            ProxyKind::Uups => "uups",
            ProxyKind::Beacon => "beacon",
        }
    }

    /// Whether proxies of this kind are managed through an admin contract.
    pub fn requires_admin(&self) -> bool {
        match self {
            ProxyKind::Transparent => true,
            ProxyKind::Uups | ProxyKind::Beacon => false,
        }
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`ProxyKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProxyKindError(pub String);

impl fmt::Display for ParseProxyKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown proxy kind '{}' (expected transparent, uups or beacon)",
            self.0
        )
    }
}

impl std::error::Error for ParseProxyKindError {}

impl FromStr for ProxyKind {
    type Err = ParseProxyKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transparent" => Ok(ProxyKind::Transparent),
            "uups" => Ok(ProxyKind::Uups),
            "beacon" => Ok(ProxyKind::Beacon),
            other => Err(ParseProxyKindError(other.to_string())),
        }
    }
}
