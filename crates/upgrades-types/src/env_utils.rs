//! Environment variable parsing utilities.
//!
//! Configuration structs in the workspace (`ManifestConfig`, `RpcConfig`)
//! read their overrides through these helpers instead of repeating:
//!
//! ```ignore
//! std::env::var("UPGRADES_RPC_TIMEOUT_SECS")
//!     .ok()
//!     .and_then(|v| v.parse::<u64>().ok())
//!     .unwrap_or(30)
//! ```
//!
//! # Example
//!
//! ```
//! use upgrades_types::env_utils::{env_var, env_var_or};
//!
//! let timeout: u64 = env_var_or("UPGRADES_RPC_TIMEOUT_SECS", 30);
//! let chain: Option<u64> = env_var("UPGRADES_CHAIN_ID");
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    parse_value(std::env::var(key).ok().as_deref())
}

/// Parse a raw variable value, ignoring surrounding whitespace.
pub fn parse_value<T: FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable with a default value.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Get a non-empty environment variable as a string, or the default.
pub fn env_string_or(key: &str, default: &str) -> String {
    non_blank_or(std::env::var(key).ok(), default)
}

/// `raw` unless it is missing or blank, else `default`.
pub fn non_blank_or(raw: Option<String>, default: &str) -> String {
    match raw {
        Some(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}
