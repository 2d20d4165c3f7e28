//! Live JSON-RPC test utilities.
//!
//! Tests that need a node are compiled only with the `network-tests` feature
//! and read the endpoint from `UPGRADES_RPC_URL`.

use std::env;

/// Environment variable holding the JSON-RPC endpoint.
pub const RPC_URL_VAR: &str = "UPGRADES_RPC_URL";

/// JSON-RPC endpoint from the environment, if set.
pub fn rpc_url() -> Option<String> {
    env::var(RPC_URL_VAR).ok().filter(|v| !v.trim().is_empty())
}

/// Skip a test when no JSON-RPC endpoint is configured.
/// Returns the endpoint if available.
///
/// Usage:
/// ```ignore
/// #[tokio::test]
/// async fn test_live_node() {
///     let url = require_rpc!();
///     // ... use url ...
/// }
/// ```
#[macro_export]
macro_rules! require_rpc {
    () => {
        match $crate::common::network::rpc_url() {
            Some(url) => url,
            None => {
                eprintln!(
                    "Skipping {}: {} not set",
                    module_path!(),
                    $crate::common::network::RPC_URL_VAR
                );
                return;
            }
        }
    };
}
