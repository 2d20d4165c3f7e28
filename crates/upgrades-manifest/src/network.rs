//! Network identity.
//!
//! Manifests are filed under a canonical lowercase network name when the chain
//! id is well known, and under `unknown-<chain id>` otherwise.

/// Known chain ids and their canonical names.
const NETWORK_NAMES: &[(u64, &str)] = &[
    (1, "mainnet"),
    (2, "morden"),
    (3, "ropsten"),
    (4, "rinkeby"),
    (5, "goerli"),
    (10, "optimism"),
    (42, "kovan"),
    (56, "bsc"),
    (100, "gnosis"),
    (137, "polygon"),
    (8453, "base"),
    (17000, "holesky"),
    (42161, "arbitrum-one"),
    (43114, "avalanche"),
    (11155111, "sepolia"),
];

/// Canonical name for a chain id, if it is a known network.
pub fn network_name(chain_id: u64) -> Option<&'static str> {
    NETWORK_NAMES
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
}

/// Chain id for a canonical network name.
pub fn chain_id_for_name(name: &str) -> Option<u64> {
    let name = name.trim().to_lowercase();
    NETWORK_NAMES
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(id, _)| *id)
}

/// File name (no directory) of the manifest for `chain_id`.
pub fn manifest_file_name(chain_id: u64) -> String {
    match network_name(chain_id) {
        Some(name) => format!("{name}.json"),
        None => format!("unknown-{chain_id}.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks() {
        assert_eq!(manifest_file_name(1), "mainnet.json");
        assert_eq!(manifest_file_name(11155111), "sepolia.json");
        assert_eq!(network_name(42161), Some("arbitrum-one"));
    }

    #[test]
    fn test_unknown_network() {
        assert_eq!(manifest_file_name(55555), "unknown-55555.json");
        assert_eq!(manifest_file_name(31337), "unknown-31337.json");
        assert_eq!(network_name(55555), None);
    }

    #[test]
    fn test_names_are_unique_and_lowercase() {
        for (id, name) in NETWORK_NAMES {
            assert_eq!(*name, name.to_lowercase());
            assert_eq!(chain_id_for_name(name), Some(*id));
        }
        assert_eq!(chain_id_for_name("Mainnet"), Some(1));
    }
}
