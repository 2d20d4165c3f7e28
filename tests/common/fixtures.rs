//! Contract artifacts and addresses used across integration tests.

use std::collections::BTreeMap;

use evm_upgrades::engine::ContractArtifact;
use evm_upgrades::types::{StorageItem, StorageLayout, TypeItem};
use evm_upgrades::{Address, ArtifactFactory};

/// Deterministic address filled with `byte`.
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

fn uint256_layout(labels: &[&str]) -> StorageLayout {
    let storage = labels
        .iter()
        .enumerate()
        .map(|(slot, label)| StorageItem {
            contract: "Box".to_string(),
            label: label.to_string(),
            ty: "t_uint256".to_string(),
            src: "contracts/Box.sol:7".to_string(),
            offset: Some(0),
            slot: Some(slot.to_string()),
            ..Default::default()
        })
        .collect();
    let mut types = BTreeMap::new();
    types.insert(
        "t_uint256".to_string(),
        TypeItem {
            label: "uint256".to_string(),
            number_of_bytes: Some("32".to_string()),
            ..Default::default()
        },
    );
    StorageLayout {
        storage,
        types,
        ..Default::default()
    }
}

/// Plain implementation: one `uint256` and no upgrade function.
pub fn box_artifact() -> ContractArtifact {
    ContractArtifact {
        contract_name: "Box".to_string(),
        source_name: "contracts/Box.sol".to_string(),
        // Trailing `a1` opens a CBOR map; `00 01` is its length.
        bytecode: vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0xa1, 0x00, 0x01].into(),
        deployed_bytecode: vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x60, 0x00, 0x35, 0x00].into(),
        functions: vec!["retrieve()".to_string(), "store(uint256)".to_string()],
        storage_layout: uint256_layout(&["value"]),
        ..Default::default()
    }
}

pub fn box_factory() -> ArtifactFactory {
    ArtifactFactory::new(box_artifact())
}

/// Second version of `Box` with an extra variable appended.
pub fn box_v2_factory() -> ArtifactFactory {
    let mut artifact = box_artifact();
    artifact.contract_name = "BoxV2".to_string();
    artifact.bytecode = vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x16].into();
    artifact.functions.push("increment()".to_string());
    artifact.storage_layout = uint256_layout(&["value", "count"]);
    ArtifactFactory::new(artifact)
}

/// UUPS implementation: exposes `upgradeToAndCall`, whose `DELEGATECALL` is
/// annotated as allowed in source.
pub fn uups_factory() -> ArtifactFactory {
    let mut artifact = box_artifact();
    artifact.contract_name = "BoxUups".to_string();
    artifact.bytecode = vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x17].into();
    artifact.deployed_bytecode = vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x5a, 0xf4, 0x00].into();
    artifact.functions.extend([
        "proxiableUUID()".to_string(),
        "upgradeToAndCall(address,bytes)".to_string(),
    ]);
    artifact.unsafe_allow = vec![evm_upgrades::ValidationErrorKind::Delegatecall];
    ArtifactFactory::new(artifact)
}

/// Implementation with a constructor, unsafe behind a proxy.
pub fn constructor_factory() -> ArtifactFactory {
    let mut artifact = box_artifact();
    artifact.contract_name = "BoxWithConstructor".to_string();
    artifact.has_constructor = true;
    ArtifactFactory::new(artifact)
}
