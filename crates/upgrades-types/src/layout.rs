//! Storage layout descriptors.
//!
//! Mirrors the compiler's `storageLayout` output: an ordered list of storage
//! variables plus a table describing each referenced type. Implementation
//! records keep one of these so later upgrades can be checked against it.
//!
//! Fields this crate does not interpret are carried in `extra` so a manifest
//! rewrite never loses them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage layout of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_version: Option<String>,

    /// Storage variables in declaration order.
    #[serde(default)]
    pub storage: Vec<StorageItem>,

    /// Type table keyed by compiler type identifier (e.g. `t_uint256`).
    #[serde(default)]
    pub types: BTreeMap<String, TypeItem>,

    /// ERC-7201 namespaced storage, keyed by namespace id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<BTreeMap<String, Vec<StorageItem>>>,

    /// Set when the layout was flattened across inherited contracts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One storage variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageItem {
    /// Contract that declares the variable.
    pub contract: String,
    /// Variable name.
    pub label: String,
    /// Key into [`StorageLayout::types`].
    #[serde(rename = "type")]
    pub ty: String,
    /// Source location, `file:line` or the compiler's `start:len:file`.
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Slot as a decimal string, the way compilers emit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast_id: Option<u64>,
    /// Upgrade annotation: the variable's label in the previous version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
    /// Upgrade annotation: the variable's type in the previous version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retyped_from: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entry of the type table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<TypeMember>>,
    /// Size as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_bytes: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Member of a struct or enum type.
///
/// Structs list their fields as storage items; enums list variant names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeMember {
    Variable(StorageItem),
    Variant(String),
}

impl StorageLayout {
    /// True when the contract declares no storage at all.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
            && self
                .namespaces
                .as_ref()
                .map(|ns| ns.values().all(|items| items.is_empty()))
                .unwrap_or(true)
    }

    /// Storage gap variables (`__gap`) reserved for future upgrades.
    pub fn gap_items(&self) -> impl Iterator<Item = &StorageItem> {
        self.storage.iter().filter(|item| item.is_gap())
    }

    /// Size in bytes of a type, if the type table records it.
    pub fn type_size(&self, ty: &str) -> Option<u64> {
        self.types
            .get(ty)
            .and_then(|t| t.number_of_bytes.as_deref())
            .and_then(|n| n.parse().ok())
    }
}

impl StorageItem {
    /// Whether this variable is a storage gap.
    pub fn is_gap(&self) -> bool {
        self.label == "__gap" || self.label.starts_with("__gap_")
    }

    /// Slot index, when present and numeric.
    pub fn slot_index(&self) -> Option<u128> {
        self.slot.as_deref().and_then(|s| s.parse().ok())
    }
}
