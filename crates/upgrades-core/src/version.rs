//! Bytecode fingerprints.
//!
//! Solidity appends a CBOR-encoded metadata blob to every contract, followed
//! by its length as a big-endian `u16`. The blob changes with comments and
//! file paths, so version hashes are computed over the code without it.

use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};
use upgrades_types::StorageLayout;

/// Remove the trailing CBOR metadata from `code`, if there is one.
///
/// Code whose last two bytes do not describe a CBOR map that fits is returned
/// unchanged.
pub fn strip_metadata(code: &[u8]) -> &[u8] {
    if code.len() < 2 {
        return code;
    }
    let len = code.len();
    let meta_len = u16::from_be_bytes([code[len - 2], code[len - 1]]) as usize;
    if meta_len == 0 || meta_len + 2 > len {
        return code;
    }
    let start = len - 2 - meta_len;
    // CBOR major type 5 (map): 0xa0..=0xbf
    if !(0xa0..=0xbf).contains(&code[start]) {
        return code;
    }
    &code[..start]
}

/// Fingerprints of one implementation build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub with_metadata: String,
    pub without_metadata: String,
    /// Code without metadata, constructor arguments and storage layout.
    pub linked_without_metadata: String,
}

impl Version {
    pub fn compute(
        bytecode: &[u8],
        constructor_args: &[u8],
        layout: &StorageLayout,
    ) -> Result<Self, serde_json::Error> {
        let stripped = strip_metadata(bytecode);
        let layout_json = serde_json::to_vec(layout)?;

        let mut linked = Vec::with_capacity(stripped.len() + constructor_args.len() + layout_json.len());
        linked.extend_from_slice(stripped);
        linked.extend_from_slice(constructor_args);
        linked.extend_from_slice(&layout_json);

        Ok(Self {
            with_metadata: hex::encode(keccak256(bytecode)),
            without_metadata: hex::encode(keccak256(stripped)),
            linked_without_metadata: hex::encode(keccak256(&linked)),
        })
    }

    /// Key of this version in the manifest `impls` table.
    pub fn manifest_key(&self) -> &str {
        &self.linked_without_metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_metadata(code: &[u8], metadata: &[u8]) -> Vec<u8> {
        let mut out = code.to_vec();
        out.extend_from_slice(metadata);
        out.extend_from_slice(&(metadata.len() as u16).to_be_bytes());
        out
    }

    #[test]
    fn test_strip_metadata() {
        let code = [0x60, 0x80, 0x60, 0x40, 0x52];
        let full = with_metadata(&code, &[0xa2, 0x64, 0x69, 0x70, 0x66, 0x73]);
        assert_eq!(strip_metadata(&full), &code);
    }

    #[test]
    fn test_strip_metadata_leaves_plain_code_alone() {
        assert_eq!(strip_metadata(&[]), &[] as &[u8]);
        assert_eq!(strip_metadata(&[0x00u8]), &[0x00u8]);
        // Length prefix too large
        assert_eq!(strip_metadata(&[0x60u8, 0x00, 0xff]), &[0x60u8, 0x00, 0xff]);
        // Not a CBOR map
        let not_cbor = with_metadata(&[0x60], &[0x01, 0x02]);
        assert_eq!(strip_metadata(&not_cbor), not_cbor.as_slice());
    }

    #[test]
    fn test_metadata_does_not_change_key() {
        let code = [0x60, 0x80, 0x60, 0x40, 0x52];
        let a = with_metadata(&code, &[0xa1, 0x01]);
        let b = with_metadata(&code, &[0xa1, 0x02]);
        let layout = StorageLayout::default();

        let va = Version::compute(&a, &[], &layout).unwrap();
        let vb = Version::compute(&b, &[], &layout).unwrap();
        assert_ne!(va.with_metadata, vb.with_metadata);
        assert_eq!(va.without_metadata, vb.without_metadata);
        assert_eq!(va.manifest_key(), vb.manifest_key());
        assert_eq!(va.manifest_key().len(), 64);
        assert!(!va.manifest_key().starts_with("0x"));
    }

    #[test]
    fn test_constructor_args_change_key() {
        let layout = StorageLayout::default();
        let a = Version::compute(&[0x60, 0x80], &[], &layout).unwrap();
        let b = Version::compute(&[0x60, 0x80], &[0x01], &layout).unwrap();
        assert_ne!(a.manifest_key(), b.manifest_key());
        assert_eq!(a.without_metadata, b.without_metadata);
    }
}
