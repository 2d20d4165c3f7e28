//! Manifest normalization and migration.
//!
//! Every manifest read goes through [`normalize_manifest_data`]. It accepts the
//! raw JSON of any supported schema version and rebuilds it field by field in
//! the current schema:
//!
//! | Record         | Kept                                   | Dropped                             |
//! |----------------|----------------------------------------|-------------------------------------|
//! | admin          | `address`, `txHash`                    | `kind`, `layout`, `deployTransaction` |
//! | implementation | `address`, `txHash`, `layout`, `allAddresses` | `kind`, `deployTransaction` |
//! | proxy          | `address`, `txHash`, `kind`            | `layout`, `deployTransaction`       |
//!
//! Other record fields are dropped as well. A layout is kept whole, including
//! fields this crate does not interpret. Data that cannot be reshaped is an error,
//! never silently repaired beyond padding short hex values to full width.

use alloy_primitives::{Address, B256};
use serde_json::{Map, Value};
use upgrades_types::{
    parse_address, Deployment, ImplDeployment, ProxyDeployment, ProxyKind, StorageLayout,
};

use crate::data::{ManifestData, CURRENT_MANIFEST_VERSION};
use crate::error::ManifestError;

/// Schema versions this crate can read.
pub const SUPPORTED_VERSIONS: &[&str] = &["3.0", "3.1", CURRENT_MANIFEST_VERSION];

fn malformed(msg: impl Into<String>) -> ManifestError {
    ManifestError::Malformed(msg.into())
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, ManifestError> {
    value
        .as_object()
        .ok_or_else(|| malformed(format!("{what} is not an object")))
}

fn pick_address(record: &Map<String, Value>, what: &str) -> Result<Address, ManifestError> {
    let raw = record
        .get("address")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("{what} has no address")))?;
    parse_address(raw).ok_or_else(|| malformed(format!("{what} has invalid address {raw:?}")))
}

fn parse_hash(raw: &str) -> Option<B256> {
    let digits = raw.trim().strip_prefix("0x").unwrap_or(raw.trim());
    if digits.is_empty() || digits.len() > 64 {
        return None;
    }
    let bytes = hex::decode(format!("{digits:0>64}")).ok()?;
    Some(B256::from_slice(&bytes))
}

fn pick_tx_hash(record: &Map<String, Value>, what: &str) -> Result<Option<B256>, ManifestError> {
    match record.get("txHash") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_hash(raw)
            .map(Some)
            .ok_or_else(|| malformed(format!("{what} has invalid txHash {raw:?}"))),
        Some(other) => Err(malformed(format!("{what} has non-string txHash {other}"))),
    }
}

fn normalize_admin(value: &Value) -> Result<Deployment, ManifestError> {
    let record = as_object(value, "admin")?;
    Ok(Deployment {
        address: pick_address(record, "admin")?,
        tx_hash: pick_tx_hash(record, "admin")?,
    })
}

fn normalize_impl(version: &str, value: &Value) -> Result<ImplDeployment, ManifestError> {
    let what = format!("impl {version}");
    let record = as_object(value, &what)?;
    let layout_value = record
        .get("layout")
        .ok_or_else(|| malformed(format!("{what} has no layout")))?;
    let layout: StorageLayout = serde_json::from_value(layout_value.clone())
        .map_err(|e| malformed(format!("{what} has invalid layout: {e}")))?;

    let all_addresses = match record.get("allAddresses") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| {
                    item.as_str()
                        .and_then(parse_address)
                        .ok_or_else(|| malformed(format!("{what} has invalid allAddresses entry {item}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Some(other) => return Err(malformed(format!("{what} has non-array allAddresses {other}"))),
    };

    Ok(ImplDeployment {
        address: pick_address(record, &what)?,
        tx_hash: pick_tx_hash(record, &what)?,
        layout,
        all_addresses,
    })
}

fn normalize_proxy(index: usize, value: &Value) -> Result<ProxyDeployment, ManifestError> {
    let what = format!("proxy #{index}");
    let record = as_object(value, &what)?;
    let kind = record
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(format!("{what} has no kind")))?
        .parse::<ProxyKind>()
        .map_err(|e| malformed(format!("{what}: {e}")))?;

    Ok(ProxyDeployment {
        address: pick_address(record, &what)?,
        tx_hash: pick_tx_hash(record, &what)?,
        kind,
    })
}

/// Normalize raw manifest JSON into the current schema.
///
/// Pure and deterministic; normalizing already-normalized data returns it
/// unchanged.
pub fn normalize_manifest_data(raw: &Value) -> Result<ManifestData, ManifestError> {
    let root = as_object(raw, "manifest")?;

    let version = root
        .get("manifestVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("manifestVersion is missing"))?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ManifestError::UnsupportedVersion {
            version: version.to_string(),
        });
    }

    let admin = match root.get("admin") {
        None | Some(Value::Null) => None,
        Some(value) => Some(normalize_admin(value)?),
    };

    let mut data = ManifestData::new();
    data.admin = admin;

    match root.get("impls") {
        None | Some(Value::Null) => {}
        Some(value) => {
            for (version, record) in as_object(value, "impls")? {
                data.impls
                    .insert(version.clone(), normalize_impl(version, record)?);
            }
        }
    }

    match root.get("proxies") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) => {
            for (index, record) in items.iter().enumerate() {
                data.proxies.push(normalize_proxy(index, record)?);
            }
        }
        Some(_) => return Err(malformed("proxies is not an array")),
    }

    Ok(data)
}
