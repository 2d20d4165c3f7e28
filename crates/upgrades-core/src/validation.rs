//! Upgrade-safety validation.
//!
//! A contract behind a proxy never runs its constructor and shares its storage
//! with every future implementation. [`validate_artifact`] collects the
//! patterns that break under those rules:
//!
//! - Runtime bytecode: `DELEGATECALL` and `SELFDESTRUCT` reachable from the
//!   implementation (PUSH data and the metadata trailer are skipped)
//! - Compiler facts: constructors, immutables, initialized state variables,
//!   externally linked libraries
//! - Storage layout: malformed `__gap` arrays, overlapping variables
//!
//! [`assert_upgrade_safe`] then decides, for a given proxy kind and the
//! caller's opt-outs, whether the report is fatal.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;
use upgrades_types::{ProxyKind, StorageLayout};

use crate::artifact::ContractArtifact;
use crate::options::ValidationOptions;
use crate::version::{strip_metadata, Version};

const DELEGATECALL: u8 = 0xf4;
const SELFDESTRUCT: u8 = 0xff;
const PUSH1: u8 = 0x60;
const PUSH32: u8 = 0x7f;

/// `upgradeTo(address)` and `upgradeToAndCall(address,bytes)`.
pub const UPGRADE_FUNCTIONS: [&str; 2] = ["upgradeTo(address)", "upgradeToAndCall(address,bytes)"];

/// Kinds of upgrade-safety violation, named as in `unsafeAllow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    Constructor,
    Delegatecall,
    Selfdestruct,
    StateVariableAssignment,
    StateVariableImmutable,
    ExternalLibraryLinking,
    MissingPublicUpgradeto,
    StorageGap,
    StorageOverlap,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Constructor => "constructor",
            Self::Delegatecall => "delegatecall",
            Self::Selfdestruct => "selfdestruct",
            Self::StateVariableAssignment => "state-variable-assignment",
            Self::StateVariableImmutable => "state-variable-immutable",
            Self::ExternalLibraryLinking => "external-library-linking",
            Self::MissingPublicUpgradeto => "missing-public-upgradeto",
            Self::StorageGap => "storage-gap",
            Self::StorageOverlap => "storage-overlap",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown validation error kind '{s}'"))
    }
}

/// One violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub detail: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

/// Fatal violations of one contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Contract `{contract}` is not upgrade safe\n{}", format_errors(.errors))]
pub struct ValidationErrors {
    pub contract: String,
    pub errors: Vec<ValidationError>,
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ValidationErrors {
    pub fn kinds(&self) -> Vec<ValidationErrorKind> {
        self.errors.iter().map(|e| e.kind).collect()
    }
}

/// Everything validation learned about one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub contract: String,
    pub errors: Vec<ValidationError>,
    /// ABI function signatures, kept for kind inference.
    pub functions: Vec<String>,
}

impl ValidationReport {
    /// Whether the contract can upgrade its own proxy (UUPS).
    pub fn has_upgrade_function(&self) -> bool {
        self.functions
            .iter()
            .any(|f| UPGRADE_FUNCTIONS.contains(&f.as_str()))
    }
}

/// Validation reports keyed by version.
#[derive(Debug, Clone, Default)]
pub struct ValidationData {
    reports: BTreeMap<String, ValidationReport>,
}

impl ValidationData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: &Version, report: ValidationReport) {
        self.reports.insert(version.manifest_key().to_string(), report);
    }

    pub fn get(&self, version: &Version) -> Option<&ValidationReport> {
        self.reports.get(version.manifest_key())
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Offsets of `DELEGATECALL` and `SELFDESTRUCT` in runtime code.
///
/// PUSH immediates are skipped so data bytes are never read as opcodes.
pub fn scan_opcodes(code: &[u8]) -> Vec<(usize, u8)> {
    let code = strip_metadata(code);
    let mut found = Vec::new();
    let mut i = 0;
    while i < code.len() {
        let op = code[i];
        match op {
            DELEGATECALL | SELFDESTRUCT => found.push((i, op)),
            PUSH1..=PUSH32 => i += (op - PUSH1 + 1) as usize,
            _ => {}
        }
        i += 1;
    }
    found
}

fn bytecode_errors(artifact: &ContractArtifact) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let hits = scan_opcodes(&artifact.deployed_bytecode);
    for (opcode, kind, name) in [
        (DELEGATECALL, ValidationErrorKind::Delegatecall, "delegatecall"),
        (SELFDESTRUCT, ValidationErrorKind::Selfdestruct, "selfdestruct"),
    ] {
        if let Some((offset, _)) = hits.iter().find(|(_, op)| *op == opcode) {
            errors.push(ValidationError {
                kind,
                detail: format!("use of {name} at runtime code offset {offset}"),
            });
        }
    }
    errors
}

fn fact_errors(artifact: &ContractArtifact) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if artifact.has_constructor {
        errors.push(ValidationError {
            kind: ValidationErrorKind::Constructor,
            detail: "contract has a constructor; use an initializer instead".to_string(),
        });
    }
    for name in &artifact.immutable_variables {
        errors.push(ValidationError {
            kind: ValidationErrorKind::StateVariableImmutable,
            detail: format!("variable `{name}` is immutable"),
        });
    }
    for name in &artifact.state_variable_assignments {
        errors.push(ValidationError {
            kind: ValidationErrorKind::StateVariableAssignment,
            detail: format!("variable `{name}` is assigned an initial value"),
        });
    }
    for library in &artifact.linked_libraries {
        errors.push(ValidationError {
            kind: ValidationErrorKind::ExternalLibraryLinking,
            detail: format!("linked to external library `{library}`"),
        });
    }
    errors
}

fn is_valid_gap_type(ty: &str) -> bool {
    // t_array(t_uint256)<N>_storage with N > 0
    ty.strip_prefix("t_array(t_uint256)")
        .and_then(|rest| rest.strip_suffix("_storage"))
        .and_then(|n| n.parse::<u64>().ok())
        .map(|n| n > 0)
        .unwrap_or(false)
}

fn layout_errors(layout: &StorageLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for gap in layout.gap_items() {
        if !is_valid_gap_type(&gap.ty) {
            errors.push(ValidationError {
                kind: ValidationErrorKind::StorageGap,
                detail: format!(
                    "gap `{}` in {} has type {}, expected a fixed uint256 array",
                    gap.label, gap.contract, gap.ty
                ),
            });
        }
    }

    // Byte ranges of every positioned variable, ordered by start.
    let mut ranges: Vec<(u128, u128, &str)> = layout
        .storage
        .iter()
        .filter_map(|item| {
            let slot = item.slot_index()?;
            let start = slot.checked_mul(32)?.checked_add(item.offset.unwrap_or(0) as u128)?;
            let size = layout.type_size(&item.ty).unwrap_or(32).max(1) as u128;
            Some((start, start.checked_add(size)?, item.label.as_str()))
        })
        .collect();
    ranges.sort();
    for pair in ranges.windows(2) {
        let (_, prev_end, prev) = pair[0];
        let (start, _, label) = pair[1];
        if start < prev_end {
            errors.push(ValidationError {
                kind: ValidationErrorKind::StorageOverlap,
                detail: format!("variable `{label}` overlaps `{prev}`"),
            });
        }
    }

    errors
}

/// Collect every violation in `artifact`.
///
/// Violations the source itself annotates as allowed are left out.
pub fn validate_artifact(artifact: &ContractArtifact) -> ValidationReport {
    let mut errors = bytecode_errors(artifact);
    errors.extend(fact_errors(artifact));
    errors.extend(layout_errors(&artifact.storage_layout));
    errors.retain(|e| !artifact.unsafe_allow.contains(&e.kind));

    ValidationReport {
        contract: artifact.contract_name.clone(),
        errors,
        functions: artifact.functions.clone(),
    }
}

/// Fail unless every violation relevant to `kind` is waived by `options`.
///
/// Waived violations are logged as warnings.
pub fn assert_upgrade_safe(
    report: &ValidationReport,
    kind: ProxyKind,
    options: &ValidationOptions,
) -> Result<(), ValidationErrors> {
    let mut errors = report.errors.clone();
    match kind {
        ProxyKind::Uups => {
            if !report.has_upgrade_function() {
                errors.push(ValidationError {
                    kind: ValidationErrorKind::MissingPublicUpgradeto,
                    detail: "UUPS implementation does not expose upgradeTo or upgradeToAndCall"
                        .to_string(),
                });
            }
        }
        ProxyKind::Transparent | ProxyKind::Beacon => {}
    }

    let (waived, fatal): (Vec<_>, Vec<_>) =
        errors.into_iter().partition(|e| options.allows(e.kind));

    if !fatal.is_empty() {
        return Err(ValidationErrors {
            contract: report.contract.clone(),
            errors: fatal,
        });
    }
    for error in &waived {
        warn!(contract = %report.contract, %error, "potentially unsafe deployment allowed");
    }
    Ok(())
}
