//! Caller options.

use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};
use upgrades_types::ProxyKind;

use crate::validation::ValidationErrorKind;

/// Opt-outs from upgrade-safety checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationOptions {
    /// Violations to tolerate (reported as warnings instead).
    pub unsafe_allow: Vec<ValidationErrorKind>,
    pub unsafe_allow_linked_libraries: bool,
    /// Skip storage layout checks (gaps, overlaps).
    pub unsafe_skip_storage_check: bool,
}

impl ValidationOptions {
    /// Whether a violation of `kind` is waived.
    pub fn allows(&self, kind: ValidationErrorKind) -> bool {
        if self.unsafe_allow.contains(&kind) {
            return true;
        }
        match kind {
            ValidationErrorKind::ExternalLibraryLinking => self.unsafe_allow_linked_libraries,
            ValidationErrorKind::StorageGap | ValidationErrorKind::StorageOverlap => {
                self.unsafe_skip_storage_check
            }
            _ => false,
        }
    }
}

/// Options for [`force_import`](crate::force_import::ForceImporter::force_import).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportOptions {
    /// Proxy kind; skips kind inference when set.
    pub kind: Option<ProxyKind>,
    #[serde(flatten)]
    pub validation: ValidationOptions,
    /// ABI-encoded constructor arguments of the implementation.
    pub constructor_args: Bytes,
}

impl ImportOptions {
    pub fn with_kind(mut self, kind: ProxyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn allow(mut self, kind: ValidationErrorKind) -> Self {
        self.validation.unsafe_allow.push(kind);
        self
    }
}
