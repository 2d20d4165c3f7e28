//! Shared types for the evm-upgrades workspace.
//!
//! This crate provides the domain types used across the workspace, so the
//! chain, manifest and core crates agree on one representation:
//!
//! - [`address`]: Address normalization helpers
//! - [`kind`]: The closed set of proxy kinds ([`ProxyKind`])
//! - [`layout`]: Storage layout descriptors recorded for implementations
//! - [`deployment`]: Canonical manifest records (admin, implementation, proxy)
//! - [`env_utils`]: Typed environment variable parsing for configuration

pub mod address;
pub mod deployment;
pub mod env_utils;
pub mod kind;
pub mod layout;

pub use address::{address_to_string, is_zero_address, normalize_address, parse_address};
pub use deployment::{Deployment, ImplDeployment, ProxyDeployment};
pub use env_utils::{env_string_or, env_var, env_var_or, non_blank_or, parse_value};
pub use kind::{ParseProxyKindError, ProxyKind};
pub use layout::{StorageItem, StorageLayout, TypeItem, TypeMember};

// Re-export the primitives so downstream crates name one set of types.
pub use alloy_primitives::{Address, Bytes, B256};
