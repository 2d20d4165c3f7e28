#![allow(dead_code, unused_imports)]
//! Shared test utilities for integration tests.
//!
//! # Modules
//!
//! - `fixtures`: Contract artifacts and well-known addresses
//! - `setup`: Mock chains with deployed proxies, importers over temp manifests
//! - `assertions`: Assertion helpers with better failure messages
//! - `network`: Live JSON-RPC test utilities

pub mod assertions;
pub mod fixtures;
pub mod network;
pub mod setup;

pub use assertions::{assert_err, assert_error_contains, assert_manifest_unchanged, assert_ok};
pub use fixtures::{
    addr, box_artifact, box_factory, box_v2_factory, constructor_factory, uups_factory,
};
pub use network::rpc_url;
pub use setup::{init_tracing, ImportFixture, TestChain};
