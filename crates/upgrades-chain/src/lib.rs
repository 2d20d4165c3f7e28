//! Chain access for evm-upgrades.
//!
//! This crate provides:
//! - [`provider`]: The [`ChainProvider`] capability the engine reads the chain through
//! - [`rpc`]: [`JsonRpcProvider`], a blocking-HTTP JSON-RPC implementation
//! - [`mock`]: [`MockProvider`], in-memory chain state for tests and offline use
//! - [`eip1967`]: Proxy slot reads (implementation, admin, beacon)
//! - [`beacon`]: Beacon detection through `implementation()`
//!
//! # Example
//!
//! ```ignore
//! use upgrades_chain::{eip1967, JsonRpcProvider};
//!
//! let provider = JsonRpcProvider::from_env();
//! if let Some(implementation) =
//!     eip1967::get_implementation_address_from_proxy(&provider, proxy).await?
//! {
//!     println!("proxy {proxy} -> {implementation}");
//! }
//! ```

pub mod beacon;
pub mod eip1967;
pub mod error;
pub mod mock;
pub mod provider;
pub mod rpc;

pub use beacon::{get_implementation_address_from_beacon, is_beacon};
pub use eip1967::{
    get_admin_address, get_beacon_address, get_implementation_address,
    get_implementation_address_from_proxy, is_beacon_proxy,
};
pub use error::InspectError;
pub use mock::MockProvider;
pub use provider::ChainProvider;
pub use rpc::{JsonRpcProvider, RpcConfig};
