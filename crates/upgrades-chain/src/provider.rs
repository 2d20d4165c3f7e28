//! Chain provider abstraction.
//!
//! The engine never talks to a node directly. Everything it needs from the
//! chain goes through [`ChainProvider`], so the same code runs against:
//! - A JSON-RPC endpoint ([`JsonRpcProvider`](crate::rpc::JsonRpcProvider))
//! - In-memory state for tests ([`MockProvider`](crate::mock::MockProvider))
//! - Any caller-supplied backend (forked node, archive cache, ...)
//!
//! The trait is read-only. Timeouts and retries belong to implementations.

use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256};
use anyhow::Result;

/// Read-only chain queries used for proxy inspection.
#[async_trait::async_trait]
pub trait ChainProvider: Send + Sync {
    /// Chain id of the connected network.
    async fn chain_id(&self) -> Result<u64>;

    /// Raw 32-byte word stored at `slot` of `address`, at the latest block.
    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256>;

    /// Execute a read-only call.
    ///
    /// Returns `Ok(None)` when the call reverted, so callers can tell "this
    /// contract does not answer" apart from a transport failure (`Err`).
    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>>;

    /// Runtime bytecode at `address` (empty for accounts without code).
    async fn get_code(&self, address: Address) -> Result<Bytes>;
}

#[async_trait::async_trait]
impl<P: ChainProvider + ?Sized> ChainProvider for Arc<P> {
    async fn chain_id(&self) -> Result<u64> {
        (**self).chain_id().await
    }

    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256> {
        (**self).get_storage_at(address, slot).await
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>> {
        (**self).call(to, data).await
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        (**self).get_code(address).await
    }
}
