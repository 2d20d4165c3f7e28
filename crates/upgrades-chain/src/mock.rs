//! In-memory chain state.
//!
//! [`MockProvider`] answers provider queries from pre-loaded storage, call
//! results and code. Setters take `&self` so a provider shared behind an `Arc`
//! can be reconfigured while the engine holds it.
//!
//! # Example
//! ```
//! use upgrades_chain::MockProvider;
//! use upgrades_chain::eip1967::IMPLEMENTATION_SLOT;
//! use upgrades_types::Address;
//!
//! let proxy = Address::repeat_byte(0x11);
//! let implementation = Address::repeat_byte(0x22);
//!
//! let provider = MockProvider::new(1);
//! provider.set_storage_address(proxy, IMPLEMENTATION_SLOT, implementation);
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy_primitives::{Address, Bytes, B256};
use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use crate::provider::ChainProvider;

#[derive(Debug, Default)]
struct MockState {
    storage: HashMap<(Address, B256), B256>,
    calls: HashMap<(Address, Bytes), Option<Bytes>>,
    code: HashMap<Address, Bytes>,
    force_error: Option<String>,
}

/// A provider backed by in-memory state, for tests and offline use.
#[derive(Debug, Default)]
pub struct MockProvider {
    chain_id: u64,
    state: RwLock<MockState>,
    queries: AtomicUsize,
}

impl MockProvider {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Set the raw word stored at `slot` of `address`.
    pub fn set_storage(&self, address: Address, slot: B256, value: B256) -> &Self {
        self.state.write().storage.insert((address, slot), value);
        self
    }

    /// Store `value` left-padded into `slot`, the way proxies store addresses.
    pub fn set_storage_address(&self, address: Address, slot: B256, value: Address) -> &Self {
        self.set_storage(address, slot, value.into_word())
    }

    /// Answer `call(to, data)` with `result` (`None` simulates a revert).
    pub fn set_call_result(&self, to: Address, data: Bytes, result: Option<Bytes>) -> &Self {
        self.state.write().calls.insert((to, data), result);
        self
    }

    pub fn set_code(&self, address: Address, code: Bytes) -> &Self {
        self.state.write().code.insert(address, code);
        self
    }

    /// Force all subsequent queries to fail with `error`.
    pub fn set_error(&self, error: &str) -> &Self {
        self.state.write().force_error = Some(error.to_string());
        self
    }

    /// Clear the forced error, restoring normal behavior.
    pub fn clear_error(&self) -> &Self {
        self.state.write().force_error = None;
        self
    }

    /// Number of queries served so far (failed ones included).
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<()> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        match self.state.read().force_error {
            Some(ref error) => Err(anyhow!("{}", error)),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ChainProvider for MockProvider {
    async fn chain_id(&self) -> Result<u64> {
        self.check()?;
        Ok(self.chain_id)
    }

    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256> {
        self.check()?;
        Ok(self
            .state
            .read()
            .storage
            .get(&(address, slot))
            .copied()
            .unwrap_or(B256::ZERO))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Option<Bytes>> {
        self.check()?;
        // Unknown calls revert, like a call into a contract without that function.
        Ok(self
            .state
            .read()
            .calls
            .get(&(to, data))
            .cloned()
            .unwrap_or(None))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        self.check()?;
        Ok(self
            .state
            .read()
            .code
            .get(&address)
            .cloned()
            .unwrap_or_default())
    }
}
