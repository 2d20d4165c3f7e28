//! Test setup helpers: mock chains and importers over temporary manifests.

use std::sync::Arc;

use evm_upgrades::chain::beacon::IMPLEMENTATION_SELECTOR;
use evm_upgrades::chain::eip1967::{ADMIN_SLOT, BEACON_SLOT, IMPLEMENTATION_SLOT};
use evm_upgrades::types::Bytes;
use evm_upgrades::{Address, ForceImporter, Manifest, ManifestData, ManifestStore, MockProvider};
use tempfile::TempDir;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Mock chain with helpers that lay out proxy storage the way real proxies do.
#[derive(Clone)]
pub struct TestChain {
    pub provider: Arc<MockProvider>,
}

impl TestChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            provider: Arc::new(MockProvider::new(chain_id)),
        }
    }

    pub fn transparent_proxy(&self, proxy: Address, implementation: Address, admin: Address) {
        self.provider
            .set_storage_address(proxy, IMPLEMENTATION_SLOT, implementation)
            .set_storage_address(proxy, ADMIN_SLOT, admin);
    }

    pub fn uups_proxy(&self, proxy: Address, implementation: Address) {
        self.provider
            .set_storage_address(proxy, IMPLEMENTATION_SLOT, implementation);
    }

    pub fn beacon(&self, beacon: Address, implementation: Address) {
        self.provider.set_call_result(
            beacon,
            Bytes::copy_from_slice(&IMPLEMENTATION_SELECTOR),
            Some(Bytes::copy_from_slice(implementation.into_word().as_slice())),
        );
    }

    pub fn beacon_proxy(&self, proxy: Address, beacon: Address) {
        self.provider
            .set_storage_address(proxy, BEACON_SLOT, beacon);
    }
}

/// A [`TestChain`] plus an importer writing manifests into a temp directory.
pub struct ImportFixture {
    _tmp: TempDir,
    pub store: ManifestStore,
    pub chain: TestChain,
    pub importer: Arc<ForceImporter<Arc<MockProvider>>>,
    chain_id: u64,
}

impl ImportFixture {
    pub fn new(chain_id: u64) -> Self {
        init_tracing();
        let tmp = TempDir::new().expect("temp dir");
        let store = ManifestStore::new(tmp.path().join(".openzeppelin"));
        let chain = TestChain::new(chain_id);
        let importer = Arc::new(ForceImporter::new(chain.provider.clone(), store.clone()));
        Self {
            _tmp: tmp,
            store,
            chain,
            importer,
            chain_id,
        }
    }

    pub fn manifest(&self) -> Manifest {
        self.store.for_network(self.chain_id)
    }

    pub fn read(&self) -> ManifestData {
        self.manifest().read().expect("manifest should read")
    }

    /// Raw manifest bytes, `None` if the file does not exist yet.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        std::fs::read(self.manifest().file()).ok()
    }
}
