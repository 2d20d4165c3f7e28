//! Per-network deployment manifest.
//!
//! One JSON file per chain records the proxies, implementations and admin
//! this tool manages on that chain:
//!
//! ```text
//! .openzeppelin/
//! ├── mainnet.json
//! ├── mainnet.json.lock
//! └── unknown-31337.json
//! ```
//!
//! # Modules
//!
//! - [`network`]: Chain id to file name mapping
//! - [`data`]: [`ManifestData`], the current schema
//! - [`normalize`]: Loading and migrating older schemas
//! - [`manifest`]: [`ManifestStore`] / [`Manifest`] handles with locked updates
//! - [`lock`]: Advisory file lock guarding read-modify-write
//! - [`paths`]: Atomic file writes
//!
//! # Example
//!
//! ```ignore
//! use upgrades_manifest::{ManifestError, ManifestStore};
//!
//! let store = ManifestStore::new(".openzeppelin");
//! let manifest = store.for_network(1);
//! manifest.locked_update(|data| {
//!     data.proxies.push(record);
//!     Ok::<_, ManifestError>(())
//! })?;
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod lock;
pub mod manifest;
pub mod network;
pub mod normalize;
pub mod paths;

pub use config::ManifestConfig;
pub use data::{AddressOwner, ManifestData, CURRENT_MANIFEST_VERSION};
pub use error::ManifestError;
pub use lock::ManifestLock;
pub use manifest::{Manifest, ManifestStore};
pub use network::{manifest_file_name, network_name};
pub use normalize::normalize_manifest_data;
pub use paths::DEFAULT_MANIFEST_DIR;
