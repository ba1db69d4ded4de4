//! Storage backends for the chain and group stores.

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

use std::sync::Arc;

use rum_01_chain_storage::{InMemoryKVStore, KeyValueStore};

use crate::container::config::{NodeConfig, StorageBackend};
use crate::errors::NodeError;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

/// The chain store and the group store.
pub struct Stores {
    pub chain: Arc<dyn KeyValueStore>,
    pub groups: Arc<dyn KeyValueStore>,
}

/// Open the stores for the configured backend.
pub fn open_stores(config: &NodeConfig) -> Result<Stores, NodeError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("[node] using in-memory stores");
            Ok(Stores {
                chain: Arc::new(InMemoryKVStore::new()),
                groups: Arc::new(InMemoryKVStore::new()),
            })
        }
        StorageBackend::RocksDb => open_rocksdb(config),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &NodeConfig) -> Result<Stores, NodeError> {
    let chain = RocksDbStore::open(RocksDbConfig::at(config.chain_db_path()))?;
    let groups = RocksDbStore::open(RocksDbConfig::at(config.groups_db_path()))?;
    Ok(Stores {
        chain: Arc::new(chain),
        groups: Arc::new(groups),
    })
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_config: &NodeConfig) -> Result<Stores, NodeError> {
    Err(NodeError::BackendUnavailable("rocksdb"))
}
