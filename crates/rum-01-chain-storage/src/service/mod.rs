//! # Chain Storage Service
//!
//! `ChainStorage` owns the two stores of a node:
//!
//! - `db`: blocks (confirmed and cached) and every per-group sub-ledger
//! - `groups`: one group item per joined group
//!
//! Block writes of one group are serialized behind a per-group lock so the
//! parent read-modify-write in `add_block` cannot lose a child link.

mod blocks;
mod groups;
mod subledger;

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::BlockChunk;

use crate::adapters::{InMemoryKVStore, Sequence};
use crate::domain::config::ChainStorageConfig;
use crate::domain::errors::ChainStorageError;
use crate::ports::outbound::KeyValueStore;

/// The chain storage engine.
pub struct ChainStorage {
    pub(crate) db: Arc<dyn KeyValueStore>,
    pub(crate) groups: Arc<dyn KeyValueStore>,
    pub(crate) config: ChainStorageConfig,
    group_locks: DashMap<String, Arc<Mutex<()>>>,
    sequences: DashMap<Vec<u8>, Arc<Sequence>>,
}

impl ChainStorage {
    pub fn new(
        db: Arc<dyn KeyValueStore>,
        groups: Arc<dyn KeyValueStore>,
        config: ChainStorageConfig,
    ) -> Self {
        tracing::info!(
            "[rum-01] chain storage ready (sequence bandwidth {})",
            config.sequence_bandwidth
        );
        Self {
            db,
            groups,
            config,
            group_locks: DashMap::new(),
            sequences: DashMap::new(),
        }
    }

    /// Both stores in memory. Nothing survives the process.
    pub fn new_in_memory(config: ChainStorageConfig) -> Self {
        Self::new(
            Arc::new(InMemoryKVStore::new()),
            Arc::new(InMemoryKVStore::new()),
            config,
        )
    }

    pub fn db(&self) -> &Arc<dyn KeyValueStore> {
        &self.db
    }

    pub fn groups_store(&self) -> &Arc<dyn KeyValueStore> {
        &self.groups
    }

    pub(crate) fn group_lock(&self, group_id: &str) -> Arc<Mutex<()>> {
        self.group_locks
            .entry(group_id.to_string())
            .or_default()
            .clone()
    }

    /// Cached sequence for `key`, leased on first use.
    pub(crate) fn sequence(&self, key: Vec<u8>) -> Result<Arc<Sequence>, ChainStorageError> {
        match self.sequences.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let seq = Arc::new(Sequence::new(
                    self.db.clone(),
                    entry.key().clone(),
                    self.config.sequence_bandwidth,
                )?);
                entry.insert(seq.clone());
                Ok(seq)
            }
        }
    }

    /// Return unused leases to the store and forget them.
    pub fn release_sequences(&self) -> Result<(), ChainStorageError> {
        for seq in self.sequences.iter() {
            seq.value().release()?;
        }
        self.sequences.clear();
        Ok(())
    }

    pub(crate) fn forget_sequence(&self, key: &[u8]) {
        self.sequences.remove(key);
    }

    pub(crate) fn load_chunk(&self, key: &[u8]) -> Result<Option<BlockChunk>, ChainStorageError> {
        match self.db.get(key)? {
            None => Ok(None),
            Some(bytes) => decode_chunk(key, &bytes).map(Some),
        }
    }
}

pub(crate) fn decode_chunk(key: &[u8], bytes: &[u8]) -> Result<BlockChunk, ChainStorageError> {
    BlockChunk::decode(bytes).map_err(|e| ChainStorageError::MalformedChunk {
        key: String::from_utf8_lossy(key).into_owned(),
        message: e.to_string(),
    })
}

pub(crate) fn encode_record<T: Serialize>(record: &T) -> Result<Vec<u8>, ChainStorageError> {
    Ok(bincode::serialize(record)?)
}

pub(crate) fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ChainStorageError> {
    Ok(bincode::deserialize(bytes)?)
}
