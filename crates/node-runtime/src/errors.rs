//! Node-level errors.

use rum_01_chain_storage::{ChainStorageError, KVStoreError};
use rum_03_exchange::ExchangeError;
use thiserror::Error;

use crate::container::config::ConfigError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] ChainStorageError),

    #[error("Store open error: {0}")]
    Store(#[from] KVStoreError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Storage backend {0} is not compiled in")]
    BackendUnavailable(&'static str),

    #[error("Genesis block {block_id} does not belong to group {group_id}")]
    GenesisMismatch { group_id: String, block_id: String },

    #[error("Group {0} is not joined")]
    UnknownGroup(String),

    #[error("Node is already running")]
    AlreadyStarted,
}
