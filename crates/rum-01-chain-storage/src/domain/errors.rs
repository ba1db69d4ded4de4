//! # Domain Errors
//!
//! Error types for the chain storage engine.
//!
//! ## Design Principles
//!
//! - KV-layer failures are carried unchanged inside `ChainStorageError::Store`
//! - Ordering and precondition failures get their own variants
//! - No panics in domain logic (use Result instead)

use std::fmt;

/// Errors that can occur during chain storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStorageError {
    /// Underlying key-value store failed.
    Store { source: KVStoreError },

    /// No chunk with this id in the requested namespace.
    BlockNotFound { block_id: String, cached: bool },

    /// Parent of a block being confirmed is not confirmed.
    ParentNotFound {
        block_id: String,
        parent_block_id: String,
    },

    /// A different genesis block is already stored under this id.
    GenesisMismatch { block_id: String },

    /// Stored chunk could not be decoded.
    MalformedChunk { key: String, message: String },

    /// Stored sub-ledger record could not be encoded or decoded.
    Serialization { message: String },

    /// Group has no stored group item.
    GroupNotFound { group_id: String },

    /// Transaction not found in the requested storage.
    TrxNotFound { trx_id: String },

    /// Syncer is already registered.
    SyncerExists { group_id: String, pubkey: String },

    /// Syncer to remove is not registered.
    SyncerNotFound { group_id: String, pubkey: String },

    /// Entry to remove does not exist.
    KeyNotFound { key: String },
}

impl fmt::Display for ChainStorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStorageError::Store { source } => write!(f, "Store error: {}", source),
            ChainStorageError::BlockNotFound { block_id, cached } => {
                let ns = if *cached { "cached" } else { "confirmed" };
                write!(f, "Block not found in {} namespace: {}", ns, block_id)
            }
            ChainStorageError::ParentNotFound {
                block_id,
                parent_block_id,
            } => write!(
                f,
                "Parent block {} not confirmed, cannot confirm {}",
                parent_block_id, block_id
            ),
            ChainStorageError::GenesisMismatch { block_id } => {
                write!(f, "Genesis block {} already stored with different content", block_id)
            }
            ChainStorageError::MalformedChunk { key, message } => {
                write!(f, "Malformed block chunk at {}: {}", key, message)
            }
            ChainStorageError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
            ChainStorageError::GroupNotFound { group_id } => {
                write!(f, "Group not found: {}", group_id)
            }
            ChainStorageError::TrxNotFound { trx_id } => write!(f, "Trx not found: {}", trx_id),
            ChainStorageError::SyncerExists { group_id, pubkey } => {
                write!(f, "Syncer {} already exists in group {}", pubkey, group_id)
            }
            ChainStorageError::SyncerNotFound { group_id, pubkey } => {
                write!(f, "Syncer {} not found in group {}", pubkey, group_id)
            }
            ChainStorageError::KeyNotFound { key } => write!(f, "Key not found: {}", key),
        }
    }
}

impl std::error::Error for ChainStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainStorageError::Store { source } => Some(source),
            _ => None,
        }
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
    /// Data corruption in the store.
    CorruptionError { message: String },
    /// Caller passed an unusable argument (empty key, zero bandwidth).
    InvalidArgument { message: String },
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
            KVStoreError::CorruptionError { message } => {
                write!(f, "KV store corruption: {}", message)
            }
            KVStoreError::InvalidArgument { message } => {
                write!(f, "KV store invalid argument: {}", message)
            }
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for ChainStorageError {
    fn from(err: KVStoreError) -> Self {
        ChainStorageError::Store { source: err }
    }
}

impl From<prost::DecodeError> for ChainStorageError {
    fn from(err: prost::DecodeError) -> Self {
        ChainStorageError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<bincode::Error> for ChainStorageError {
    fn from(err: bincode::Error) -> Self {
        ChainStorageError::Serialization {
            message: err.to_string(),
        }
    }
}
