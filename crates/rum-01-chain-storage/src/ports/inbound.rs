//! # Inbound Ports (Driving Ports)
//!
//! The block DAG API used by the exchange service and the node runtime.
//! Sub-ledger operations (transactions, producers, syncers, config) are
//! inherent methods on [`crate::ChainStorage`].

use crate::domain::errors::ChainStorageError;
use shared_types::{Block, BlockChunk};

/// Primary API of the chain storage engine.
///
/// Implementations must uphold the guarantees listed in the crate docs.
pub trait ChainStorageApi: Send + Sync {
    /// Store a block as a cached orphan (`is_cached`) or as a confirmed chunk.
    ///
    /// ## Idempotency
    ///
    /// A block already stored in the target namespace is left untouched.
    ///
    /// ## Atomicity
    ///
    /// Confirming writes the updated parent, the new chunk and the removal of
    /// any cached copy in one batch.
    ///
    /// ## Errors
    ///
    /// - `ParentNotFound`: the parent is not confirmed
    /// - `MalformedChunk`: the stored parent chunk cannot be decoded
    /// - `Store`: the KV store failed
    fn add_block(&self, block: Block, is_cached: bool) -> Result<(), ChainStorageError>;

    /// Store the height-0 block of a group if absent.
    ///
    /// ## Errors
    ///
    /// - `GenesisMismatch`: a different block is already stored under the id
    /// - `Store`: the KV store failed
    fn add_genesis_block(&self, block: Block) -> Result<(), ChainStorageError>;

    /// Fetch a block payload.
    ///
    /// ## Errors
    ///
    /// - `BlockNotFound`: no chunk under the id in the namespace
    fn get_block(&self, block_id: &str, is_cached: bool) -> Result<Block, ChainStorageError>;

    /// Fetch the chunk with its DAG links.
    ///
    /// ## Errors
    ///
    /// - `BlockNotFound`: no chunk under the id in the namespace
    fn get_block_chunk(
        &self,
        block_id: &str,
        is_cached: bool,
    ) -> Result<BlockChunk, ChainStorageError>;

    fn is_block_exist(&self, block_id: &str, is_cached: bool) -> Result<bool, ChainStorageError>;

    /// Height of a confirmed block.
    fn get_block_height(&self, block_id: &str) -> Result<i64, ChainStorageError>;

    /// Confirmed children of a confirmed block, in insertion order.
    fn get_sub_blocks(&self, block_id: &str) -> Result<Vec<Block>, ChainStorageError>;

    /// Confirmed parent of a confirmed block.
    ///
    /// ## Errors
    ///
    /// - `BlockNotFound`: the block or its parent is not confirmed
    fn get_parent_block(&self, block_id: &str) -> Result<Block, ChainStorageError>;

    /// Breadth-first collection of `new_block` and every stored descendant.
    ///
    /// The first element is always `new_block`. Each frontier expansion
    /// scans the whole namespace selected by `is_cached` for chunks whose
    /// `prev_block_id` equals the block being expanded.
    fn gather_blocks_from_cache(
        &self,
        new_block: Block,
        is_cached: bool,
    ) -> Result<Vec<Block>, ChainStorageError>;

    /// Delete every record of a group: sub-ledgers, blocks in both
    /// namespaces and the group item.
    ///
    /// Stops at and returns the first failure; completed deletions stay.
    fn remove_group_data(&self, group_id: &str) -> Result<(), ChainStorageError>;
}
