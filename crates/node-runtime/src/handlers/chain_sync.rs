//! # Chain Sync Handler
//!
//! Applies blocks and transactions received from peers to the local chain
//! of one group.
//!
//! A block whose parent is confirmed is confirmed immediately, and every
//! cached descendant that becomes reachable through it is confirmed after
//! it, parents first. A block whose parent is unknown waits in the cache.

use std::sync::Arc;

use async_trait::async_trait;
use rum_01_chain_storage::{ChainStorage, ChainStorageApi, ChainStorageError};
use rum_03_exchange::{ChainHandler, ExchangeError};
use shared_types::{Block, PeerId, Trx};

const SUBSYSTEM: &str = "node";

/// What happened to an incoming block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Already on chain; nothing written.
    AlreadyConfirmed,
    /// Parent unknown; stored in the cache.
    Cached,
    /// Confirmed along with the listed cached descendants, in order.
    Confirmed { descendants: Vec<String> },
}

pub struct ChainSyncHandler {
    group_id: String,
    storage: Arc<ChainStorage>,
}

impl ChainSyncHandler {
    pub fn new(group_id: impl Into<String>, storage: Arc<ChainStorage>) -> Self {
        Self {
            group_id: group_id.into(),
            storage,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn apply_block(&self, block: Block) -> Result<BlockOutcome, ChainStorageError> {
        let _span = rum_telemetry::subsystem_span!(
            "apply_block",
            subsystem = SUBSYSTEM,
            group = %self.group_id,
            block = %block.block_id
        )
        .entered();

        if self.storage.is_block_exist(&block.block_id, false)? {
            return Ok(BlockOutcome::AlreadyConfirmed);
        }

        if !self.storage.is_block_exist(&block.prev_block_id, false)? {
            rum_telemetry::log_block_event!(
                debug,
                SUBSYSTEM,
                "parent unknown, caching block",
                block.group_id,
                block.block_id,
                parent = %block.prev_block_id
            );
            self.storage.add_block(block, true)?;
            return Ok(BlockOutcome::Cached);
        }

        self.storage.add_block(block.clone(), false)?;
        let gathered = self.storage.gather_blocks_from_cache(block, true)?;

        let mut descendants = Vec::with_capacity(gathered.len().saturating_sub(1));
        for child in gathered.into_iter().skip(1) {
            let block_id = child.block_id.clone();
            self.storage.add_block(child, false)?;
            descendants.push(block_id);
        }

        if !descendants.is_empty() {
            rum_telemetry::log_event!(
                info,
                SUBSYSTEM,
                "confirmed cached descendants",
                group_id = %self.group_id,
                count = descendants.len()
            );
        }
        Ok(BlockOutcome::Confirmed { descendants })
    }

    fn check_group(&self, group_id: &str) -> Result<(), ExchangeError> {
        if group_id != self.group_id {
            return Err(ExchangeError::UnknownGroup(group_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainHandler for ChainSyncHandler {
    async fn handle_trx_with_rex(&self, trx: Trx, from: PeerId) -> Result<(), ExchangeError> {
        self.check_group(&trx.group_id)?;
        rum_telemetry::log_peer_event!(debug, SUBSYSTEM, "trx received", from, trx_id = %trx.trx_id);
        self.storage
            .add_trx(&trx)
            .map_err(|e| ExchangeError::Chain(e.to_string()))
    }

    async fn handle_block_with_rex(&self, block: Block, from: PeerId) -> Result<(), ExchangeError> {
        self.check_group(&block.group_id)?;
        rum_telemetry::log_peer_event!(debug, SUBSYSTEM, "block received", from, block_id = %block.block_id);
        self.apply_block(block)
            .map(|_| ())
            .map_err(|e| ExchangeError::Chain(e.to_string()))
    }
}
