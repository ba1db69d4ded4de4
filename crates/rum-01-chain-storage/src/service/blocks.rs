//! Block DAG operations.

use std::collections::HashSet;

use prost::Message;
use shared_types::{Block, BlockChunk};

use super::{decode_chunk, ChainStorage};
use crate::domain::errors::{ChainStorageError, KVStoreError};
use crate::domain::keys;
use crate::ports::inbound::ChainStorageApi;
use crate::ports::outbound::BatchOperation;

impl ChainStorageApi for ChainStorage {
    fn add_block(&self, block: Block, is_cached: bool) -> Result<(), ChainStorageError> {
        let lock = self.group_lock(&block.group_id);
        let _guard = lock.lock();

        let key = keys::chunk_key(&block.block_id, is_cached);
        if self.db.exists(&key)? {
            tracing::debug!("[rum-01] block {} already stored, skip", block.block_id);
            return Ok(());
        }

        if is_cached {
            // A confirmed block never goes back to the cache.
            if self.db.exists(&keys::block_key(&block.block_id))? {
                tracing::debug!("[rum-01] block {} already confirmed, not caching", block.block_id);
                return Ok(());
            }
            tracing::debug!("[rum-01] caching block {}", block.block_id);
            let chunk = BlockChunk::cached(block);
            self.db.set(&key, &chunk.encode_to_vec())?;
            return Ok(());
        }

        let parent_key = keys::block_key(&block.prev_block_id);
        let mut parent =
            self.load_chunk(&parent_key)?
                .ok_or_else(|| ChainStorageError::ParentNotFound {
                    block_id: block.block_id.clone(),
                    parent_block_id: block.prev_block_id.clone(),
                })?;

        parent.link_child(&block.block_id);
        let cached_key = keys::cached_block_key(&block.block_id);
        let chunk = BlockChunk::confirmed(block, parent.block_id.clone(), parent.height + 1);
        tracing::debug!(
            "[rum-01] confirming block {} at height {} under {}",
            chunk.block_id,
            chunk.height,
            chunk.parent_block_id
        );

        self.db.batch_write(vec![
            BatchOperation::put(parent_key, parent.encode_to_vec()),
            BatchOperation::put(key, chunk.encode_to_vec()),
            BatchOperation::delete(cached_key),
        ])?;
        Ok(())
    }

    fn add_genesis_block(&self, block: Block) -> Result<(), ChainStorageError> {
        let lock = self.group_lock(&block.group_id);
        let _guard = lock.lock();

        let key = keys::block_key(&block.block_id);
        if let Some(existing) = self.load_chunk(&key)? {
            let same = existing.height == 0 && existing.block.as_ref() == Some(&block);
            if !same {
                return Err(ChainStorageError::GenesisMismatch {
                    block_id: block.block_id,
                });
            }
            return Ok(());
        }

        tracing::info!(
            "[rum-01] genesis block {} stored for group {}",
            block.block_id,
            block.group_id
        );
        let chunk = BlockChunk::confirmed(block, String::new(), 0);
        self.db.set(&key, &chunk.encode_to_vec())?;
        Ok(())
    }

    fn get_block(&self, block_id: &str, is_cached: bool) -> Result<Block, ChainStorageError> {
        let chunk = self.get_block_chunk(block_id, is_cached)?;
        chunk.block.ok_or_else(|| ChainStorageError::MalformedChunk {
            key: String::from_utf8_lossy(&keys::chunk_key(block_id, is_cached)).into_owned(),
            message: "chunk has no block payload".to_string(),
        })
    }

    fn get_block_chunk(
        &self,
        block_id: &str,
        is_cached: bool,
    ) -> Result<BlockChunk, ChainStorageError> {
        self.load_chunk(&keys::chunk_key(block_id, is_cached))?
            .ok_or_else(|| ChainStorageError::BlockNotFound {
                block_id: block_id.to_string(),
                cached: is_cached,
            })
    }

    fn is_block_exist(&self, block_id: &str, is_cached: bool) -> Result<bool, ChainStorageError> {
        Ok(self.db.exists(&keys::chunk_key(block_id, is_cached))?)
    }

    fn get_block_height(&self, block_id: &str) -> Result<i64, ChainStorageError> {
        Ok(self.get_block_chunk(block_id, false)?.height)
    }

    fn get_sub_blocks(&self, block_id: &str) -> Result<Vec<Block>, ChainStorageError> {
        let chunk = self.get_block_chunk(block_id, false)?;
        chunk
            .sub_block_ids
            .iter()
            .map(|child| self.get_block(child, false))
            .collect()
    }

    fn get_parent_block(&self, block_id: &str) -> Result<Block, ChainStorageError> {
        let chunk = self.get_block_chunk(block_id, false)?;
        self.get_block(&chunk.parent_block_id, false)
    }

    fn gather_blocks_from_cache(
        &self,
        new_block: Block,
        is_cached: bool,
    ) -> Result<Vec<Block>, ChainStorageError> {
        let prefix = keys::chunk_prefix(is_cached);
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(new_block.block_id.clone());
        let mut gathered = vec![new_block];

        let mut cursor = 0;
        while cursor < gathered.len() {
            let parent_id = gathered[cursor].block_id.clone();
            let group_id = gathered[cursor].group_id.clone();

            for (key, value) in self.db.prefix_scan(&prefix)? {
                let chunk = decode_chunk(&key, &value)?;
                let Some(block) = chunk.block else {
                    continue;
                };
                if block.prev_block_id == parent_id
                    && block.group_id == group_id
                    && seen.insert(block.block_id.clone())
                {
                    gathered.push(block);
                }
            }
            cursor += 1;
        }

        tracing::debug!(
            "[rum-01] gathered {} descendant(s) of {}",
            gathered.len() - 1,
            gathered[0].block_id
        );
        Ok(gathered)
    }

    fn remove_group_data(&self, group_id: &str) -> Result<(), ChainStorageError> {
        let lock = self.group_lock(group_id);
        let _guard = lock.lock();

        let mut removed = 0usize;
        for prefix in keys::group_prefixes(group_id) {
            removed += self.db.prefix_delete(&prefix)?;
        }

        for cached in [false, true] {
            removed += self
                .db
                .prefix_cond_delete(&keys::chunk_prefix(cached), &|_, value| {
                    let chunk =
                        BlockChunk::decode(value).map_err(|e| KVStoreError::CorruptionError {
                            message: e.to_string(),
                        })?;
                    Ok(chunk.group_id() == Some(group_id))
                })?;
        }

        self.groups.delete(&keys::group_item_key(group_id))?;
        self.forget_sequence(&keys::nonce_key(group_id));
        self.forget_sequence(&keys::consensus_nonce_key(group_id));

        tracing::info!(
            "[rum-01] removed group {} ({} records)",
            group_id,
            removed
        );
        Ok(())
    }
}
