//! # Rum Node
//!
//! Owns one instance of every component and wires them together:
//!
//! ```text
//!   RumNode
//!   ├── ChainStorage ── chain store + group store
//!   ├── RumGroupPeerStore (peers, scorers, rate limiter)
//!   ├── RexService ── StreamTransport
//!   │     └── chain registry: group_id -> ChainSyncHandler
//!   └── background tasks: inbound serve loop, maintenance tick
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rum_01_chain_storage::{ChainStorage, ChainStorageApi, GroupItem};
use rum_02_peer_store::RumGroupPeerStore;
use rum_03_exchange::{RexService, StreamTransport};
use shared_types::{Block, Package, PeerId, RumMsg, Trx};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adapters::open_stores;
use crate::container::config::NodeConfig;
use crate::errors::NodeError;
use crate::handlers::{BlockOutcome, ChainSyncHandler};

/// Idle time after which a peer's rate limit bucket is dropped.
const BUCKET_MAX_IDLE_FACTOR: u32 = 10;

pub struct RumNode {
    config: NodeConfig,
    storage: Arc<ChainStorage>,
    peer_store: Arc<RumGroupPeerStore>,
    rex: Arc<RexService>,
    chains: RwLock<HashMap<String, Arc<ChainSyncHandler>>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RumNode {
    pub fn new(config: NodeConfig, transport: Arc<dyn StreamTransport>) -> Result<Self, NodeError> {
        config.validate()?;
        let stores = open_stores(&config)?;
        let storage = Arc::new(ChainStorage::new(stores.chain, stores.groups, config.storage.clone()));
        let peer_store = Arc::new(RumGroupPeerStore::new(config.peer_store.clone()));
        let rex = Arc::new(
            RexService::builder(transport, peer_store.clone(), config.exchange.clone()).build(),
        );

        tracing::info!(
            "[node] node {} ready on {} ({:?} storage)",
            rex.local_peer(),
            rex.protocol_id(),
            config.storage_backend
        );

        Ok(Self {
            config,
            storage,
            peer_store,
            rex,
            chains: RwLock::new(HashMap::new()),
            cancel: CancellationToken::new(),
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<ChainStorage> {
        &self.storage
    }

    pub fn peer_store(&self) -> &Arc<RumGroupPeerStore> {
        &self.peer_store
    }

    pub fn rex(&self) -> &Arc<RexService> {
        &self.rex
    }

    pub fn chain(&self, group_id: &str) -> Option<Arc<ChainSyncHandler>> {
        self.chains.read().get(group_id).cloned()
    }

    pub fn joined_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.chains.read().keys().cloned().collect();
        groups.sort();
        groups
    }

    // =========================================================================
    // GROUPS
    // =========================================================================

    /// Store the group item and its genesis block, then start accepting
    /// chain data for the group.
    pub fn join_group(&self, item: &GroupItem, genesis: Block) -> Result<(), NodeError> {
        if genesis.group_id != item.group_id || genesis.block_id != item.genesis_block_id {
            return Err(NodeError::GenesisMismatch {
                group_id: item.group_id.clone(),
                block_id: genesis.block_id,
            });
        }
        self.storage.add_group(item)?;
        self.storage.add_genesis_block(genesis)?;
        self.register_chain(&item.group_id);
        tracing::info!("[node] joined group {} ({})", item.group_name, item.group_id);
        Ok(())
    }

    /// Stop accepting chain data for the group and delete everything stored
    /// for it.
    pub fn leave_group(&self, group_id: &str) -> Result<(), NodeError> {
        self.rex.chain_unreg(group_id);
        self.chains.write().remove(group_id);
        self.storage.remove_group_data(group_id)?;
        tracing::info!("[node] left group {}", group_id);
        Ok(())
    }

    /// Register a chain for every stored group. Returns how many groups
    /// were resumed.
    pub fn resume_groups(&self) -> Result<usize, NodeError> {
        let groups = self.storage.get_all_groups()?;
        for item in &groups {
            self.register_chain(&item.group_id);
        }
        tracing::info!("[node] resumed {} group(s)", groups.len());
        Ok(groups.len())
    }

    fn register_chain(&self, group_id: &str) {
        let mut chains = self.chains.write();
        if chains.contains_key(group_id) {
            return;
        }
        let handler = Arc::new(ChainSyncHandler::new(group_id, self.storage.clone()));
        chains.insert(group_id.to_string(), handler.clone());
        self.rex.chain_reg(group_id, handler);
    }

    // =========================================================================
    // PUBLISH
    // =========================================================================

    /// Apply a locally produced block and hand it to one peer of the group.
    pub async fn publish_block(&self, block: Block) -> Result<(BlockOutcome, PeerId), NodeError> {
        let chain = self
            .chain(&block.group_id)
            .ok_or_else(|| NodeError::UnknownGroup(block.group_id.clone()))?;
        let msg = RumMsg::chain_data(Package::from_block(&block));
        let outcome = chain.apply_block(block.clone())?;
        let peer = self.publish(&block.group_id, &msg).await?;
        Ok((outcome, peer))
    }

    /// Store a locally produced transaction and hand it to one peer of the
    /// group.
    pub async fn publish_trx(&self, trx: Trx) -> Result<PeerId, NodeError> {
        if self.chain(&trx.group_id).is_none() {
            return Err(NodeError::UnknownGroup(trx.group_id.clone()));
        }
        self.storage.add_trx(&trx)?;
        let msg = RumMsg::chain_data(Package::from_trx(&trx));
        self.publish(&trx.group_id, &msg).await
    }

    async fn publish(&self, group_id: &str, msg: &RumMsg) -> Result<PeerId, NodeError> {
        let group_peers = self.peer_store.get(group_id);
        Ok(self.rex.publish(group_id, &group_peers, msg, &self.cancel).await?)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Spawn the inbound serve loop and the maintenance tick.
    pub fn start(&self) -> Result<(), NodeError> {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return Err(NodeError::AlreadyStarted);
        }

        tasks.push(tokio::spawn(self.rex.clone().serve(self.cancel.child_token())));

        let peer_store = self.peer_store.clone();
        let interval = self.config.maintenance_interval;
        let cancel = self.cancel.child_token();
        tasks.push(tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            tick.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {
                        let expired = peer_store.peers().purge_expired();
                        let idle = peer_store.rate_limiter().cleanup(interval * BUCKET_MAX_IDLE_FACTOR);
                        if expired > 0 || idle > 0 {
                            tracing::debug!(
                                "[node] maintenance: {} expired peer(s), {} idle bucket(s)",
                                expired,
                                idle
                            );
                        }
                    }
                }
            }
        }));

        tracing::info!("[node] started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.lock().is_empty() && !self.cancel.is_cancelled()
    }

    /// Cancel background tasks, wait for them and release sequence leases.
    pub async fn shutdown(&self) -> Result<(), NodeError> {
        self.cancel.cancel();
        let tasks: Vec<JoinHandle<()>> = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("[node] background task failed: {}", e);
            }
        }
        self.storage.release_sequences()?;
        tracing::info!("[node] stopped");
        Ok(())
    }
}
