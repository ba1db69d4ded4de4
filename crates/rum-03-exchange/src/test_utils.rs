//! Test helpers: in-memory nodes and a chain handler that records what it
//! receives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rum_02_peer_store::{ManualClock, RumGroupPeerStore, RumPeerStoreConfig};
use shared_types::{Block, PeerId, Trx};
use tokio::sync::Notify;

use crate::adapters::{MemoryNetwork, MemoryTransport};
use crate::domain::config::ExchangeConfig;
use crate::domain::errors::ExchangeError;
use crate::ports::outbound::ChainHandler;
use crate::service::RexService;

pub const TEST_GROUP: &str = "3bb7a3be-d145-44af-94cf-e64b992ff8f0";

/// One in-memory node with its own peer store and exchange service.
///
/// The peer store runs on a manual clock so TTLs and bucket refills only
/// move when a test advances it.
pub struct TestNode {
    pub peer: PeerId,
    pub clock: Arc<ManualClock>,
    pub transport: Arc<MemoryTransport>,
    pub peer_store: Arc<RumGroupPeerStore>,
    pub rex: Arc<RexService>,
}

pub fn test_node(net: &MemoryNetwork, name: &str) -> TestNode {
    let peer = PeerId::new(name);
    let transport = net.transport(peer.clone());
    let clock = Arc::new(ManualClock::new());
    let peer_store = Arc::new(RumGroupPeerStore::with_clock(
        RumPeerStoreConfig::for_testing(),
        clock.clone(),
    ));
    let rex = Arc::new(
        RexService::builder(transport.clone(), peer_store.clone(), ExchangeConfig::for_testing()).build(),
    );
    TestNode {
        peer,
        clock,
        transport,
        peer_store,
        rex,
    }
}

pub fn sample_trx(group_id: &str, trx_id: &str) -> Trx {
    Trx {
        trx_id: trx_id.to_string(),
        group_id: group_id.to_string(),
        data: trx_id.as_bytes().to_vec(),
        ..Default::default()
    }
}

pub fn sample_block(group_id: &str, block_id: &str, prev_block_id: &str) -> Block {
    Block {
        group_id: group_id.to_string(),
        block_id: block_id.to_string(),
        prev_block_id: prev_block_id.to_string(),
        producer_pubkey: "producer".to_string(),
        ..Default::default()
    }
}

/// Chain handler that keeps everything it is given.
#[derive(Default)]
pub struct RecordingChain {
    trxs: Mutex<Vec<(Trx, PeerId)>>,
    blocks: Mutex<Vec<(Block, PeerId)>>,
    notify: Notify,
}

impl RecordingChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn trxs(&self) -> Vec<(Trx, PeerId)> {
        self.trxs.lock().clone()
    }

    pub fn blocks(&self) -> Vec<(Block, PeerId)> {
        self.blocks.lock().clone()
    }

    fn received(&self) -> usize {
        self.trxs.lock().len() + self.blocks.lock().len()
    }

    /// Wait until `count` items arrived in total; false on timeout.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.notify.notified();
            if self.received() >= count {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.received() >= count;
            }
        }
    }
}

#[async_trait]
impl ChainHandler for RecordingChain {
    async fn handle_trx_with_rex(&self, trx: Trx, from: PeerId) -> Result<(), ExchangeError> {
        self.trxs.lock().push((trx, from));
        self.notify.notify_waiters();
        Ok(())
    }

    async fn handle_block_with_rex(&self, block: Block, from: PeerId) -> Result<(), ExchangeError> {
        self.blocks.lock().push((block, from));
        self.notify.notify_waiters();
        Ok(())
    }
}
