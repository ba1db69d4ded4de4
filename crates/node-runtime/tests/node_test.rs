//! Node wiring tests: two or three nodes on one in-process network.

use std::sync::Arc;
use std::time::Duration;

use node_runtime::{BlockOutcome, NodeConfig, NodeError, RumNode};
use rum_01_chain_storage::test_utils::{make_block, make_genesis, make_group_item, make_trx, TEST_GROUP};
use rum_01_chain_storage::ChainStorageApi;
use rum_03_exchange::MemoryNetwork;
use shared_types::PeerId;

const WAIT: Duration = Duration::from_secs(2);

fn node(net: &MemoryNetwork, name: &str) -> Arc<RumNode> {
    let transport = net.transport(PeerId::new(name));
    Arc::new(RumNode::new(NodeConfig::for_testing(name), transport).unwrap())
}

fn joined(net: &MemoryNetwork, name: &str) -> Arc<RumNode> {
    let node = node(net, name);
    node.join_group(&make_group_item(TEST_GROUP, "g0"), make_genesis(TEST_GROUP, "g0"))
        .unwrap();
    node.start().unwrap();
    node
}

async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + WAIT;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

fn confirmed(node: &RumNode, block_id: &str) -> bool {
    node.storage().is_block_exist(block_id, false).unwrap_or(false)
}

// =============================================================================
// GROUP LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_join_group_registers_chain() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");

    assert_eq!(a.joined_groups(), vec![TEST_GROUP.to_string()]);
    assert_eq!(a.rex().registered_groups(), vec![TEST_GROUP.to_string()]);
    assert_eq!(a.storage().get_group(TEST_GROUP).unwrap().genesis_block_id, "g0");
    assert_eq!(a.storage().get_block_height("g0").unwrap(), 0);

    a.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_join_group_rejects_foreign_genesis() {
    let net = MemoryNetwork::new();
    let a = node(&net, "node-a");

    let err = a
        .join_group(&make_group_item(TEST_GROUP, "g0"), make_genesis(TEST_GROUP, "other"))
        .unwrap_err();
    assert!(matches!(err, NodeError::GenesisMismatch { .. }));
    assert!(a.joined_groups().is_empty());
}

#[tokio::test]
async fn test_leave_group_removes_everything() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");
    a.chain(TEST_GROUP)
        .unwrap()
        .apply_block(make_block(TEST_GROUP, "b1", "g0"))
        .unwrap();

    a.leave_group(TEST_GROUP).unwrap();

    assert!(a.joined_groups().is_empty());
    assert!(a.rex().registered_groups().is_empty());
    assert!(a.storage().get_group(TEST_GROUP).is_err());
    assert!(!confirmed(&a, "b1"));
    assert!(!confirmed(&a, "g0"));

    a.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_start_twice_fails() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");

    assert!(a.is_running());
    assert!(matches!(a.start(), Err(NodeError::AlreadyStarted)));

    a.shutdown().await.unwrap();
    assert!(!a.is_running());
}

// =============================================================================
// PUBLISH AND SYNC
// =============================================================================

#[tokio::test]
async fn test_block_reaches_peer() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");
    let b = joined(&net, "node-b");
    net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

    let (outcome, peer) = a.publish_block(make_block(TEST_GROUP, "b1", "g0")).await.unwrap();

    assert_eq!(outcome, BlockOutcome::Confirmed { descendants: vec![] });
    assert_eq!(peer, PeerId::new("node-b"));
    assert!(wait_until(|| confirmed(&b, "b1")).await);
    assert_eq!(b.storage().get_block_height("b1").unwrap(), 1);
    // B learned that A serves the group.
    assert_eq!(b.peer_store().get(TEST_GROUP), vec![PeerId::new("node-a")]);

    a.shutdown().await.unwrap();
    b.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_out_of_order_blocks_resolve_on_peer() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");
    let b = joined(&net, "node-b");
    net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

    let (outcome, _) = a.publish_block(make_block(TEST_GROUP, "b2", "b1")).await.unwrap();
    assert_eq!(outcome, BlockOutcome::Cached);
    assert!(wait_until(|| b.storage().is_block_exist("b2", true).unwrap_or(false)).await);

    let (outcome, _) = a.publish_block(make_block(TEST_GROUP, "b1", "g0")).await.unwrap();
    assert_eq!(
        outcome,
        BlockOutcome::Confirmed {
            descendants: vec!["b2".to_string()]
        }
    );

    assert!(wait_until(|| confirmed(&b, "b2")).await);
    assert_eq!(b.storage().get_block_height("b2").unwrap(), 2);
    assert!(!b.storage().is_block_exist("b2", true).unwrap());

    a.shutdown().await.unwrap();
    b.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_trx_reaches_peer() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");
    let b = joined(&net, "node-b");
    net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

    a.publish_trx(make_trx(TEST_GROUP, "t1", 1)).await.unwrap();

    assert!(a.storage().is_trx_exist(TEST_GROUP, "t1", 1).unwrap());
    assert!(wait_until(|| b.storage().is_trx_exist(TEST_GROUP, "t1", 1).unwrap_or(false)).await);

    a.shutdown().await.unwrap();
    b.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_publish_to_unjoined_group_fails() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");

    let err = a
        .publish_block(make_block("not-joined", "x1", "x0"))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::UnknownGroup(_)));

    a.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_publish_without_peers_still_stores_locally() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");

    let err = a
        .publish_block(make_block(TEST_GROUP, "b1", "g0"))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Exchange(_)));
    assert!(confirmed(&a, "b1"));

    a.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_peer_outside_group_drops_block() {
    let net = MemoryNetwork::new();
    let a = joined(&net, "node-a");
    let c = node(&net, "node-c");
    c.start().unwrap();
    net.connect(&PeerId::new("node-a"), &PeerId::new("node-c"));

    // C accepts the stream but has no chain for the group.
    a.publish_block(make_block(TEST_GROUP, "b1", "g0")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!confirmed(&c, "b1"));
    assert!(c.peer_store().get(TEST_GROUP).is_empty());

    a.shutdown().await.unwrap();
    c.shutdown().await.unwrap();
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[cfg(feature = "rocksdb")]
#[tokio::test]
async fn test_rocksdb_node_resumes_groups() {
    use node_runtime::StorageBackend;

    let dir = tempfile::TempDir::new().unwrap();
    let config = || {
        let mut config = NodeConfig::for_testing("node-a");
        config.storage_backend = StorageBackend::RocksDb;
        config.data_dir = dir.path().to_path_buf();
        config
    };

    {
        let net = MemoryNetwork::new();
        let a = RumNode::new(config(), net.transport(PeerId::new("node-a"))).unwrap();
        a.join_group(&make_group_item(TEST_GROUP, "g0"), make_genesis(TEST_GROUP, "g0"))
            .unwrap();
        a.chain(TEST_GROUP)
            .unwrap()
            .apply_block(make_block(TEST_GROUP, "b1", "g0"))
            .unwrap();
        a.shutdown().await.unwrap();
    }

    let net = MemoryNetwork::new();
    let a = RumNode::new(config(), net.transport(PeerId::new("node-a"))).unwrap();
    assert!(a.joined_groups().is_empty());
    assert_eq!(a.resume_groups().unwrap(), 1);
    assert_eq!(a.rex().registered_groups(), vec![TEST_GROUP.to_string()]);
    assert_eq!(a.storage().get_block_height("b1").unwrap(), 1);
}
