//! # Multi-Node Sync Flows
//!
//! Full nodes (storage, peer store, exchange, chain sync) talking over one
//! in-process network.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use node_runtime::{NodeConfig, RumNode};
    use rum_01_chain_storage::test_utils::{
        make_chain, make_genesis, make_group_item, make_trx, OTHER_GROUP, TEST_GROUP,
    };
    use rum_01_chain_storage::ChainStorageApi;
    use rum_03_exchange::MemoryNetwork;
    use shared_types::{Package, PeerId, RumMsg};

    const WAIT: Duration = Duration::from_secs(3);

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn genesis_id(group: &str) -> &'static str {
        if group == TEST_GROUP {
            "g0"
        } else {
            "h0"
        }
    }

    fn start_node(net: &MemoryNetwork, name: &str, groups: &[&str]) -> Arc<RumNode> {
        let node = Arc::new(
            RumNode::new(NodeConfig::for_testing(name), net.transport(PeerId::new(name))).unwrap(),
        );
        for group in groups {
            let genesis = genesis_id(group);
            node.join_group(&make_group_item(group, genesis), make_genesis(group, genesis))
                .unwrap();
        }
        node.start().unwrap();
        node
    }

    async fn eventually(mut check: impl FnMut() -> bool) -> bool {
        let deadline = tokio::time::Instant::now() + WAIT;
        while tokio::time::Instant::now() < deadline {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        check()
    }

    fn has_block(node: &RumNode, block_id: &str) -> bool {
        node.storage().is_block_exist(block_id, false).unwrap_or(false)
    }

    // =========================================================================
    // REPLICATION
    // =========================================================================

    #[tokio::test]
    async fn test_chain_replicates_block_by_block() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

        let ids: Vec<String> = (1..=10).map(|i| format!("b{}", i)).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        for block in make_chain(TEST_GROUP, "g0", &id_refs) {
            a.publish_block(block).await.unwrap();
        }

        assert!(eventually(|| has_block(&b, "b10")).await);
        for (height, id) in ids.iter().enumerate() {
            assert_eq!(b.storage().get_block_height(id).unwrap(), height as i64 + 1);
        }
        assert_eq!(
            b.storage().get_sub_blocks("b9").unwrap()[0].block_id,
            "b10".to_string()
        );

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_reverse_delivery_resolves_on_last_block() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));
        let peer_b = PeerId::new("node-b");

        let chain = make_chain(TEST_GROUP, "g0", &["b1", "b2", "b3", "b4", "b5"]);
        for block in chain.iter().skip(1).rev() {
            let msg = RumMsg::chain_data(Package::from_block(block));
            a.rex().publish_to_peer(&peer_b, &msg).await.unwrap();
        }
        assert!(eventually(|| b.storage().is_block_exist("b2", true).unwrap_or(false)).await);
        assert!(!has_block(&b, "b5"));

        let msg = RumMsg::chain_data(Package::from_block(&chain[0]));
        a.rex().publish_to_peer(&peer_b, &msg).await.unwrap();

        assert!(eventually(|| has_block(&b, "b5")).await);
        assert_eq!(b.storage().get_block_height("b5").unwrap(), 5);
        for block in &chain {
            assert!(!b.storage().is_block_exist(&block.block_id, true).unwrap());
        }

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_trxs_follow_blocks() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

        for nonce in 1..=3 {
            a.publish_trx(make_trx(TEST_GROUP, &format!("t{}", nonce), nonce))
                .await
                .unwrap();
        }

        assert!(eventually(|| b.storage().list_trx(TEST_GROUP).map(|t| t.len()).unwrap_or(0) == 3).await);
        assert_eq!(a.storage().list_trx(TEST_GROUP).unwrap().len(), 3);

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
    }

    // =========================================================================
    // GROUP ISOLATION
    // =========================================================================

    #[tokio::test]
    async fn test_block_for_unjoined_group_is_dropped() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP, OTHER_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

        let other = make_chain(OTHER_GROUP, "h0", &["x1"]).remove(0);
        a.publish_block(other).await.unwrap();
        let mine = make_chain(TEST_GROUP, "g0", &["b1"]).remove(0);
        a.publish_block(mine).await.unwrap();

        assert!(eventually(|| has_block(&b, "b1")).await);
        assert!(!has_block(&b, "x1"));
        assert!(!b.storage().is_block_exist("x1", true).unwrap());
        assert_eq!(b.peer_store().get(TEST_GROUP), vec![PeerId::new("node-a")]);
        assert!(b.peer_store().get(OTHER_GROUP).is_empty());

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_left_group_no_longer_syncs() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        net.connect(&PeerId::new("node-a"), &PeerId::new("node-b"));

        let chain = make_chain(TEST_GROUP, "g0", &["b1", "b2"]);
        a.publish_block(chain[0].clone()).await.unwrap();
        assert!(eventually(|| has_block(&b, "b1")).await);

        b.leave_group(TEST_GROUP).unwrap();
        a.publish_block(chain[1].clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!has_block(&b, "b1"));
        assert!(!has_block(&b, "b2"));
        assert!(!b.storage().is_block_exist("b2", true).unwrap());

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_publish_falls_back_when_group_peer_goes_away() {
        let net = MemoryNetwork::new();
        let a = start_node(&net, "node-a", &[TEST_GROUP]);
        let b = start_node(&net, "node-b", &[TEST_GROUP]);
        let c = start_node(&net, "node-c", &[TEST_GROUP]);
        let (pa, pb, pc) = (PeerId::new("node-a"), PeerId::new("node-b"), PeerId::new("node-c"));
        net.connect(&pa, &pb);
        net.connect(&pa, &pc);

        // Teach A that both serve the group.
        for node in [&b, &c] {
            let block = make_chain(TEST_GROUP, "g0", &["seed"]).remove(0);
            node.publish_block(block).await.unwrap();
        }
        assert!(eventually(|| a.peer_store().get(TEST_GROUP).len() == 2).await);

        net.shutdown(&pb);
        let block = make_chain(TEST_GROUP, "seed", &["b2"]).remove(0);
        let (_, peer) = a.publish_block(block).await.unwrap();

        assert_eq!(peer, pc);
        assert!(eventually(|| has_block(&c, "b2")).await);

        a.shutdown().await.unwrap();
        b.shutdown().await.unwrap();
        c.shutdown().await.unwrap();
    }
}
