//! # Peer Selection Properties
//!
//! Peer filter, reputation and TTL behaviour as seen through publishing on
//! the exchange.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use rum_02_peer_store::test_utils::make_peers;
    use rum_02_peer_store::{ManualClock, RumGroupPeerStore, RumPeerStoreConfig};
    use rum_03_exchange::test_utils::{sample_block, test_node, RecordingChain, TestNode, TEST_GROUP};
    use rum_03_exchange::{ExchangeError, MemoryNetwork, PeerFault};
    use shared_types::{Package, PeerId, RumMsg};
    use tokio_util::sync::CancellationToken;

    const WAIT: Duration = Duration::from_secs(2);

    fn peer_store() -> (Arc<ManualClock>, RumGroupPeerStore) {
        let clock = Arc::new(ManualClock::new());
        let store = RumGroupPeerStore::with_clock(RumPeerStoreConfig::for_testing(), clock.clone());
        (clock, store)
    }

    fn block_msg(id: &str) -> RumMsg {
        RumMsg::chain_data(Package::from_block(&sample_block(TEST_GROUP, id, "g0")))
    }

    /// `count` receivers connected to one sender, each serving with a
    /// recording chain.
    fn star(net: &MemoryNetwork, count: usize) -> (TestNode, Vec<(TestNode, Arc<RecordingChain>)>, CancellationToken) {
        let cancel = CancellationToken::new();
        let sender = test_node(net, "sender");
        let receivers = (0..count)
            .map(|i| {
                let node = test_node(net, &format!("receiver-{}", i));
                let chain = RecordingChain::new();
                node.rex.chain_reg(TEST_GROUP, chain.clone());
                net.connect(&sender.peer, &node.peer);
                tokio::spawn(node.rex.clone().serve(cancel.clone()));
                (node, chain)
            })
            .collect();
        (sender, receivers, cancel)
    }

    // =========================================================================
    // PEER FILTER FLOOR
    // =========================================================================

    #[test]
    fn test_filter_keeps_fraction_with_floor() {
        let (_clock, store) = peer_store();
        let required = RumPeerStoreConfig::for_testing().rate_limit.required_peers;

        for n in [required, 5, 10, 17, 40] {
            for fraction in [0.1, 0.5, 0.7, 1.0] {
                let kept = store.filter_peers(make_peers(n), fraction);
                let expected = ((n as f64 * fraction).round() as usize).max(required).min(n);
                assert_eq!(kept.len(), expected, "n={} f={}", n, fraction);
            }
        }
    }

    #[test]
    fn test_filter_excludes_bad_peers_regardless_of_score() {
        let (_clock, store) = peer_store();
        let peers = make_peers(10);
        let threshold = store.scorers().bad_responses().threshold();

        // The bad peer has the best provider record.
        store.scorers().block_provider().touch_n(&peers[0], 1_000);
        for _ in 0..=threshold {
            store.scorers().bad_responses().increment(&peers[0]);
        }

        let kept = store.filter_peers(peers.clone(), 1.0);
        assert_eq!(kept.len(), 9);
        assert!(!kept.contains(&peers[0]));
    }

    // =========================================================================
    // REPUTATION AND TTL
    // =========================================================================

    #[test]
    fn test_strikes_past_threshold_mark_peer_bad() {
        let (_clock, store) = peer_store();
        let peer = PeerId::new("flaky");
        let scorer = store.scorers().bad_responses();

        for _ in 0..scorer.threshold() {
            scorer.increment(&peer);
            assert!(!scorer.is_bad_peer(&peer));
        }
        scorer.increment(&peer);
        assert!(scorer.is_bad_peer(&peer));
    }

    #[test]
    fn test_membership_expires_after_ttl() {
        let (clock, store) = peer_store();
        let peer = PeerId::new("member");

        store.save(TEST_GROUP, peer.clone(), Duration::from_secs(2));
        assert_eq!(store.get(TEST_GROUP), vec![peer.clone()]);

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.get(TEST_GROUP), vec![peer]);

        clock.advance(Duration::from_millis(1_500));
        assert!(store.get(TEST_GROUP).is_empty());
    }

    // =========================================================================
    // PUBLISH AT MOST ONE
    // =========================================================================

    #[tokio::test]
    async fn test_publish_reaches_exactly_one_peer() {
        let net = MemoryNetwork::new();
        let (sender, receivers, cancel) = star(&net, 5);

        let chosen = sender
            .rex
            .publish(TEST_GROUP, &[], &block_msg("b1"), &CancellationToken::new())
            .await
            .unwrap();

        let (_, chain) = receivers
            .iter()
            .find(|(node, _)| node.peer == chosen)
            .unwrap();
        assert!(chain.wait_for(1, WAIT).await);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let observed: usize = receivers.iter().map(|(_, chain)| chain.blocks().len()).sum();
        assert_eq!(observed, 1);
        assert_eq!(net.stats().opened(), 1);

        cancel.cancel();
    }

    #[tokio::test]
    async fn test_publish_with_every_peer_failing() {
        let net = MemoryNetwork::new();
        let (sender, receivers, cancel) = star(&net, 3);
        for (node, _) in &receivers {
            net.set_fault(&node.peer, Some(PeerFault::Unreachable));
        }

        let err = sender
            .rex
            .publish(TEST_GROUP, &[], &block_msg("b1"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::NoPeersAvailable { .. }));
        for (node, chain) in &receivers {
            assert!(chain.blocks().is_empty());
            assert_eq!(sender.peer_store.scorers().bad_responses().count(&node.peer), 1);
        }

        cancel.cancel();
    }

    #[tokio::test]
    async fn test_repeat_failures_take_peer_out_of_rotation() {
        let net = MemoryNetwork::new();
        let (sender, receivers, cancel) = star(&net, 4);
        let flaky = receivers[0].0.peer.clone();
        net.set_fault(&flaky, Some(PeerFault::DropsStreams));

        let threshold = sender.peer_store.scorers().bad_responses().threshold();
        for i in 0..=threshold {
            // Only the flaky peer is offered, so every publish strikes it.
            let result = sender
                .rex
                .publish(TEST_GROUP, &[flaky.clone()], &block_msg(&format!("b{}", i)), &CancellationToken::new())
                .await;
            assert!(result.is_err());
        }
        assert!(sender.peer_store.scorers().bad_responses().is_bad_peer(&flaky));

        net.set_fault(&flaky, None);
        let all: Vec<PeerId> = receivers.iter().map(|(node, _)| node.peer.clone()).collect();
        for i in 0..8 {
            let chosen = sender
                .rex
                .publish(TEST_GROUP, &all, &block_msg(&format!("c{}", i)), &CancellationToken::new())
                .await
                .unwrap();
            assert_ne!(chosen, flaky);
        }

        cancel.cancel();
    }
}
