//! # Peer Store Benchmarks
//!
//! `filter_peers` runs on every publish: bad-peer filtering, weighted
//! sampling by combined score, then trimming.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rum_02_peer_store::test_utils::make_peers;
use rum_02_peer_store::{RumGroupPeerStore, RumPeerStoreConfig};

fn scored_store(peers: &[shared_types::PeerId]) -> RumGroupPeerStore {
    let store = RumGroupPeerStore::new(RumPeerStoreConfig::for_testing());
    for (i, peer) in peers.iter().enumerate() {
        store.scorers().block_provider().touch_n(peer, (i % 7) as u64 * 10);
        if i % 5 == 0 {
            store.rate_limiter().add(peer.as_str(), (i as u64) % 200);
        }
        if i % 11 == 0 {
            for _ in 0..=store.scorers().bad_responses().threshold() {
                store.scorers().bad_responses().increment(peer);
            }
        }
    }
    store
}

pub fn bench_filter_peers(c: &mut Criterion) {
    let mut group = c.benchmark_group("rum-02-filter-peers");

    for n in [10usize, 50, 200, 1_000] {
        let peers = make_peers(n);
        let store = scored_store(&peers);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &peers, |b, peers| {
            b.iter(|| black_box(store.filter_peers(peers.clone(), 0.7)))
        });
    }

    group.finish();
}

pub fn bench_rate_limiter(c: &mut Criterion) {
    let store = RumGroupPeerStore::new(RumPeerStoreConfig::for_testing());
    let peers = make_peers(100);

    c.bench_function("rum-02-leaky-bucket-add", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let peer = &peers[i % peers.len()];
            i += 1;
            black_box(store.rate_limiter().add(peer.as_str(), 1))
        })
    });
}
