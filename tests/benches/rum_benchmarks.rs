//! # Rum Benchmarks
//!
//! | Group | Measures |
//! |-------|----------|
//! | rum-01-gather-from-cache | Orphan scan cost vs cache size and depth |
//! | rum-01-confirm | Linear chain confirmation |
//! | rum-02-filter-peers | Peer selection per publish |
//! | rum-02-leaky-bucket-add | Rate limiter accounting |

use criterion::{criterion_group, criterion_main};
use rum_tests::benchmarks::{rum_01_chain_storage, rum_02_peer_store};

criterion_group!(
    chain_storage,
    rum_01_chain_storage::bench_gather_blocks_from_cache,
    rum_01_chain_storage::bench_confirm_chain
);
criterion_group!(
    peer_store,
    rum_02_peer_store::bench_filter_peers,
    rum_02_peer_store::bench_rate_limiter
);
criterion_main!(chain_storage, peer_store);
