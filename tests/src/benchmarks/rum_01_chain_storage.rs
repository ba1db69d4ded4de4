//! # Chain Storage Benchmarks
//!
//! - Orphan resolution: `gather_blocks_from_cache` rescans the cached
//!   namespace once per gathered block, so cost grows with cache size times
//!   gathered depth.
//! - Confirmation: `add_block` on a confirmed parent (read parent, batch
//!   write parent + child).

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rum_01_chain_storage::test_utils::{make_block, make_chain, make_genesis, TEST_GROUP};
use rum_01_chain_storage::{ChainStorage, ChainStorageApi, ChainStorageConfig};

fn storage_with_genesis() -> ChainStorage {
    let storage = ChainStorage::new_in_memory(ChainStorageConfig::default());
    storage
        .add_genesis_block(make_genesis(TEST_GROUP, "g0"))
        .expect("genesis");
    storage
}

/// Cache `depth` linked orphans under `b1` plus `noise` unrelated ones.
fn cached_storage(depth: usize, noise: usize) -> ChainStorage {
    let storage = storage_with_genesis();
    let ids: Vec<String> = (0..depth).map(|i| format!("o{:05}", i)).collect();
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    for block in make_chain(TEST_GROUP, "b1", &refs) {
        storage.add_block(block, true).expect("cache orphan");
    }
    for i in 0..noise {
        let block = make_block(TEST_GROUP, &format!("n{:05}", i), &format!("missing{:05}", i));
        storage.add_block(block, true).expect("cache noise");
    }
    storage
        .add_block(make_block(TEST_GROUP, "b1", "g0"), false)
        .expect("confirm b1");
    storage
}

pub fn bench_gather_blocks_from_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("rum-01-gather-from-cache");

    for (depth, noise) in [(1, 100), (10, 100), (10, 1_000), (50, 1_000)] {
        let storage = cached_storage(depth, noise);
        let root = storage.get_block("b1", false).expect("b1");

        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(
            BenchmarkId::new(format!("depth_{}", depth), noise),
            &root,
            |b, root| {
                b.iter(|| {
                    let gathered = storage
                        .gather_blocks_from_cache(root.clone(), true)
                        .expect("gather");
                    black_box(gathered.len())
                })
            },
        );
    }

    group.finish();
}

pub fn bench_confirm_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("rum-01-confirm");

    for len in [10usize, 100] {
        let ids: Vec<String> = (0..len).map(|i| format!("b{:05}", i)).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let chain = make_chain(TEST_GROUP, "g0", &refs);

        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("add_block_linear", len), &chain, |b, chain| {
            b.iter_with_setup(storage_with_genesis, |storage| {
                for block in chain {
                    storage.add_block(block.clone(), false).expect("confirm");
                }
                black_box(storage)
            })
        });
    }

    group.finish();
}
