//! # Chain Storage Properties
//!
//! Block DAG properties checked through the node's chain sync handler, so
//! storage and the orphan resolution policy are exercised together.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use node_runtime::{BlockOutcome, ChainSyncHandler};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rum_01_chain_storage::test_utils::{make_block, make_genesis, TEST_GROUP};
    use rum_01_chain_storage::{ChainStorage, ChainStorageApi, ChainStorageConfig, KeyValueStore};
    use shared_types::Block;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn storage() -> Arc<ChainStorage> {
        Arc::new(ChainStorage::new_in_memory(ChainStorageConfig::for_testing()))
    }

    /// A tree under `g0`: each block i > 0 hangs off a random earlier block.
    fn random_tree(rng: &mut StdRng, size: usize) -> Vec<Block> {
        let mut ids = vec!["g0".to_string()];
        let mut blocks = Vec::with_capacity(size);
        for i in 1..=size {
            let parent = ids[rng.gen_range(0..ids.len())].clone();
            let id = format!("b{:03}", i);
            blocks.push(make_block(TEST_GROUP, &id, &parent));
            ids.push(id);
        }
        blocks
    }

    fn assert_heights_consistent(storage: &ChainStorage, blocks: &[Block]) {
        assert_eq!(storage.get_block_height("g0").unwrap(), 0);
        for block in blocks {
            let height = storage.get_block_height(&block.block_id).unwrap();
            let parent_height = storage.get_block_height(&block.prev_block_id).unwrap();
            assert_eq!(height, parent_height + 1, "height of {}", block.block_id);
        }
    }

    // =========================================================================
    // IDEMPOTENT ADD
    // =========================================================================

    #[test]
    fn test_add_block_twice_leaves_one_child_link() {
        let storage = storage();
        storage.add_genesis_block(make_genesis(TEST_GROUP, "g0")).unwrap();
        let b1 = make_block(TEST_GROUP, "b1", "g0");

        storage.add_block(b1.clone(), false).unwrap();
        let snapshot = storage.db().prefix_scan(b"").unwrap();
        storage.add_block(b1, false).unwrap();

        assert_eq!(storage.db().prefix_scan(b"").unwrap(), snapshot);
        assert_eq!(
            storage.get_block_chunk("g0", false).unwrap().sub_block_ids,
            vec!["b1".to_string()]
        );
    }

    // =========================================================================
    // HEIGHTS, DISJOINTNESS AND ORPHAN RESOLUTION
    // =========================================================================

    #[test]
    fn test_any_arrival_order_confirms_whole_tree() {
        for seed in 0..8u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let storage = storage();
            storage.add_genesis_block(make_genesis(TEST_GROUP, "g0")).unwrap();
            let chain = ChainSyncHandler::new(TEST_GROUP, storage.clone());

            let tree = random_tree(&mut rng, 24);
            let mut arrivals = tree.clone();
            arrivals.shuffle(&mut rng);

            for block in arrivals {
                chain.apply_block(block).unwrap();

                let confirmed: HashSet<String> = tree
                    .iter()
                    .filter(|b| storage.is_block_exist(&b.block_id, false).unwrap())
                    .map(|b| b.block_id.clone())
                    .collect();
                for id in &confirmed {
                    assert!(
                        !storage.is_block_exist(id, true).unwrap(),
                        "seed {}: {} in both namespaces",
                        seed,
                        id
                    );
                }
            }

            for block in &tree {
                assert!(storage.is_block_exist(&block.block_id, false).unwrap());
                assert!(!storage.is_block_exist(&block.block_id, true).unwrap());
            }
            assert_heights_consistent(&storage, &tree);
        }
    }

    #[test]
    fn test_gather_orders_parents_before_children() {
        let storage = storage();
        storage.add_genesis_block(make_genesis(TEST_GROUP, "B")).unwrap();
        for (id, parent) in [("C2", "C1"), ("C3", "C1"), ("C1", "B")] {
            storage.add_block(make_block(TEST_GROUP, id, parent), true).unwrap();
        }

        let root = storage.get_block("B", false).unwrap();
        let gathered = storage.gather_blocks_from_cache(root, true).unwrap();
        let ids: Vec<&str> = gathered.iter().map(|b| b.block_id.as_str()).collect();

        assert_eq!(&ids[..2], &["B", "C1"]);
        let mut rest = ids[2..].to_vec();
        rest.sort();
        assert_eq!(rest, vec!["C2", "C3"]);

        for block in gathered.into_iter().skip(1) {
            storage.add_block(block, false).unwrap();
        }
        assert_eq!(storage.get_block_height("C1").unwrap(), 1);
        assert_eq!(storage.get_block_height("C2").unwrap(), 2);
        assert_eq!(storage.get_block_height("C3").unwrap(), 2);
    }

    #[test]
    fn test_block_before_genesis_scenario() {
        let storage = storage();
        let chain = ChainSyncHandler::new(TEST_GROUP, storage.clone());

        let outcome = chain.apply_block(make_block(TEST_GROUP, "b1", "g0")).unwrap();
        assert_eq!(outcome, BlockOutcome::Cached);

        let genesis = make_genesis(TEST_GROUP, "g0");
        storage.add_genesis_block(genesis.clone()).unwrap();
        let gathered = storage.gather_blocks_from_cache(genesis, true).unwrap();
        let ids: Vec<&str> = gathered.iter().map(|b| b.block_id.as_str()).collect();
        assert_eq!(ids, vec!["g0", "b1"]);

        storage.add_block(gathered[1].clone(), false).unwrap();
        assert_eq!(storage.get_block_height("b1").unwrap(), 1);
        assert!(!storage.is_block_exist("b1", true).unwrap());
    }

    #[test]
    fn test_groups_do_not_share_orphans() {
        use rum_01_chain_storage::test_utils::OTHER_GROUP;

        let storage = storage();
        storage.add_genesis_block(make_genesis(TEST_GROUP, "g0")).unwrap();
        let chain = ChainSyncHandler::new(TEST_GROUP, storage.clone());

        // Same parent id, different group: must stay cached.
        storage
            .add_block(make_block(OTHER_GROUP, "x1", "b1"), true)
            .unwrap();
        chain.apply_block(make_block(TEST_GROUP, "b2", "b1")).unwrap();
        let outcome = chain.apply_block(make_block(TEST_GROUP, "b1", "g0")).unwrap();

        assert_eq!(
            outcome,
            BlockOutcome::Confirmed {
                descendants: vec!["b2".to_string()]
            }
        );
        assert!(storage.is_block_exist("x1", true).unwrap());
        assert!(!storage.is_block_exist("x1", false).unwrap());
    }
}
