//! Block and transaction builders shared by unit, integration and bench code.

use shared_types::{Block, Trx, TrxType};

use crate::domain::entities::GroupItem;

pub const TEST_GROUP: &str = "5c5c5d1a-2f0e-4b5b-9d4c-3a7f0c7e2b11";
pub const OTHER_GROUP: &str = "9b1f7f52-6c1e-4a0d-8d2e-0f3b6a1c4d22";

/// A block of `group_id` whose parent is `prev_block_id` (empty for genesis).
pub fn make_block(group_id: &str, block_id: &str, prev_block_id: &str) -> Block {
    Block {
        group_id: group_id.to_string(),
        block_id: block_id.to_string(),
        prev_block_id: prev_block_id.to_string(),
        producer_pubkey: "producer".to_string(),
        time_stamp: 1_700_000_000,
        trxs: Vec::new(),
        signature: vec![0xAB; 8],
    }
}

pub fn make_genesis(group_id: &str, block_id: &str) -> Block {
    make_block(group_id, block_id, "")
}

pub fn make_trx(group_id: &str, trx_id: &str, nonce: i64) -> Trx {
    Trx {
        trx_id: trx_id.to_string(),
        group_id: group_id.to_string(),
        trx_type: TrxType::Post as i32,
        data: b"payload".to_vec(),
        sender_pubkey: "sender".to_string(),
        nonce,
        time_stamp: 1_700_000_000 + nonce,
        sender_sign: vec![0xCD; 8],
    }
}

pub fn make_group_item(group_id: &str, genesis_block_id: &str) -> GroupItem {
    GroupItem {
        group_id: group_id.to_string(),
        group_name: format!("group-{}", &group_id[..8.min(group_id.len())]),
        owner_pubkey: "owner".to_string(),
        user_sign_pubkey: "user".to_string(),
        genesis_block_id: genesis_block_id.to_string(),
        consensus_type: "poa".to_string(),
        app_key: "test_app".to_string(),
        last_updated: 1_700_000_000,
    }
}

/// Linear chain `ids[0] <- ids[1] <- ...` of `group_id`, rooted at `root`.
pub fn make_chain(group_id: &str, root: &str, ids: &[&str]) -> Vec<Block> {
    let mut parent = root.to_string();
    ids.iter()
        .map(|id| {
            let block = make_block(group_id, id, &parent);
            parent = id.to_string();
            block
        })
        .collect()
}
