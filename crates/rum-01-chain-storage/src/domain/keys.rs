//! # Key Schema
//!
//! The only producer of store keys. Every key is `<kind>_...` with `_` as the
//! separator, and every group-scoped key starts with `<kind>_<group_id>_`, so
//! a prefix scan or delete over that prefix touches exactly one group's kind.
//!
//! Ids are opaque. Group and trx ids sit in the middle of a key, so they are
//! escaped (`%` as `%25`, `_` as `%5F`) and never contain the separator; the
//! group `team` therefore never prefixes keys of group `team_b`. Trailing
//! segments (block ids, pubkeys, config names) are stored as given.
//!
//! Block chunks are not group-scoped: a block id is unique across groups,
//! and teardown filters the block namespaces by the chunk's group id.

use shared_types::TrxType;

pub const BLK_PREFIX: &str = "blk";
pub const CHD_PREFIX: &str = "chd";
pub const TRX_PREFIX: &str = "trx";
pub const PRD_PREFIX: &str = "prd";
pub const SYNCER_PREFIX: &str = "syncer";
pub const USR_PREFIX: &str = "usr";
pub const ANN_PREFIX: &str = "ann";
pub const SMA_PREFIX: &str = "sma";
pub const CHAIN_CONFIG_PREFIX: &str = "chn_conf";
pub const APP_CONFIG_PREFIX: &str = "app_conf";
pub const NONCE_PREFIX: &str = "nonce";
pub const CONSENSUS_NONCE_PREFIX: &str = "consensus_nonce";
pub const SNAPSHOT_PREFIX: &str = "snapshot";
pub const GROUPITEM_PREFIX: &str = "grpitem";

const TRX_AUTH_TYPE: &str = "trx_auth";
const ALLOW_LIST: &str = "alw_list";
const DENY_LIST: &str = "dny_list";

/// Escape an id used as an inner key segment so it cannot contain `_`.
pub fn escape_segment(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        match c {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            c => out.push(c),
        }
    }
    out
}

fn scoped(kind: &str, group_id: &str) -> String {
    format!("{}_{}_", kind, escape_segment(group_id))
}

// =============================================================================
// BLOCKS
// =============================================================================

pub fn block_prefix() -> Vec<u8> {
    format!("{}_", BLK_PREFIX).into_bytes()
}

pub fn block_key(block_id: &str) -> Vec<u8> {
    format!("{}_{}", BLK_PREFIX, block_id).into_bytes()
}

pub fn cached_block_prefix() -> Vec<u8> {
    format!("{}_{}_", CHD_PREFIX, BLK_PREFIX).into_bytes()
}

pub fn cached_block_key(block_id: &str) -> Vec<u8> {
    format!("{}_{}_{}", CHD_PREFIX, BLK_PREFIX, block_id).into_bytes()
}

/// Key of a chunk in the namespace selected by `cached`.
pub fn chunk_key(block_id: &str, cached: bool) -> Vec<u8> {
    if cached {
        cached_block_key(block_id)
    } else {
        block_key(block_id)
    }
}

pub fn chunk_prefix(cached: bool) -> Vec<u8> {
    if cached {
        cached_block_prefix()
    } else {
        block_prefix()
    }
}

// =============================================================================
// GROUP SUB-LEDGERS
// =============================================================================

pub fn trx_prefix(group_id: &str) -> Vec<u8> {
    scoped(TRX_PREFIX, group_id).into_bytes()
}

/// All stored nonces of one trx share this prefix.
pub fn trx_id_prefix(group_id: &str, trx_id: &str) -> Vec<u8> {
    format!("{}{}_", scoped(TRX_PREFIX, group_id), escape_segment(trx_id)).into_bytes()
}

pub fn trx_key(group_id: &str, trx_id: &str, nonce: i64) -> Vec<u8> {
    format!(
        "{}{}_{}",
        scoped(TRX_PREFIX, group_id),
        escape_segment(trx_id),
        nonce
    )
    .into_bytes()
}

pub fn producer_prefix(group_id: &str) -> Vec<u8> {
    scoped(PRD_PREFIX, group_id).into_bytes()
}

pub fn producer_key(group_id: &str, pubkey: &str) -> Vec<u8> {
    format!("{}{}", scoped(PRD_PREFIX, group_id), pubkey).into_bytes()
}

pub fn syncer_prefix(group_id: &str) -> Vec<u8> {
    scoped(SYNCER_PREFIX, group_id).into_bytes()
}

pub fn syncer_key(group_id: &str, pubkey: &str) -> Vec<u8> {
    format!("{}{}", scoped(SYNCER_PREFIX, group_id), pubkey).into_bytes()
}

pub fn chain_config_prefix(group_id: &str) -> Vec<u8> {
    scoped(CHAIN_CONFIG_PREFIX, group_id).into_bytes()
}

pub fn trx_auth_key(group_id: &str, trx_type: TrxType) -> Vec<u8> {
    format!(
        "{}{}_{}",
        scoped(CHAIN_CONFIG_PREFIX, group_id),
        TRX_AUTH_TYPE,
        trx_type.as_key()
    )
    .into_bytes()
}

pub fn allow_list_prefix(group_id: &str) -> Vec<u8> {
    format!("{}{}_", scoped(CHAIN_CONFIG_PREFIX, group_id), ALLOW_LIST).into_bytes()
}

pub fn allow_list_key(group_id: &str, pubkey: &str) -> Vec<u8> {
    let mut key = allow_list_prefix(group_id);
    key.extend_from_slice(pubkey.as_bytes());
    key
}

pub fn deny_list_prefix(group_id: &str) -> Vec<u8> {
    format!("{}{}_", scoped(CHAIN_CONFIG_PREFIX, group_id), DENY_LIST).into_bytes()
}

pub fn deny_list_key(group_id: &str, pubkey: &str) -> Vec<u8> {
    let mut key = deny_list_prefix(group_id);
    key.extend_from_slice(pubkey.as_bytes());
    key
}

pub fn app_config_prefix(group_id: &str) -> Vec<u8> {
    scoped(APP_CONFIG_PREFIX, group_id).into_bytes()
}

pub fn app_config_key(group_id: &str, name: &str) -> Vec<u8> {
    format!("{}{}", scoped(APP_CONFIG_PREFIX, group_id), name).into_bytes()
}

pub fn nonce_key(group_id: &str) -> Vec<u8> {
    format!("{}seq", scoped(NONCE_PREFIX, group_id)).into_bytes()
}

pub fn consensus_nonce_key(group_id: &str) -> Vec<u8> {
    format!("{}seq", scoped(CONSENSUS_NONCE_PREFIX, group_id)).into_bytes()
}

pub fn snapshot_key(group_id: &str) -> Vec<u8> {
    format!("{}tag", scoped(SNAPSHOT_PREFIX, group_id)).into_bytes()
}

/// Every group-scoped prefix in the data store, in teardown order.
pub fn group_prefixes(group_id: &str) -> Vec<Vec<u8>> {
    [
        TRX_PREFIX,
        PRD_PREFIX,
        SYNCER_PREFIX,
        USR_PREFIX,
        ANN_PREFIX,
        SMA_PREFIX,
        CHAIN_CONFIG_PREFIX,
        APP_CONFIG_PREFIX,
        NONCE_PREFIX,
        CONSENSUS_NONCE_PREFIX,
        SNAPSHOT_PREFIX,
    ]
    .iter()
    .map(|kind| scoped(kind, group_id).into_bytes())
    .collect()
}

// =============================================================================
// GROUPS STORE
// =============================================================================

pub fn group_item_prefix() -> Vec<u8> {
    format!("{}_", GROUPITEM_PREFIX).into_bytes()
}

pub fn group_item_key(group_id: &str) -> Vec<u8> {
    format!("{}_{}", GROUPITEM_PREFIX, group_id).into_bytes()
}
