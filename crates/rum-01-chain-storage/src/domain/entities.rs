//! # Sub-ledger Records
//!
//! Records kept per group next to the block DAG. They are encoded with
//! bincode; blocks and transactions keep their field-tagged wire encoding.

use serde::{Deserialize, Serialize};
use shared_types::{GroupId, TrxType};

/// Add/remove action carried by membership and rule updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupAction {
    Add,
    Remove,
}

/// Where a transaction lookup should search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrxStorageType {
    /// Transactions of confirmed blocks, stored under the trx namespace.
    Chain,
    /// Transactions still inside cached (orphan) blocks.
    Cache,
}

/// A block producer registered for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerItem {
    pub group_id: GroupId,
    pub producer_pubkey: String,
    pub owner_pubkey: String,
    pub owner_sign: Vec<u8>,
    pub trx_id: String,
    pub memo: String,
    pub time_stamp: i64,
    pub blocks_produced: i64,
}

/// A syncer (read replica) registered for a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncerItem {
    pub group_id: GroupId,
    pub syncer_pubkey: String,
    pub memo: String,
    pub time_stamp: i64,
}

/// How transactions of one type are authorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrxAuthMode {
    /// Only senders on the allow list may send.
    FollowAllowList,
    /// Everyone except senders on the deny list may send.
    #[default]
    FollowDenyList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthListType {
    AllowList,
    DenyList,
}

/// One allow/deny rule: a sender and the transaction types it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthListEntry {
    pub group_id: GroupId,
    pub pubkey: String,
    /// Raw [`TrxType`] values.
    pub trx_types: Vec<i32>,
    pub memo: String,
    pub time_stamp: i64,
}

impl AuthListEntry {
    pub fn covers(&self, trx_type: TrxType) -> bool {
        self.trx_types.contains(&(trx_type as i32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppConfigValueType {
    Int,
    Bool,
    String,
}

/// Application-level key/value setting published by the group owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfigItem {
    pub group_id: GroupId,
    pub name: String,
    pub value_type: AppConfigValueType,
    pub value: String,
    pub memo: String,
    pub time_stamp: i64,
}

/// Local metadata for a joined group, kept in the `groups` store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupItem {
    pub group_id: GroupId,
    pub group_name: String,
    pub owner_pubkey: String,
    pub user_sign_pubkey: String,
    pub genesis_block_id: String,
    pub consensus_type: String,
    pub app_key: String,
    pub last_updated: i64,
}
