//! # Chain Storage Engine (rum-01)
//!
//! Persistence layer for every group a node participates in. Blocks are
//! stored as chunks that carry their DAG links (parent, children, height)
//! next to the payload.
//!
//! ## Namespaces
//!
//! ```text
//! blk_<block_id>        confirmed chunks (height >= 0, linked to a parent)
//! chd_blk_<block_id>    cached/orphan chunks (height -1, parent unknown)
//! <kind>_<group_id>_... per-group sub-ledgers, group id escaped (see `keys`)
//! grpitem_<group_id>    group items, kept in the separate `groups` store
//! ```
//!
//! ## Guarantees
//!
//! | Guarantee | Description |
//! |-----------|-------------|
//! | Idempotent add | Re-adding a stored block is a no-op |
//! | Height monotonicity | `height(child) == height(parent) + 1`, genesis is 0 |
//! | Disjoint namespaces | A block id is never both cached and confirmed |
//! | Parent precondition | Confirming a block requires a confirmed parent |
//! | Group-scoped prefixes | One prefix delete removes exactly one group's kind |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Records, errors, key schema
//! - `ports/` - `ChainStorageApi` (inbound) and `KeyValueStore` (outbound)
//! - `adapters/` - In-memory store and leased sequences
//! - `service/` - `ChainStorage`, the application service
//!
//! ## Usage
//!
//! ```ignore
//! use rum_01_chain_storage::{ChainStorage, ChainStorageApi, ChainStorageConfig};
//!
//! let storage = ChainStorage::new_in_memory(ChainStorageConfig::default());
//! storage.add_genesis_block(genesis)?;
//! storage.add_block(block, false)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{InMemoryKVStore, Sequence};
pub use domain::config::ChainStorageConfig;
pub use domain::entities::{
    AppConfigItem, AppConfigValueType, AuthListEntry, AuthListType, GroupAction, GroupItem,
    ProducerItem, SyncerItem, TrxAuthMode, TrxStorageType,
};
pub use domain::errors::{ChainStorageError, KVStoreError};
pub use ports::inbound::ChainStorageApi;
pub use ports::outbound::{BatchOperation, KeyValueStore};
pub use service::ChainStorage;
