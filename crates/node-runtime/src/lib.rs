//! # Node Runtime Library
//!
//! Builds a Rum node out of explicit component instances. The binary in
//! `main.rs` is a thin wrapper; tests drive [`RumNode`] directly.
//!
//! ## Modules
//!
//! - `container/` - `NodeConfig` (TOML + env) and the `RumNode` container
//! - `adapters/` - store backends (in-memory, RocksDB behind `rocksdb`)
//! - `handlers/` - `ChainSyncHandler`, the per-group chain fed by the exchange

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod errors;
pub mod handlers;

pub use container::{ConfigError, NodeConfig, RumNode, StorageBackend};
pub use errors::NodeError;
pub use handlers::{BlockOutcome, ChainSyncHandler};
