//! # Adapters Module
//!
//! - `memory`: ordered in-memory [`crate::KeyValueStore`]
//! - `sequence`: leased counters on top of any store

pub mod memory;
pub mod sequence;

pub use memory::InMemoryKVStore;
pub use sequence::Sequence;
