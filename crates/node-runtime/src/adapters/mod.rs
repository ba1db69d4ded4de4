//! Node adapters.

pub mod storage;

pub use storage::{open_stores, Stores};
