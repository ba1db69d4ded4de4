//! # Rum Benchmarks
//!
//! Bodies of the criterion groups in `benches/rum_benchmarks.rs`.

pub mod rum_01_chain_storage;
pub mod rum_02_peer_store;
