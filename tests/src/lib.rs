//! # Rum Test Suite
//!
//! Cross-crate tests and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion bodies, driven by benches/rum_benchmarks.rs
//! │   ├── rum_01_chain_storage.rs
//! │   └── rum_02_peer_store.rs
//! │
//! └── integration/      # Flows across storage, peer store and exchange
//!     ├── storage_properties.rs
//!     ├── peer_properties.rs
//!     └── sync_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rum-tests
//! cargo test -p rum-tests integration::sync_flows::
//! cargo bench -p rum-tests
//! ```

pub mod benchmarks;
pub mod integration;
