//! # Domain Layer
//!
//! - `peer_store` - TTL membership per group, sampling, ignore list
//! - `scorers` - Bad-response and block-provider scoring
//! - `rate_limit` - Per-peer leaky buckets
//! - `config` / `errors`

pub mod config;
pub mod errors;
pub mod peer_store;
pub mod rate_limit;
pub mod scorers;
