//! # Group Peer Store (rum-02)
//!
//! Tracks which peers serve which group and decides whom to send to.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `PeerStore` | `(group, peer) -> deadline`, lazily expired, random sampling |
//! | `BadResponsesScorer` | Strike counter, peer is bad above the threshold |
//! | `BlockProviderScorer` | Delivered-block counter, Laplace-smoothed score in `[0, 1]` |
//! | `LeakyBucketCollector` | Per-peer remaining send capacity, refilled linearly |
//! | `RumGroupPeerStore` | Facade combining the above; `filter_peers` |
//!
//! ## Peer Filter
//!
//! ```text
//! peers ──► drop bad ──► sort by combined score (desc, stable) ──► keep max(3, round(n * pct)), at most n
//!
//! combined = 0                                      if remaining < blocks_per_second
//!          = provider * (1 - w) + remaining/capacity * w   otherwise, rounded to 1e-4
//! ```
//!
//! Reputation and rate-limit state live for the process only.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{ManualClock, SystemClock};
pub use domain::config::{PeerStoreConfig, RateLimitConfig, RumPeerStoreConfig, ScorerConfig};
pub use domain::errors::PeerStoreError;
pub use domain::peer_store::PeerStore;
pub use domain::rate_limit::LeakyBucketCollector;
pub use domain::scorers::{
    combined_score, round_score, weight_sort, BadResponsesScorer, BlockProviderScorer,
    ScorerService, SCORE_ROUNDING_FACTOR,
};
pub use ports::outbound::Clock;
pub use service::{trim_peers, RumGroupPeerStore};
