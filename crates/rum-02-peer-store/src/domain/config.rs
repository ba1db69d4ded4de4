//! Peer store, scoring and rate limit configuration.

use std::time::Duration;

/// Peer membership TTLs.
#[derive(Debug, Clone)]
pub struct PeerStoreConfig {
    /// TTL used when a peer is seen serving a group.
    pub default_ttl: Duration,
    /// How long an ignored peer stays ignored.
    pub ignore_ttl: Duration,
}

impl Default for PeerStoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(20 * 60),
            ignore_ttl: Duration::from_secs(5 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// A peer with more strikes than this is bad.
    pub bad_responses_threshold: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            bad_responses_threshold: 5,
        }
    }
}

/// Leaky bucket and peer filter parameters.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Refill rate of every bucket, in blocks per second.
    pub blocks_per_second: u64,
    /// Burst allowance as a multiple of `blocks_per_second`.
    pub burst_factor: u64,
    /// Weight of the capacity score against the provider score.
    pub capacity_weight: f64,
    /// Floor on the number of peers kept by the filter.
    pub required_peers: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            blocks_per_second: 64,
            burst_factor: 10,
            capacity_weight: 0.2,
            required_peers: 3,
        }
    }
}

impl RateLimitConfig {
    /// Bucket capacity: one second of refill below the full burst.
    pub fn capacity(&self) -> u64 {
        (self.burst_factor * self.blocks_per_second).saturating_sub(self.blocks_per_second)
    }
}

/// Everything `RumGroupPeerStore` needs.
#[derive(Debug, Clone, Default)]
pub struct RumPeerStoreConfig {
    pub peer_store: PeerStoreConfig,
    pub scorers: ScorerConfig,
    pub rate_limit: RateLimitConfig,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl RumPeerStoreConfig {
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Deterministic sampling, default limits.
    pub fn for_testing() -> Self {
        Self::default().with_rng_seed(7)
    }
}
