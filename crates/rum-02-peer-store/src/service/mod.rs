//! # Group Peer Store Service
//!
//! `RumGroupPeerStore` bundles membership, reputation and rate limiting
//! and owns the peer filter used to choose publish targets.


use std::sync::Arc;
use std::time::Duration;

use shared_types::PeerId;

use crate::adapters::SystemClock;
use crate::domain::config::{RateLimitConfig, RumPeerStoreConfig};
use crate::domain::errors::PeerStoreError;
use crate::domain::peer_store::PeerStore;
use crate::domain::rate_limit::LeakyBucketCollector;
use crate::domain::scorers::{combined_score, ScorerService};
use crate::ports::outbound::Clock;

pub struct RumGroupPeerStore {
    peers: PeerStore,
    scorers: ScorerService,
    rate_limiter: LeakyBucketCollector,
    limits: RateLimitConfig,
}

impl RumGroupPeerStore {
    pub fn new(config: RumPeerStoreConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RumPeerStoreConfig, clock: Arc<dyn Clock>) -> Self {
        let mut peers = PeerStore::new(config.peer_store.clone()).with_clock(clock.clone());
        if let Some(seed) = config.rng_seed {
            peers = peers.with_rng_seed(seed);
        }
        tracing::info!(
            "[rum-02] peer store ready (bucket capacity {}, {} blocks/s)",
            config.rate_limit.capacity(),
            config.rate_limit.blocks_per_second
        );
        Self {
            peers,
            scorers: ScorerService::new(&config.scorers),
            rate_limiter: LeakyBucketCollector::from_config(&config.rate_limit).with_clock(clock),
            limits: config.rate_limit,
        }
    }

    pub fn peers(&self) -> &PeerStore {
        &self.peers
    }

    pub fn scorers(&self) -> &ScorerService {
        &self.scorers
    }

    pub fn rate_limiter(&self) -> &LeakyBucketCollector {
        &self.rate_limiter
    }

    pub fn save(&self, group_id: &str, peer: PeerId, ttl: Duration) {
        self.peers.save(group_id, peer, ttl);
    }

    pub fn get(&self, group_id: &str) -> Vec<PeerId> {
        self.peers.get(group_id)
    }

    pub fn get_random_peer(&self, group_id: &str, count: usize, excluding: &[PeerId]) -> Vec<PeerId> {
        self.peers.get_random_peer(group_id, count, excluding)
    }

    pub fn get_one_random_peer(&self, connected: &[PeerId]) -> Result<PeerId, PeerStoreError> {
        self.peers.get_one_random_peer(connected)
    }

    pub fn add_ignore_peer(&self, peer: PeerId) {
        self.peers.add_ignore_peer(peer);
    }

    /// Best `keep_fraction` of `peers` to send to, never fewer than the
    /// required minimum while enough good peers exist.
    ///
    /// Bad peers are dropped first; the rest are ordered by
    /// [`combined_score`] of provider score and remaining bucket capacity.
    pub fn filter_peers(&self, peers: Vec<PeerId>, keep_fraction: f64) -> Vec<PeerId> {
        if peers.is_empty() {
            return peers;
        }
        let bad = self.scorers.bad_responses();
        let good: Vec<PeerId> = peers.into_iter().filter(|p| !bad.is_bad_peer(p)).collect();

        let capacity = self.rate_limiter.capacity();
        let sorted = self
            .scorers
            .block_provider()
            .weight_sorted(good, |peer, provider_score| {
                combined_score(
                    provider_score,
                    self.rate_limiter.remaining(peer.as_str()),
                    capacity,
                    self.limits.blocks_per_second,
                    self.limits.capacity_weight,
                )
            });
        trim_peers(sorted, keep_fraction, self.limits.required_peers)
    }
}

/// Keep `round(len * keep_fraction)` peers, at least `required`, at most `len`.
pub fn trim_peers(mut peers: Vec<PeerId>, keep_fraction: f64, required: usize) -> Vec<PeerId> {
    let wanted = (peers.len() as f64 * keep_fraction).round().max(0.0) as usize;
    let limit = wanted.max(required).min(peers.len());
    peers.truncate(limit);
    peers
}
