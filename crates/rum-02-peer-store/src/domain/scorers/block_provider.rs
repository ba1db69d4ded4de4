//! Block provider score and the ordering built on it.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::PeerId;

/// Scores are rounded to this many steps per unit before comparing.
pub const SCORE_ROUNDING_FACTOR: f64 = 10000.0;

pub fn round_score(score: f64) -> f64 {
    (score * SCORE_ROUNDING_FACTOR).round() / SCORE_ROUNDING_FACTOR
}

/// Blend of provider score and remaining rate-limit capacity.
///
/// A peer with less than one second of capacity left scores 0 so that
/// slower peers get a turn instead of waiting on the limiter.
pub fn combined_score(
    provider_score: f64,
    remaining: u64,
    capacity: u64,
    blocks_per_second: u64,
    capacity_weight: f64,
) -> f64 {
    if remaining < blocks_per_second || capacity == 0 {
        return 0.0;
    }
    let capacity_score = remaining as f64 / capacity as f64;
    round_score(provider_score * (1.0 - capacity_weight) + capacity_score * capacity_weight)
}

/// Order peers by descending score. Equal scores keep their input order.
pub fn weight_sort(peers: Vec<PeerId>, scores: &[f64]) -> Vec<PeerId> {
    let mut scored: Vec<(PeerId, f64)> = peers.into_iter().zip(scores.iter().copied()).collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(peer, _)| peer).collect()
}

/// Counts blocks each peer delivered.
#[derive(Debug, Default)]
pub struct BlockProviderScorer {
    processed: RwLock<HashMap<PeerId, u64>>,
}

impl BlockProviderScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&self, peer: &PeerId) {
        self.touch_n(peer, 1);
    }

    pub fn touch_n(&self, peer: &PeerId, blocks: u64) {
        let mut processed = self.processed.write();
        let count = processed.entry(peer.clone()).or_insert(0);
        *count = count.saturating_add(blocks);
    }

    pub fn processed(&self, peer: &PeerId) -> u64 {
        self.processed.read().get(peer).copied().unwrap_or(0)
    }

    /// `(processed + 1) / (best + 1)`, rounded. 1.0 for everyone before any
    /// delivery; an unseen peer scores `1 / (best + 1)`.
    pub fn score(&self, peer: &PeerId) -> f64 {
        let processed = self.processed.read();
        let best = processed.values().copied().max().unwrap_or(0);
        let own = processed.get(peer).copied().unwrap_or(0);
        smoothed(own, best)
    }

    /// Peers ordered by `weight(peer, provider_score)`, rounded, descending.
    pub fn weight_sorted<F>(&self, peers: Vec<PeerId>, weight: F) -> Vec<PeerId>
    where
        F: Fn(&PeerId, f64) -> f64,
    {
        let scores: Vec<f64> = {
            let processed = self.processed.read();
            let best = processed.values().copied().max().unwrap_or(0);
            peers
                .iter()
                .map(|p| {
                    let own = processed.get(p).copied().unwrap_or(0);
                    round_score(weight(p, smoothed(own, best)))
                })
                .collect()
        };
        weight_sort(peers, &scores)
    }
}

fn smoothed(own: u64, best: u64) -> f64 {
    round_score((own as f64 + 1.0) / (best as f64 + 1.0))
}
