//! Bad response strikes.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared_types::PeerId;

/// Counts failed exchanges per peer. Counts only go up until `reset`.
#[derive(Debug)]
pub struct BadResponsesScorer {
    threshold: u32,
    strikes: RwLock<HashMap<PeerId, u32>>,
}

impl BadResponsesScorer {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            strikes: RwLock::new(HashMap::new()),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Add one strike; returns the new count.
    pub fn increment(&self, peer: &PeerId) -> u32 {
        let mut strikes = self.strikes.write();
        let count = strikes.entry(peer.clone()).or_insert(0);
        *count = count.saturating_add(1);
        if *count > self.threshold && *count - 1 == self.threshold {
            tracing::info!("[rum-02] peer {} marked bad after {} strikes", peer, count);
        }
        *count
    }

    pub fn count(&self, peer: &PeerId) -> u32 {
        self.strikes.read().get(peer).copied().unwrap_or(0)
    }

    pub fn is_bad_peer(&self, peer: &PeerId) -> bool {
        self.count(peer) > self.threshold
    }

    /// Clear a peer's strikes (explicit unban).
    pub fn reset(&self, peer: &PeerId) {
        self.strikes.write().remove(peer);
    }

    pub fn bad_peers(&self) -> Vec<PeerId> {
        let mut bad: Vec<PeerId> = self
            .strikes
            .read()
            .iter()
            .filter(|(_, count)| **count > self.threshold)
            .map(|(peer, _)| peer.clone())
            .collect();
        bad.sort();
        bad
    }
}
