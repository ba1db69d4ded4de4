//! Peer id builders for tests.

use shared_types::PeerId;

/// `n` distinct peer ids, sorted by id.
pub fn make_peers(n: usize) -> Vec<PeerId> {
    (0..n).map(|i| PeerId::new(format!("16Uiu2HAmPeer{:03}", i))).collect()
}
