use thiserror::Error;

/// Peer store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeerStoreError {
    /// Every connected peer is ignored, or none is connected.
    #[error("no available peer")]
    NoAvailablePeer,
}
