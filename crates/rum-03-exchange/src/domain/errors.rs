//! Error types for the exchange service.

use shared_types::{PeerId, WireError};
use thiserror::Error;

/// Exchange errors.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("No peers available for group {group_id}")]
    NoPeersAvailable { group_id: String },

    #[error("Timed out opening stream to {peer}")]
    Timeout { peer: PeerId },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Frame too large: {len} bytes (max: {max})")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Malformed payload: {0}")]
    Wire(#[from] WireError),

    #[error("Group not registered: {0}")]
    UnknownGroup(String),

    #[error("No handler installed for {0}")]
    HandlerMissing(String),

    #[error("Chain handler failed: {0}")]
    Chain(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
