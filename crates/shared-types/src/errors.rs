//! # Error Types
//!
//! Errors raised while decoding shared wire records.

use thiserror::Error;

/// Errors decoding a wire record or its nested payload.
#[derive(Debug, Clone, Error)]
pub enum WireError {
    /// Field-tagged decoding failed.
    #[error("Decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Package carries a payload type this node does not know.
    #[error("Unknown package type: {0}")]
    UnknownPackageType(i32),
}
