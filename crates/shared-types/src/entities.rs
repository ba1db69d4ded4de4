//! # Core Identifiers
//!
//! Identity types shared across the storage, peer store and exchange crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Group (chain) identifier. Groups are the unit of chain isolation.
pub type GroupId = String;

/// Opaque block identifier.
pub type BlockId = String;

/// Opaque transaction identifier.
pub type TrxId = String;

/// Reserved group id under which ignored peers are parked.
pub const IGNORE_GROUP_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Identity of a remote node on the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
