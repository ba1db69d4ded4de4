//! Transport adapters.

pub mod memory;

pub use memory::{MemoryNetwork, MemoryStream, MemoryTransport, PeerFault, StreamStats};
