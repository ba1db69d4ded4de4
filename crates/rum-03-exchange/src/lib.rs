//! # RumExchange (rum-03)
//!
//! Direct stream protocol between members of a group.
//!
//! ## Architecture Role
//!
//! ```text
//! [local producer] ──publish──→ [RexService] ──filter_peers──→ [rum-02]
//!                                    │
//!                                    ↓ one frame per stream
//!                              [remote RexService]
//!                                    │ dispatch by message kind
//!                    ┌───────────────┼────────────────┐
//!                    ↓               ↓                ↓
//!               rumrelay        rumsession       rumchaindata ──→ ChainHandler (per group)
//! ```
//!
//! ## Wire Format
//!
//! `varint(len) || RumMsg` (protobuf). Frames above 16 MiB are refused on
//! both sides.
//!
//! ## Peer Accounting
//!
//! - A successful publish touches the block provider score and consumes one
//!   unit of the peer's leaky bucket.
//! - A failed publish attempt adds one bad-response strike.
//! - A failed direct send puts the peer on the ignore list.
//! - Chain data received for a registered group refreshes the sender's
//!   membership in that group.

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{MemoryNetwork, MemoryStream, MemoryTransport, PeerFault, StreamStats};
pub use domain::{
    read_msg, write_msg, ExchangeConfig, ExchangeError, HandlerName, MessageKind, ReadOutcome,
    MAX_MESSAGE_SIZE, REX_PROTOCOL_VERSION,
};
pub use handlers::{RexChainData, RexRelay};
pub use ports::inbound::{ExchangeContext, RumHandler};
pub use ports::outbound::{close_stream, ChainHandler, RexStream, StreamTransport};
pub use service::{RexService, RexServiceBuilder};
