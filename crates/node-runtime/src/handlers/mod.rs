//! Chain handlers registered with the exchange.

pub mod chain_sync;

pub use chain_sync::{BlockOutcome, ChainSyncHandler};
