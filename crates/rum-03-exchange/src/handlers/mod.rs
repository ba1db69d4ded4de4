//! Built-in message handlers.

mod chain_data;
mod relay;

pub use chain_data::RexChainData;
pub use relay::RexRelay;
