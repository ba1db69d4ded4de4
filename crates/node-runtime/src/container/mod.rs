//! Node configuration and the component container.

pub mod config;
pub mod node;

pub use config::{ConfigError, NodeConfig, StorageBackend};
pub use node::RumNode;
