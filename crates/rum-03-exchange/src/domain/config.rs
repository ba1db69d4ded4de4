//! Exchange service configuration.

use std::time::Duration;

/// Protocol version suffix of the RumExchange stream protocol.
pub const REX_PROTOCOL_VERSION: &str = "1.0.0";

/// Upper bound on a single frame body.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub protocol_prefix: String,
    pub network_name: String,
    /// Bound on opening an outbound stream.
    pub open_timeout: Duration,
    /// Share of the filtered candidate list tried by `publish`.
    pub keep_fraction: f64,
    /// Membership TTL refreshed whenever a peer sends us chain data.
    pub peerstore_ttl: Duration,
    pub max_message_size: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            protocol_prefix: "/quorum".to_string(),
            network_name: "nevis".to_string(),
            open_timeout: Duration::from_secs(2),
            keep_fraction: 0.7,
            peerstore_ttl: Duration::from_secs(20 * 60),
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl ExchangeConfig {
    pub fn for_testing() -> Self {
        Self {
            network_name: "testnet".to_string(),
            open_timeout: Duration::from_millis(200),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_network(mut self, network_name: impl Into<String>) -> Self {
        self.network_name = network_name.into();
        self
    }

    #[must_use]
    pub fn with_protocol_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.protocol_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    /// `<prefix>/<network>/rex/<version>`
    pub fn protocol_id(&self) -> String {
        format!(
            "{}/{}/rex/{}",
            self.protocol_prefix, self.network_name, REX_PROTOCOL_VERSION
        )
    }
}
