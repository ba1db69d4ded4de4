//! # Node Configuration
//!
//! Defaults, an optional TOML file and `RUM_*` environment overrides, in
//! that order of precedence (environment wins).
//!
//! ```toml
//! [node]
//! data_dir = "./data"
//! peer_id = "16Uiu2HAm..."
//! storage_backend = "rocksdb"
//!
//! [network]
//! name = "nevis"
//! protocol_prefix = "/quorum"
//! open_timeout_ms = 2000
//! keep_fraction = 0.7
//!
//! [peer_store]
//! default_ttl_secs = 1200
//! bad_responses_threshold = 5
//! blocks_per_second = 64
//! burst_factor = 10
//!
//! [storage]
//! sequence_bandwidth = 100
//!
//! [telemetry]
//! log_level = "info"
//! json_logs = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rum_01_chain_storage::ChainStorageConfig;
use rum_02_peer_store::RumPeerStoreConfig;
use rum_03_exchange::ExchangeConfig;
use rum_telemetry::TelemetryConfig;
use serde::Deserialize;

/// Where the chain and group stores live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    RocksDb,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(ConfigError::Invalid(format!("unknown storage backend: {}", other))),
        }
    }
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    /// Identity of this node on the transport.
    pub peer_id: String,
    pub storage_backend: StorageBackend,
    pub storage: ChainStorageConfig,
    pub peer_store: RumPeerStoreConfig,
    pub exchange: ExchangeConfig,
    pub telemetry: TelemetryConfig,
    /// Period of expired-peer purging and idle bucket cleanup.
    pub maintenance_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            peer_id: format!("rum-{}", uuid::Uuid::new_v4()),
            storage_backend: StorageBackend::Memory,
            storage: ChainStorageConfig::default(),
            peer_store: RumPeerStoreConfig::default(),
            exchange: ExchangeConfig::default(),
            telemetry: TelemetryConfig::default(),
            maintenance_interval: Duration::from_secs(60),
        }
    }
}

impl NodeConfig {
    /// In-memory node with deterministic peer sampling.
    pub fn for_testing(peer_id: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            storage: ChainStorageConfig::for_testing(),
            peer_store: RumPeerStoreConfig::for_testing(),
            exchange: ExchangeConfig::for_testing(),
            maintenance_interval: Duration::from_secs(5),
            ..Self::default()
        }
    }

    /// Load from `path` if given, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        let node = file.node;
        if let Some(dir) = node.data_dir {
            config.data_dir = dir;
        }
        if let Some(peer_id) = node.peer_id {
            config.peer_id = peer_id;
        }
        if let Some(backend) = node.storage_backend {
            config.storage_backend = backend;
        }
        if let Some(secs) = node.maintenance_interval_secs {
            config.maintenance_interval = Duration::from_secs(secs);
        }

        let net = file.network;
        if let Some(name) = net.name {
            config.exchange.network_name = name;
        }
        if let Some(prefix) = net.protocol_prefix {
            config.exchange.protocol_prefix = prefix;
        }
        if let Some(ms) = net.open_timeout_ms {
            config.exchange.open_timeout = Duration::from_millis(ms);
        }
        if let Some(fraction) = net.keep_fraction {
            config.exchange.keep_fraction = fraction;
        }
        if let Some(secs) = net.peerstore_ttl_secs {
            config.exchange.peerstore_ttl = Duration::from_secs(secs);
        }

        let ps = file.peer_store;
        if let Some(secs) = ps.default_ttl_secs {
            config.peer_store.peer_store.default_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = ps.ignore_ttl_secs {
            config.peer_store.peer_store.ignore_ttl = Duration::from_secs(secs);
        }
        if let Some(threshold) = ps.bad_responses_threshold {
            config.peer_store.scorers.bad_responses_threshold = threshold;
        }
        if let Some(bps) = ps.blocks_per_second {
            config.peer_store.rate_limit.blocks_per_second = bps;
        }
        if let Some(burst) = ps.burst_factor {
            config.peer_store.rate_limit.burst_factor = burst;
        }
        if let Some(weight) = ps.capacity_weight {
            config.peer_store.rate_limit.capacity_weight = weight;
        }
        if let Some(seed) = ps.rng_seed {
            config.peer_store.rng_seed = Some(seed);
        }

        if let Some(bandwidth) = file.storage.sequence_bandwidth {
            config.storage.sequence_bandwidth = bandwidth;
        }
        if let Some(telemetry) = file.telemetry {
            config.telemetry = telemetry;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `RUM_DATA_DIR`, `RUM_PEER_ID`, `RUM_STORAGE_BACKEND`,
    /// `RUM_NETWORK` and the telemetry variables.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(dir) = std::env::var("RUM_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Ok(peer_id) = std::env::var("RUM_PEER_ID") {
            self.peer_id = peer_id;
        }
        if let Ok(backend) = std::env::var("RUM_STORAGE_BACKEND") {
            self.storage_backend = backend.parse()?;
        }
        if let Ok(network) = std::env::var("RUM_NETWORK") {
            self.exchange.network_name = network;
        }
        self.telemetry = self.telemetry.with_env_overrides();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peer_id.is_empty() {
            return Err(ConfigError::Invalid("peer_id must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.exchange.keep_fraction) {
            return Err(ConfigError::Invalid(format!(
                "keep_fraction must be within [0, 1], got {}",
                self.exchange.keep_fraction
            )));
        }
        if self.storage.sequence_bandwidth == 0 {
            return Err(ConfigError::Invalid("sequence_bandwidth must be positive".into()));
        }
        if self.peer_store.rate_limit.blocks_per_second == 0 {
            return Err(ConfigError::Invalid("blocks_per_second must be positive".into()));
        }
        Ok(())
    }

    pub fn chain_db_path(&self) -> PathBuf {
        self.data_dir.join("chain")
    }

    pub fn groups_db_path(&self) -> PathBuf {
        self.data_dir.join("groups")
    }
}

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    node: NodeSection,
    #[serde(default)]
    network: NetworkSection,
    #[serde(default)]
    peer_store: PeerStoreSection,
    #[serde(default)]
    storage: StorageSection,
    telemetry: Option<TelemetryConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct NodeSection {
    data_dir: Option<PathBuf>,
    peer_id: Option<String>,
    storage_backend: Option<StorageBackend>,
    maintenance_interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct NetworkSection {
    name: Option<String>,
    protocol_prefix: Option<String>,
    open_timeout_ms: Option<u64>,
    keep_fraction: Option<f64>,
    peerstore_ttl_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct PeerStoreSection {
    default_ttl_secs: Option<u64>,
    ignore_ttl_secs: Option<u64>,
    bad_responses_threshold: Option<u32>,
    blocks_per_second: Option<u64>,
    burst_factor: Option<u64>,
    capacity_weight: Option<f64>,
    rng_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct StorageSection {
    sequence_bandwidth: Option<u64>,
}

/// Errors that can occur during config loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// File I/O error.
    Io { path: String, error: String },
    /// TOML parsing error.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, error } => write!(f, "Failed to read {}: {}", path, error),
            Self::Parse(e) => write!(f, "Failed to parse config: {}", e),
            Self::Invalid(e) => write!(f, "Invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
