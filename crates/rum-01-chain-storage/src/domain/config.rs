//! Chain storage configuration.

/// Configuration for [`crate::ChainStorage`].
#[derive(Debug, Clone)]
pub struct ChainStorageConfig {
    /// Number of sequence values leased from the store per lease update.
    pub sequence_bandwidth: u64,
}

impl Default for ChainStorageConfig {
    fn default() -> Self {
        Self {
            sequence_bandwidth: 100,
        }
    }
}

impl ChainStorageConfig {
    #[must_use]
    pub fn with_sequence_bandwidth(mut self, bandwidth: u64) -> Self {
        self.sequence_bandwidth = bandwidth;
        self
    }

    /// Small leases so tests exercise re-leasing.
    pub fn for_testing() -> Self {
        Self {
            sequence_bandwidth: 4,
        }
    }
}
