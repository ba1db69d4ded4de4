//! # Peer Scorers
//!
//! Process-lifetime reputation:
//!
//! - `BadResponsesScorer` - strikes for failed exchanges
//! - `BlockProviderScorer` - credit for delivered blocks
//!
//! The ordering helpers (`weight_sort`, `combined_score`) are pure.

mod bad_responses;
mod block_provider;

pub use bad_responses::BadResponsesScorer;
pub use block_provider::{
    combined_score, round_score, weight_sort, BlockProviderScorer, SCORE_ROUNDING_FACTOR,
};

use crate::domain::config::ScorerConfig;

/// Both scorers, shared by the peer store facade.
#[derive(Debug)]
pub struct ScorerService {
    bad_responses: BadResponsesScorer,
    block_provider: BlockProviderScorer,
}

impl ScorerService {
    pub fn new(config: &ScorerConfig) -> Self {
        Self {
            bad_responses: BadResponsesScorer::new(config.bad_responses_threshold),
            block_provider: BlockProviderScorer::new(),
        }
    }

    pub fn bad_responses(&self) -> &BadResponsesScorer {
        &self.bad_responses
    }

    pub fn block_provider(&self) -> &BlockProviderScorer {
        &self.block_provider
    }
}

#[cfg(test)]
mod tests;
