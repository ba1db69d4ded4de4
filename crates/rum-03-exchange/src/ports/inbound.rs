//! Inbound ports (API) for the exchange service.

use std::sync::Arc;

use async_trait::async_trait;
use rum_02_peer_store::RumGroupPeerStore;
use shared_types::RumMsg;

use crate::domain::config::ExchangeConfig;
use crate::domain::errors::ExchangeError;
use crate::ports::outbound::{ChainHandler, RexStream};

/// What a message handler may see of the running service.
pub trait ExchangeContext: Send + Sync {
    fn config(&self) -> &ExchangeConfig;

    fn peer_store(&self) -> &RumGroupPeerStore;

    /// Chain registered for `group_id`.
    fn chain(&self, group_id: &str) -> Option<Arc<dyn ChainHandler>>;
}

/// Handler for one route of inbound messages.
///
/// The stream is still open while the handler runs, so a handler may answer
/// on it; the service closes it afterwards.
#[async_trait]
pub trait RumHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &dyn ExchangeContext,
        msg: RumMsg,
        stream: &mut Box<dyn RexStream>,
    ) -> Result<(), ExchangeError>;
}
