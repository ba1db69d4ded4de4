//! Default handler for `ChainData` messages.

use async_trait::async_trait;
use shared_types::{PackagePayload, RumMsg};

use crate::domain::errors::ExchangeError;
use crate::ports::inbound::{ExchangeContext, RumHandler};
use crate::ports::outbound::RexStream;

/// Decodes the carried package and hands it to the group's chain.
///
/// A sender of data for a registered group is (re)saved as a member of that
/// group before the chain sees the payload. Data for unregistered groups is
/// dropped.
#[derive(Debug, Default)]
pub struct RexChainData;

#[async_trait]
impl RumHandler for RexChainData {
    async fn handle(
        &self,
        ctx: &dyn ExchangeContext,
        msg: RumMsg,
        stream: &mut Box<dyn RexStream>,
    ) -> Result<(), ExchangeError> {
        let from = stream.remote_peer().clone();
        let Some(package) = msg.data_package else {
            tracing::warn!("[rum-03] chain data from {} without a package", from);
            return Ok(());
        };
        let payload = package.decode_payload()?;
        let group_id = payload.group_id().to_string();

        let Some(chain) = ctx.chain(&group_id) else {
            tracing::warn!("[rum-03] dropping chain data from {} for unknown group {}", from, group_id);
            return Ok(());
        };

        ctx.peer_store()
            .save(&group_id, from.clone(), ctx.config().peerstore_ttl);

        match payload {
            PackagePayload::Trx(trx) => {
                tracing::debug!("[rum-03] trx {} from {} (group {})", trx.trx_id, from, group_id);
                chain.handle_trx_with_rex(trx, from).await
            }
            PackagePayload::Block(block) => {
                tracing::debug!("[rum-03] block {} from {} (group {})", block.block_id, from, group_id);
                chain.handle_block_with_rex(block, from).await
            }
        }
    }
}
