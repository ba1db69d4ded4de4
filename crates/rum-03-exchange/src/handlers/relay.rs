//! Default handler for relay requests and responses.

use async_trait::async_trait;
use shared_types::{RumMsg, RumMsgType};

use crate::domain::errors::ExchangeError;
use crate::domain::framing::write_msg;
use crate::ports::inbound::{ExchangeContext, RumHandler};
use crate::ports::outbound::RexStream;

/// Logs relay traffic and answers each request with a response carrying
/// the same item on the same stream.
#[derive(Debug, Default)]
pub struct RexRelay;

#[async_trait]
impl RumHandler for RexRelay {
    async fn handle(
        &self,
        ctx: &dyn ExchangeContext,
        msg: RumMsg,
        stream: &mut Box<dyn RexStream>,
    ) -> Result<(), ExchangeError> {
        let from = stream.remote_peer().clone();
        match msg.kind() {
            Some(RumMsgType::RelayReq) => {
                let Some(item) = msg.relay_req else {
                    tracing::warn!("[rum-03] empty relay request from {}", from);
                    return Ok(());
                };
                tracing::info!(
                    "[rum-03] relay request from {} (group {}, type {:?}, duration {})",
                    from,
                    item.group_id,
                    item.relay_type,
                    item.duration
                );
                write_msg(stream, &RumMsg::relay_resp(item), ctx.config().max_message_size).await
            }
            Some(RumMsgType::RelayResp) => {
                if let Some(item) = msg.relay_resp {
                    tracing::info!(
                        "[rum-03] relay response from {} (group {}, memo {:?})",
                        from,
                        item.group_id,
                        item.memo
                    );
                }
                Ok(())
            }
            other => {
                tracing::warn!("[rum-03] relay handler got {:?} from {}", other, from);
                Ok(())
            }
        }
    }
}
