//! Outbound ports (SPI) for the exchange service.
//!
//! The transport and the per-group chains are supplied by the node runtime.

use async_trait::async_trait;
use shared_types::{Block, PeerId, Trx};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::domain::errors::ExchangeError;

/// One bidirectional stream to a remote peer.
pub trait RexStream: AsyncRead + AsyncWrite + Unpin + Send {
    fn remote_peer(&self) -> &PeerId;

    /// Abortive close: the remote sees an error rather than a clean EOF
    /// where the transport supports it.
    fn reset(self: Box<Self>);
}

/// Graceful close of a stream. Failures only get logged.
pub async fn close_stream(mut stream: Box<dyn RexStream>) {
    if let Err(e) = stream.shutdown().await {
        tracing::debug!("[rum-03] closing stream to {} failed: {}", stream.remote_peer(), e);
    }
}

/// Point-to-point stream transport.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    fn local_peer(&self) -> &PeerId;

    /// Open a stream to `peer` speaking `protocol`.
    async fn new_stream(
        &self,
        peer: &PeerId,
        protocol: &str,
    ) -> Result<Box<dyn RexStream>, ExchangeError>;

    /// Peers with a live connection.
    fn connected_peers(&self) -> Vec<PeerId>;

    /// Next inbound stream for `protocol`; `None` once the transport is closed.
    async fn accept(&self, protocol: &str) -> Option<Box<dyn RexStream>>;
}

/// Consumer of chain data received for one group.
#[async_trait]
pub trait ChainHandler: Send + Sync {
    async fn handle_trx_with_rex(&self, trx: Trx, from: PeerId) -> Result<(), ExchangeError>;

    async fn handle_block_with_rex(&self, block: Block, from: PeerId) -> Result<(), ExchangeError>;
}
