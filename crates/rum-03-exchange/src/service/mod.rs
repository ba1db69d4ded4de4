//! # RumExchange Service
//!
//! Owns the chain registry and the handler routes, and drives both
//! directions of the stream protocol:
//!
//! - **Outbound**: [`RexService::publish`] ranks candidate peers through the
//!   peer store filter and sends to the first one that accepts the frame.
//!   Every failed attempt is a strike against that peer.
//! - **Inbound**: [`RexService::serve`] accepts streams and spawns one task
//!   per stream. Each stream carries one message, dispatched by kind.


use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rum_02_peer_store::RumGroupPeerStore;
use shared_types::{PeerId, RumMsg};
use tokio_util::sync::CancellationToken;

use crate::domain::config::ExchangeConfig;
use crate::domain::errors::ExchangeError;
use crate::domain::framing::{read_msg, write_msg, ReadOutcome};
use crate::domain::messages::{HandlerName, MessageKind};
use crate::handlers::{RexChainData, RexRelay};
use crate::ports::inbound::{ExchangeContext, RumHandler};
use crate::ports::outbound::{close_stream, ChainHandler, RexStream, StreamTransport};

/// Assembles a [`RexService`]. The handler table is fixed at `build()`.
pub struct RexServiceBuilder {
    transport: Arc<dyn StreamTransport>,
    peer_store: Arc<RumGroupPeerStore>,
    config: ExchangeConfig,
    handlers: HashMap<HandlerName, Arc<dyn RumHandler>>,
}

impl RexServiceBuilder {
    /// Install `handler` for `name`, replacing any previous one.
    #[must_use]
    pub fn set_handler_match_msg_type(mut self, name: HandlerName, handler: Arc<dyn RumHandler>) -> Self {
        self.handlers.insert(name, handler);
        self
    }

    #[must_use]
    pub fn without_handler(mut self, name: HandlerName) -> Self {
        self.handlers.remove(&name);
        self
    }

    pub fn build(self) -> RexService {
        let protocol_id = self.config.protocol_id();
        tracing::info!(
            "[rum-03] exchange ready on {} for {} ({} handlers)",
            protocol_id,
            self.transport.local_peer(),
            self.handlers.len()
        );
        RexService {
            transport: self.transport,
            peer_store: self.peer_store,
            config: self.config,
            protocol_id,
            chains: DashMap::new(),
            handlers: self.handlers,
        }
    }
}

pub struct RexService {
    transport: Arc<dyn StreamTransport>,
    peer_store: Arc<RumGroupPeerStore>,
    config: ExchangeConfig,
    protocol_id: String,
    chains: DashMap<String, Arc<dyn ChainHandler>>,
    handlers: HashMap<HandlerName, Arc<dyn RumHandler>>,
}

impl RexService {
    /// Builder with the relay and chain data handlers installed.
    pub fn builder(
        transport: Arc<dyn StreamTransport>,
        peer_store: Arc<RumGroupPeerStore>,
        config: ExchangeConfig,
    ) -> RexServiceBuilder {
        let mut handlers: HashMap<HandlerName, Arc<dyn RumHandler>> = HashMap::new();
        handlers.insert(HandlerName::RumRelay, Arc::new(RexRelay));
        handlers.insert(HandlerName::RumChainData, Arc::new(RexChainData));
        RexServiceBuilder {
            transport,
            peer_store,
            config,
            handlers,
        }
    }

    pub fn protocol_id(&self) -> &str {
        &self.protocol_id
    }

    pub fn local_peer(&self) -> &PeerId {
        self.transport.local_peer()
    }

    pub fn transport(&self) -> &Arc<dyn StreamTransport> {
        &self.transport
    }

    // =========================================================================
    // CHAIN REGISTRY
    // =========================================================================

    /// Register the chain for `group_id`. The first registration wins.
    pub fn chain_reg(&self, group_id: &str, chain: Arc<dyn ChainHandler>) {
        match self.chains.entry(group_id.to_string()) {
            Entry::Occupied(_) => {
                tracing::debug!("[rum-03] chain for group {} already registered", group_id);
            }
            Entry::Vacant(slot) => {
                slot.insert(chain);
                tracing::info!("[rum-03] registered chain for group {}", group_id);
            }
        }
    }

    /// Returns whether a chain was registered.
    pub fn chain_unreg(&self, group_id: &str) -> bool {
        let removed = self.chains.remove(group_id).is_some();
        if removed {
            tracing::info!("[rum-03] unregistered chain for group {}", group_id);
        }
        removed
    }

    pub fn registered_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.chains.iter().map(|e| e.key().clone()).collect();
        groups.sort();
        groups
    }

    // =========================================================================
    // OUTBOUND
    // =========================================================================

    /// Send `msg` to the best reachable peer for `group_id`.
    ///
    /// Candidates are `channel_peers`, or the connected peers when empty,
    /// ranked and trimmed by the peer store filter. Returns the peer that
    /// took the message.
    pub async fn publish(
        &self,
        group_id: &str,
        channel_peers: &[PeerId],
        msg: &RumMsg,
        cancel: &CancellationToken,
    ) -> Result<PeerId, ExchangeError> {
        let pool = if channel_peers.is_empty() {
            self.transport.connected_peers()
        } else {
            channel_peers.to_vec()
        };
        let candidates = self.peer_store.filter_peers(pool, self.config.keep_fraction);
        tracing::debug!(
            "[rum-03] publishing to group {} over {} candidates",
            group_id,
            candidates.len()
        );

        for peer in candidates {
            if cancel.is_cancelled() {
                return Err(ExchangeError::Cancelled);
            }
            match self.send_to(&peer, msg, cancel).await {
                Ok(()) => {
                    self.peer_store.scorers().block_provider().touch(&peer);
                    self.peer_store.rate_limiter().add(peer.as_str(), 1);
                    return Ok(peer);
                }
                Err(ExchangeError::Cancelled) => return Err(ExchangeError::Cancelled),
                Err(e) => {
                    let strikes = self.peer_store.scorers().bad_responses().increment(&peer);
                    tracing::debug!("[rum-03] publish to {} failed ({} strikes): {}", peer, strikes, e);
                }
            }
        }
        Err(ExchangeError::NoPeersAvailable {
            group_id: group_id.to_string(),
        })
    }

    /// Send `msg` straight to `peer`. A peer that cannot take it is ignored
    /// from then on.
    pub async fn publish_to_peer(&self, peer: &PeerId, msg: &RumMsg) -> Result<(), ExchangeError> {
        let result = self.send_to(peer, msg, &CancellationToken::new()).await;
        if let Err(e) = &result {
            tracing::warn!("[rum-03] direct send to {} failed, ignoring peer: {}", peer, e);
            self.peer_store.add_ignore_peer(peer.clone());
        }
        result
    }

    /// Send `msg` to one random connected peer that is not ignored.
    pub async fn publish_to_one_random(&self, msg: &RumMsg) -> Result<PeerId, ExchangeError> {
        let connected = self.transport.connected_peers();
        let peer = self
            .peer_store
            .get_one_random_peer(&connected)
            .map_err(|_| ExchangeError::NoPeersAvailable {
                group_id: String::new(),
            })?;
        self.publish_to_peer(&peer, msg).await?;
        Ok(peer)
    }

    /// Answer on a stream that is already open.
    pub async fn publish_to_stream(
        &self,
        stream: &mut Box<dyn RexStream>,
        msg: &RumMsg,
    ) -> Result<(), ExchangeError> {
        write_msg(stream, msg, self.config.max_message_size).await
    }

    async fn send_to(
        &self,
        peer: &PeerId,
        msg: &RumMsg,
        cancel: &CancellationToken,
    ) -> Result<(), ExchangeError> {
        let open = tokio::time::timeout(
            self.config.open_timeout,
            self.transport.new_stream(peer, &self.protocol_id),
        );
        let mut stream = tokio::select! {
            _ = cancel.cancelled() => return Err(ExchangeError::Cancelled),
            opened = open => match opened {
                Ok(stream) => stream?,
                Err(_) => return Err(ExchangeError::Timeout { peer: peer.clone() }),
            },
        };

        let written = tokio::select! {
            _ = cancel.cancelled() => None,
            res = write_msg(&mut stream, msg, self.config.max_message_size) => Some(res),
        };
        match written {
            None => {
                stream.reset();
                Err(ExchangeError::Cancelled)
            }
            Some(result) => {
                close_stream(stream).await;
                result
            }
        }
    }

    // =========================================================================
    // INBOUND
    // =========================================================================

    /// Read one message from `stream`, dispatch it and close the stream.
    pub async fn handle_stream(&self, mut stream: Box<dyn RexStream>) {
        let from = stream.remote_peer().clone();
        match read_msg(&mut stream, self.config.max_message_size).await {
            Ok(ReadOutcome::Eof) => {
                tracing::debug!("[rum-03] stream from {} closed before a message", from);
                close_stream(stream).await;
            }
            Err(ExchangeError::Io(e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                tracing::debug!("[rum-03] read from {} timed out, closing stream", from);
                close_stream(stream).await;
            }
            Err(e) => {
                tracing::warn!("[rum-03] bad frame from {}, resetting stream: {}", from, e);
                stream.reset();
            }
            Ok(ReadOutcome::Message(msg)) => {
                self.dispatch(msg, &mut stream).await;
                close_stream(stream).await;
            }
        }
    }

    async fn dispatch(&self, msg: RumMsg, stream: &mut Box<dyn RexStream>) {
        let from = stream.remote_peer().clone();
        let Some(kind) = msg.kind().map(MessageKind::from) else {
            tracing::warn!("[rum-03] unknown message type {} from {}", msg.msg_type, from);
            return;
        };
        let name = kind.handler_name();
        let Some(handler) = self.handlers.get(&name) else {
            tracing::warn!("[rum-03] no handler for {:?} ({}) from {}", kind, name, from);
            return;
        };
        if let Err(e) = handler.handle(self, msg, stream).await {
            tracing::warn!("[rum-03] {} handler failed for message from {}: {}", name, from, e);
        }
    }

    /// Accept inbound streams until `cancel` fires or the transport closes.
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) {
        tracing::info!("[rum-03] serving {}", self.protocol_id);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = self.transport.accept(&self.protocol_id) => match accepted {
                    Some(stream) => {
                        let service = self.clone();
                        tokio::spawn(async move { service.handle_stream(stream).await });
                    }
                    None => {
                        tracing::info!("[rum-03] transport closed");
                        break;
                    }
                },
            }
        }
        tracing::info!("[rum-03] stopped serving {}", self.protocol_id);
    }
}

impl ExchangeContext for RexService {
    fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    fn peer_store(&self) -> &RumGroupPeerStore {
        &self.peer_store
    }

    fn chain(&self, group_id: &str) -> Option<Arc<dyn ChainHandler>> {
        self.chains.get(group_id).map(|entry| entry.value().clone())
    }
}
