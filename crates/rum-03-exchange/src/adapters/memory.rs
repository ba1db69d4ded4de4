//! # In-Memory Transport
//!
//! Streams are `tokio::io::duplex` pairs. Every `(peer, protocol)` has one
//! inbound queue that is created on first use by either side, so dialing a
//! node before it starts accepting just queues the stream.
//!
//! Peers can be given a [`PeerFault`] to exercise the publish fallback.

use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::PeerId;
use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tokio::sync::{mpsc, Mutex};

use crate::domain::errors::ExchangeError;
use crate::ports::outbound::{RexStream, StreamTransport};

const DUPLEX_BUFFER: usize = 64 * 1024;

type StreamSender = mpsc::UnboundedSender<Box<dyn RexStream>>;
type StreamReceiver = Arc<Mutex<mpsc::UnboundedReceiver<Box<dyn RexStream>>>>;

/// Injected misbehaviour of a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerFault {
    /// Opening a stream fails immediately.
    Unreachable,
    /// Opening a stream never completes.
    Stalled,
    /// Streams open but the remote end is dropped at once, so writes fail.
    DropsStreams,
}

/// Stream lifecycle counters shared by every stream of a network.
#[derive(Debug, Default)]
pub struct StreamStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    reset: AtomicUsize,
}

impl StreamStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn reset(&self) -> usize {
        self.reset.load(Ordering::SeqCst)
    }
}

struct Inbound {
    tx: StreamSender,
    rx: StreamReceiver,
}

#[derive(Default)]
struct NetworkInner {
    nodes: DashMap<PeerId, ()>,
    inbound: DashMap<(PeerId, String), Inbound>,
    links: DashMap<PeerId, BTreeSet<PeerId>>,
    faults: DashMap<PeerId, PeerFault>,
    stats: Arc<StreamStats>,
}

impl NetworkInner {
    fn sender(&self, peer: &PeerId, protocol: &str) -> StreamSender {
        self.inbound
            .entry((peer.clone(), protocol.to_string()))
            .or_insert_with(Self::new_inbound)
            .tx
            .clone()
    }

    fn receiver(&self, peer: &PeerId, protocol: &str) -> StreamReceiver {
        self.inbound
            .entry((peer.clone(), protocol.to_string()))
            .or_insert_with(Self::new_inbound)
            .rx
            .clone()
    }

    fn new_inbound() -> Inbound {
        let (tx, rx) = mpsc::unbounded_channel();
        Inbound {
            tx,
            rx: Arc::new(Mutex::new(rx)),
        }
    }
}

/// A set of in-process nodes that can open streams to each other.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    inner: Arc<NetworkInner>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join `peer` to the network and return its transport.
    pub fn transport(&self, peer: PeerId) -> Arc<MemoryTransport> {
        self.inner.nodes.insert(peer.clone(), ());
        Arc::new(MemoryTransport {
            local: peer,
            network: self.inner.clone(),
        })
    }

    /// Mark `a` and `b` as connected to each other.
    pub fn connect(&self, a: &PeerId, b: &PeerId) {
        self.inner.links.entry(a.clone()).or_default().insert(b.clone());
        self.inner.links.entry(b.clone()).or_default().insert(a.clone());
    }

    pub fn disconnect(&self, a: &PeerId, b: &PeerId) {
        if let Some(mut set) = self.inner.links.get_mut(a) {
            set.remove(b);
        }
        if let Some(mut set) = self.inner.links.get_mut(b) {
            set.remove(a);
        }
    }

    pub fn set_fault(&self, peer: &PeerId, fault: Option<PeerFault>) {
        match fault {
            Some(fault) => {
                self.inner.faults.insert(peer.clone(), fault);
            }
            None => {
                self.inner.faults.remove(peer);
            }
        }
    }

    /// Remove `peer`: pending and future `accept` calls on its transport
    /// return `None`, new streams to it fail.
    pub fn shutdown(&self, peer: &PeerId) {
        self.inner.nodes.remove(peer);
        self.inner.inbound.retain(|(owner, _), _| owner != peer);
        tracing::debug!("[rum-03] memory node {} left the network", peer);
    }

    pub fn stats(&self) -> Arc<StreamStats> {
        self.inner.stats.clone()
    }
}

/// One node's view of a [`MemoryNetwork`].
pub struct MemoryTransport {
    local: PeerId,
    network: Arc<NetworkInner>,
}

impl MemoryTransport {
    fn stream(&self, inner: DuplexStream, remote: PeerId) -> MemoryStream {
        MemoryStream {
            inner,
            remote,
            stats: self.network.stats.clone(),
        }
    }
}

#[async_trait]
impl StreamTransport for MemoryTransport {
    fn local_peer(&self) -> &PeerId {
        &self.local
    }

    async fn new_stream(
        &self,
        peer: &PeerId,
        protocol: &str,
    ) -> Result<Box<dyn RexStream>, ExchangeError> {
        if !self.network.nodes.contains_key(peer) {
            return Err(ExchangeError::Transport(format!("unknown peer {}", peer)));
        }
        let fault = self.network.faults.get(peer).map(|f| *f);
        match fault {
            Some(PeerFault::Unreachable) => {
                return Err(ExchangeError::Transport(format!("peer {} unreachable", peer)));
            }
            Some(PeerFault::Stalled) => std::future::pending::<()>().await,
            _ => {}
        }

        let (local_end, remote_end) = tokio::io::duplex(DUPLEX_BUFFER);
        let local: Box<dyn RexStream> = Box::new(self.stream(local_end, peer.clone()));
        self.network.stats.opened.fetch_add(1, Ordering::SeqCst);

        if fault == Some(PeerFault::DropsStreams) {
            drop(remote_end);
            return Ok(local);
        }

        let remote: Box<dyn RexStream> = Box::new(self.stream(remote_end, self.local.clone()));
        self.network
            .sender(peer, protocol)
            .send(remote)
            .map_err(|_| ExchangeError::Transport(format!("peer {} stopped accepting", peer)))?;
        Ok(local)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        self.network
            .links
            .get(&self.local)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn accept(&self, protocol: &str) -> Option<Box<dyn RexStream>> {
        if !self.network.nodes.contains_key(&self.local) {
            return None;
        }
        let rx = self.network.receiver(&self.local, protocol);
        let mut rx = rx.lock().await;
        rx.recv().await
    }
}

/// One end of an in-memory stream.
pub struct MemoryStream {
    inner: DuplexStream,
    remote: PeerId,
    stats: Arc<StreamStats>,
}

impl AsyncRead for MemoryStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MemoryStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let result = Pin::new(&mut this.inner).poll_shutdown(cx);
        if let Poll::Ready(Ok(())) = result {
            this.stats.closed.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

impl RexStream for MemoryStream {
    fn remote_peer(&self) -> &PeerId {
        &self.remote
    }

    fn reset(self: Box<Self>) {
        self.stats.reset.fetch_add(1, Ordering::SeqCst);
    }
}
