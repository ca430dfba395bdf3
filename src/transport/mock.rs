//! In-memory transport for tests and the `priot-agentd` harness binary.
//!
//! A [`MockTransport`] is one endpoint of a pair wired together by
//! [`MockTransport::pair`]; sending on one delivers to the other's receive
//! queue. This lets integration tests drive a master + subagent session (or
//! a manager + agent exchange) without opening a real socket, mirroring the
//! teacher's in-memory duplex-stream test harness.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::error::{Error, Result};
use crate::transport::{AgentTransport, Transport};

struct Envelope {
    data: Bytes,
    from: SocketAddr,
}

/// Shared routing table: every `MockTransport` registers its inbound queue
/// here under its bound address so peers can address it by `SocketAddr`.
#[derive(Default)]
struct Switch {
    inboxes: HashMap<SocketAddr, mpsc::UnboundedSender<Envelope>>,
}

/// An in-memory, address-routed transport endpoint.
#[derive(Clone)]
pub struct MockTransport {
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    switch: Arc<Mutex<Switch>>,
    inbox: Arc<AsyncMutex<mpsc::UnboundedReceiver<Envelope>>>,
}

impl MockTransport {
    /// Create two endpoints wired to each other, as if `addr_a` and
    /// `addr_b` were UDP sockets on a shared loopback switch.
    pub fn pair(addr_a: SocketAddr, addr_b: SocketAddr) -> (Self, Self) {
        let switch = Arc::new(Mutex::new(Switch::default()));
        let a = Self::register(switch.clone(), addr_a, addr_b);
        let b = Self::register(switch, addr_b, addr_a);
        (a, b)
    }

    fn register(switch: Arc<Mutex<Switch>>, local: SocketAddr, peer: SocketAddr) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        switch.lock().unwrap().inboxes.insert(local, tx);
        Self {
            local_addr: local,
            peer_addr: peer,
            switch,
            inbox: Arc::new(AsyncMutex::new(rx)),
        }
    }

    /// Add another endpoint to this transport's switch, addressable by
    /// `addr`, useful for simulating a master fanning out to several
    /// subagents over the same in-memory network.
    pub fn join(&self, addr: SocketAddr, peer: SocketAddr) -> Self {
        Self::register(self.switch.clone(), addr, peer)
    }

    fn deliver(&self, target: SocketAddr, data: &[u8]) -> Result<()> {
        let switch = self.switch.lock().unwrap();
        let tx = switch
            .inboxes
            .get(&target)
            .ok_or_else(|| Error::Io {
                target: Some(target),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no mock transport registered at {target}"),
                ),
            })?;
        tx.send(Envelope {
            data: Bytes::copy_from_slice(data),
            from: self.local_addr,
        })
        .map_err(|_| Error::Io {
            target: Some(target),
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "peer inbox closed"),
        })
    }
}

impl AgentTransport for MockTransport {
    async fn recv_from(&self) -> Result<(Bytes, SocketAddr)> {
        let mut rx = self.inbox.lock().await;
        let envelope = rx.recv().await.ok_or_else(|| Error::Io {
            target: None,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock transport closed"),
        })?;
        Ok((envelope.data, envelope.from))
    }

    async fn send_to(&self, data: &[u8], target: SocketAddr) -> Result<()> {
        self.deliver(target, data)
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        self.deliver(self.peer_addr, data)
    }

    async fn recv(&self, _request_id: i32, timeout: Duration) -> Result<(Bytes, SocketAddr)> {
        tokio::time::timeout(timeout, self.recv_from())
            .await
            .map_err(|_| Error::Timeout {
                target: Some(self.peer_addr),
                elapsed: timeout,
                request_id: _request_id,
                retries: 0,
            })?
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    fn is_stream(&self) -> bool {
        false
    }
}
