//! Transport abstraction.
//!
//! The wire transport (UDP/TCP/Unix-domain sockets, the multiplexed I/O
//! loop that pumps them) is an external collaborator: [`Agent`](crate::agent::Agent)
//! is handed something implementing [`AgentTransport`] and never opens a
//! socket itself. [`MockTransport`] is an in-memory implementation used by
//! tests and the `priot-agentd` harness binary.

mod mock;

pub use mock::MockTransport;

use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::Result;

/// Agent-side transport abstraction (listener mode): receive a framed
/// message from any peer, send a framed message to a specific peer.
///
/// Framing (where a message starts/ends within a byte stream) is the
/// implementor's responsibility; for UDP this is free (one datagram, one
/// message), for TCP/AgentX it means respecting the length prefix in
/// whatever envelope the implementor speaks.
pub trait AgentTransport: Send + Sync {
    /// Receive the next message and the address it arrived from.
    fn recv_from(&self) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// Send a message to a specific peer.
    fn send_to(&self, data: &[u8], target: SocketAddr) -> impl Future<Output = Result<()>> + Send;

    /// The address this transport is bound to.
    fn local_addr(&self) -> SocketAddr;
}

/// Client-side transport abstraction: send a request, wait for the
/// correlated response.
pub trait Transport: Send + Sync + Clone {
    /// Send request data to the target.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Receive a response correlated to `request_id`, bounded by `timeout`.
    fn recv(
        &self,
        request_id: i32,
        timeout: Duration,
    ) -> impl Future<Output = Result<(Bytes, SocketAddr)>> + Send;

    /// The peer address for this transport.
    fn peer_addr(&self) -> SocketAddr;

    /// Local bind address.
    fn local_addr(&self) -> SocketAddr;

    /// Whether this is a stream transport (TCP/TLS); when false the caller
    /// retries on timeout.
    fn is_stream(&self) -> bool;
}
