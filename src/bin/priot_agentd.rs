//! Minimal standalone harness that runs a [`priot::agent::Agent`] over an
//! in-memory [`priot::transport::MockTransport`] and answers SNMPv1/v2c
//! requests sent as classic BER-encoded messages.
//!
//! No production transport ships with this crate (see the `agent` feature
//! in `Cargo.toml`); this binary exists to exercise the agent end to end
//! without pulling in a socket dependency. It speaks just enough of RFC
//! 1157's message envelope (`SEQUENCE { version, community, pdu }`) to
//! round-trip GET/GETNEXT/GETBULK/SET against a couple of demonstration
//! scalars, since the crate otherwise only implements the PDU body.
//!
//! No argument parsing beyond environment variables: set `RUST_LOG` to
//! control verbosity (defaults to `info`).

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing_subscriber::EnvFilter;

use priot::agent::Agent;
use priot::ber::{Decoder, EncodeBuf};
use priot::eventmib::Engine;
use priot::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext, SecurityModel};
use priot::oid;
use priot::oid::Oid;
use priot::pdu::Pdu;
use priot::transport::{AgentTransport, MockTransport};
use priot::value::Value;
use priot::version::Version;

/// A counter that increments on every read, standing in for a live gauge
/// (e.g. `sysUpTime` or an interface counter) a real instrumentation module
/// would back with kernel state.
struct Counter {
    oid: Oid,
    value: Arc<AtomicI64>,
}

impl MibHandler for Counter {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        Box::pin(async move {
            if oid == &self.oid {
                GetResult::Value(Value::Counter32(
                    self.value.fetch_add(1, Ordering::Relaxed) as u32
                ))
            } else {
                GetResult::NoSuchObject
            }
        })
    }

    fn get_next<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
        Box::pin(async move {
            if oid < &self.oid {
                GetNextResult::Value(priot::varbind::VarBind::new(
                    self.oid.clone(),
                    Value::Counter32(self.value.fetch_add(1, Ordering::Relaxed) as u32),
                ))
            } else {
                GetNextResult::EndOfMibView
            }
        })
    }
}

/// Decode an RFC 1157 message: `SEQUENCE { version, community, pdu }`.
fn decode_message(data: &[u8]) -> priot::error::Result<(Version, Bytes, Pdu)> {
    let mut decoder = Decoder::new(Bytes::copy_from_slice(data));
    let mut body = decoder.read_sequence()?;
    let version = match body.read_integer()? {
        0 => Version::V1,
        1 => Version::V2c,
        other => {
            return Err(priot::error::Error::decode(
                0,
                priot::error::DecodeErrorKind::UnknownVersion(other),
            ));
        }
    };
    let community = body.read_octet_string()?;
    let pdu = Pdu::decode_tagged(&mut body)?;
    Ok((version, community, pdu))
}

/// Encode an RFC 1157 message envelope around `pdu`.
fn encode_message(version: Version, community: &[u8], pdu: &Pdu) -> Bytes {
    let mut buf = EncodeBuf::new();
    buf.push_sequence(|buf| {
        buf.push_integer(if version == Version::V1 { 0 } else { 1 });
        buf.push_octet_string(community);
        pdu.encode(buf);
    });
    buf.finish()
}

fn request_context(source: SocketAddr, version: Version, community: Bytes, pdu: &Pdu) -> RequestContext {
    RequestContext {
        source,
        version,
        security_model: match version {
            Version::V1 => SecurityModel::V1,
            _ => SecurityModel::V2c,
        },
        security_name: community,
        security_level: priot::message::SecurityLevel::NoAuthNoPriv,
        context_name: Bytes::new(),
        request_id: pdu.request_id,
        pdu_type: pdu.pdu_type,
        group_name: None,
        read_view: None,
        write_view: None,
    }
}

async fn serve(agent: Agent, transport: MockTransport) -> priot::error::Result<()> {
    loop {
        let (data, from) = transport.recv_from().await?;
        let (version, community, pdu) = match decode_message(&data) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(%from, %err, "dropping malformed message");
                continue;
            }
        };
        let ctx = request_context(from, version, community.clone(), &pdu);
        let response = match agent.dispatch(&ctx, &pdu).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%from, %err, "dispatch failed");
                Pdu::error_response(pdu.request_id, 5, 0, pdu.varbinds.clone())
            }
        };
        let encoded = encode_message(version, &community, &response);
        transport.send_to(&encoded, from).await?;
    }
}

async fn tick_event_engine(mut engine: Engine) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    loop {
        interval.tick().await;
        let actions = engine.tick(Instant::now()).await;
        for action in actions {
            tracing::info!(?action, "event-mib action fired");
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
    let sys_up_time = oid!(1, 3, 6, 1, 2, 1, 1, 3, 0);

    let agent = Agent::builder()
        .handler(
            sys_descr.clone(),
            StaticScalar {
                oid: sys_descr,
                value: Value::OctetString(Bytes::from_static(b"priot demonstration agent")),
            },
        )
        .handler(
            sys_up_time.clone(),
            Counter {
                oid: sys_up_time,
                value: Arc::new(AtomicI64::new(0)),
            },
        )
        .build();

    let listen: SocketAddr = "127.0.0.1:1161".parse().unwrap();
    let client: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let (server_transport, _client_transport) = MockTransport::pair(listen, client);

    tracing::info!(addr = %listen, "priot-agentd listening (in-memory transport, no socket bound)");

    let engine = Engine::new(agent.clone());
    tokio::spawn(tick_event_engine(engine));

    if let Err(err) = serve(agent, server_transport).await {
        tracing::error!(%err, "agent loop exited");
    }
}

struct StaticScalar {
    oid: Oid,
    value: Value,
}

impl MibHandler for StaticScalar {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        Box::pin(async move {
            if oid == &self.oid {
                GetResult::Value(self.value.clone())
            } else {
                GetResult::NoSuchObject
            }
        })
    }

    fn get_next<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
        Box::pin(async move {
            if oid < &self.oid {
                GetNextResult::Value(priot::varbind::VarBind::new(self.oid.clone(), self.value.clone()))
            } else {
                GetNextResult::EndOfMibView
            }
        })
    }
}
