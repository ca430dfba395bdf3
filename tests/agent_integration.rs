//! End-to-end agent dispatch tests: registry + two-phase SET + config
//! overrides, exercised the way a transport would drive [`priot::Agent`].

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use priot::agent::Agent;
use priot::config::{AgentConfig, OverrideSpec};
use priot::handler::{BoxFuture, GetNextResult, GetResult, MibHandler, RequestContext, SetResult};
use priot::oid::Oid;
use priot::pdu::{Pdu, PduType};
use priot::value::Value;
use priot::varbind::VarBind;
use priot::{oid, Version};

use common::{nonexistent_oid, request_context, sys_descr};

struct WritableScalar {
    oid: Oid,
    value: Arc<AtomicI32>,
}

impl MibHandler for WritableScalar {
    fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
        Box::pin(async move {
            if oid == &self.oid {
                GetResult::Value(Value::Integer(self.value.load(Ordering::SeqCst)))
            } else {
                GetResult::NoSuchObject
            }
        })
    }

    fn get_next<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
        Box::pin(async move {
            if oid < &self.oid {
                GetNextResult::Value(VarBind::new(
                    self.oid.clone(),
                    Value::Integer(self.value.load(Ordering::SeqCst)),
                ))
            } else {
                GetNextResult::EndOfMibView
            }
        })
    }

    fn test_set<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid, value: &'a Value) -> BoxFuture<'a, SetResult> {
        Box::pin(async move {
            if oid != &self.oid {
                SetResult::NotWritable
            } else if matches!(value, Value::Integer(_)) {
                SetResult::Ok
            } else {
                SetResult::WrongType
            }
        })
    }

    fn commit_set<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid, value: &'a Value) -> BoxFuture<'a, SetResult> {
        Box::pin(async move {
            if oid != &self.oid {
                return SetResult::NotWritable;
            }
            if let Value::Integer(v) = value {
                self.value.store(*v, Ordering::SeqCst);
            }
            SetResult::Ok
        })
    }
}

fn request(pdu_type: PduType, oids: &[Oid]) -> Pdu {
    Pdu {
        pdu_type,
        request_id: 1,
        varbinds: oids.iter().cloned().map(VarBind::null).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_set_round_trip_through_dispatch() {
    let counter_oid = oid!(1, 3, 6, 1, 4, 1, 12345, 1, 0);
    let counter = Arc::new(AtomicI32::new(0));
    let agent = Agent::builder()
        .handler(
            oid!(1, 3, 6, 1, 4, 1, 12345, 1),
            WritableScalar { oid: counter_oid.clone(), value: counter.clone() },
        )
        .build();

    let ctx = request_context(Version::V2c, b"public");

    let set_req = Pdu {
        pdu_type: PduType::SetRequest,
        request_id: 1,
        varbinds: vec![VarBind::new(counter_oid.clone(), Value::Integer(77))],
        ..Default::default()
    };
    let resp = agent.dispatch(&ctx, &set_req).await.unwrap();
    assert_eq!(resp.error_status, 0);
    assert_eq!(counter.load(Ordering::SeqCst), 77);

    let get_req = request(PduType::GetRequest, &[counter_oid]);
    let resp = agent.dispatch(&ctx, &get_req).await.unwrap();
    assert_eq!(resp.varbinds[0].value, Value::Integer(77));
}

#[tokio::test]
async fn test_unconfigured_oid_reports_no_such_object() {
    let agent = Agent::builder().build();
    let ctx = request_context(Version::V2c, b"public");
    let req = request(PduType::GetRequest, &[nonexistent_oid()]);
    let resp = agent.dispatch(&ctx, &req).await.unwrap();
    assert_eq!(resp.varbinds[0].value, Value::NoSuchObject);
}

#[tokio::test]
async fn test_config_override_takes_precedence_and_rejects_writes() {
    let agent = Agent::builder()
        .handler(
            oid!(1, 3, 6, 1, 2, 1, 1),
            WritableScalar { oid: sys_descr(), value: Arc::new(AtomicI32::new(0)) },
        )
        .build();

    agent
        .apply_config(&AgentConfig {
            overrides: vec![OverrideSpec {
                oid: sys_descr(),
                value: Value::OctetString("overridden agent".into()),
                writable: false,
            }],
            ..Default::default()
        })
        .unwrap();

    let ctx = request_context(Version::V2c, b"public");
    let resp = agent.dispatch(&ctx, &request(PduType::GetRequest, &[sys_descr()])).await.unwrap();
    assert_eq!(resp.varbinds[0].value, Value::OctetString("overridden agent".into()));

    let set_req = Pdu {
        pdu_type: PduType::SetRequest,
        request_id: 1,
        varbinds: vec![VarBind::new(sys_descr(), Value::OctetString("nope".into()))],
        ..Default::default()
    };
    let resp = agent.dispatch(&ctx, &set_req).await.unwrap();
    assert_ne!(resp.error_status, 0);
}
