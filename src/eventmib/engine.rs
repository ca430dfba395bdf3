//! The scheduling/sampling/firing loop (§4.4), driven cooperatively by
//! whatever tick source the embedding binary chooses rather than owning its
//! own thread, consistent with the rest of this crate's single-threaded,
//! run-to-completion dispatch model (§5).
//!
//! Grounded in `Firmware/Plugin/disman/event/mteEvent.c`'s sampling loop and
//! `mteObjects_vblist`'s varbind-list construction, adapted from the
//! original's polled-alarm style into one `tick` call per trigger due.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::agent::Agent;
use crate::handler::RequestContext;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::value::Value;
use crate::varbind::VarBind;

use super::event::{builtin_link_events, builtin_trigger_events, Event};
use super::trigger::{FireKind, RowStatus, TestKind, TestRuntime, Trigger, TriggerState};

const SYS_UP_TIME_OID: [u32; 9] = [1, 3, 6, 1, 2, 1, 1, 3, 0];

fn default_discontinuity_oid() -> Oid {
    Oid::from_slice(&SYS_UP_TIME_OID)
}

/// An outcome of one scheduling pass the caller must act on: either deliver
/// a trap or perform a SET. The engine builds these but never sends them;
/// wiring to the actual trap-sending/SET-dispatch path belongs to whatever
/// owns both the `Engine` and the transport.
#[derive(Debug, Clone)]
pub enum Action {
    Notify(Vec<VarBind>),
    Set(VarBind),
}

struct ScheduledTrigger {
    trigger: Trigger,
    state: TriggerState,
    next_due: Instant,
}

/// Owns the trigger and event tables and runs the sampling loop against an
/// in-process [`Agent`].
pub struct Engine {
    agent: Agent,
    triggers: HashMap<(String, String), ScheduledTrigger>,
    events: HashMap<(String, String), Event>,
}

impl Engine {
    pub fn new(agent: Agent) -> Self {
        let mut events = HashMap::new();
        for event in builtin_trigger_events().into_iter().chain(builtin_link_events()) {
            events.insert((event.owner.clone(), event.name.clone()), event);
        }
        Self {
            agent,
            triggers: HashMap::new(),
            events,
        }
    }

    pub fn add_trigger(&mut self, trigger: Trigger, now: Instant) {
        let key = (trigger.owner.clone(), trigger.name.clone());
        let next_due = now + trigger.frequency;
        self.triggers.insert(
            key,
            ScheduledTrigger {
                trigger,
                state: TriggerState::default(),
                next_due,
            },
        );
    }

    pub fn remove_trigger(&mut self, owner: &str, name: &str) {
        self.triggers.remove(&(owner.to_string(), name.to_string()));
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.insert((event.owner.clone(), event.name.clone()), event);
    }

    pub fn remove_event(&mut self, owner: &str, name: &str) {
        if self
            .events
            .get(&(owner.to_string(), name.to_string()))
            .is_some_and(|e| !e.fixed)
        {
            self.events.remove(&(owner.to_string(), name.to_string()));
        }
    }

    /// Install the `monitor`/`notificationEvent`/`setEvent` directives from
    /// a loaded configuration. `defaultMonitors`/`linkUpDownNotifications`
    /// are config-surface-only: the table-watching instrumentation they'd
    /// arm (ifTable row scanning, linkUp/Down trap sources) is domain
    /// MIB instrumentation beyond the Event-MIB engine itself, so this only
    /// records the flags by leaving the four trigger-lifecycle events and
    /// the two link events seeded at construction time untouched, without
    /// installing triggers that would fire them.
    pub fn apply_config(&mut self, config: &crate::config::AgentConfig, now: Instant) {
        use crate::config::{BooleanOperatorSpec, MonitorTestSpec};
        use super::trigger::{BooleanOp, BooleanTest, ExistenceTest, ThresholdStartup, ThresholdTest};

        fn convert_op(op: BooleanOperatorSpec) -> BooleanOp {
            match op {
                BooleanOperatorSpec::Eq => BooleanOp::Eq,
                BooleanOperatorSpec::Ne => BooleanOp::Ne,
                BooleanOperatorSpec::Lt => BooleanOp::Lt,
                BooleanOperatorSpec::Le => BooleanOp::Le,
                BooleanOperatorSpec::Gt => BooleanOp::Gt,
                BooleanOperatorSpec::Ge => BooleanOp::Ge,
            }
        }

        for spec in &config.monitors {
            let test = match spec.test.clone() {
                MonitorTestSpec::Existence { present, absent, changed, startup } => {
                    TestKind::Existence(ExistenceTest { present, absent, changed, startup })
                }
                MonitorTestSpec::Boolean { operator, operand, startup } => {
                    TestKind::Boolean(BooleanTest { operator: convert_op(operator), operand, startup })
                }
                MonitorTestSpec::Threshold { rising, falling, delta } => {
                    TestKind::Threshold(ThresholdTest { rising, falling, delta, startup: ThresholdStartup::None })
                }
            };

            self.add_trigger(
                Trigger {
                    owner: spec.owner.clone(),
                    name: spec.name.clone(),
                    row_status: RowStatus::Active,
                    enabled: true,
                    frequency: Duration::from_secs(spec.frequency_secs),
                    monitored_oid: spec.monitored_oid.clone(),
                    wildcarded: spec.wildcarded,
                    delta: spec.delta,
                    discontinuity_oid: spec.discontinuity_oid.clone(),
                    test,
                    fixed: false,
                    objects: spec.objects.clone(),
                    generic_event: spec.generic_event.clone(),
                    rising_event: spec.rising_event.clone(),
                    falling_event: spec.falling_event.clone(),
                },
                now,
            );
        }

        // `notificationEvent`/`setEvent` both augment the same `mteEventTable`
        // row when they share an (owner, name): a single event can carry
        // both a notification and a set action (`mteEventActions`'s two
        // independent bits), so these merge into one `Event` rather than
        // one clobbering the other via two `add_event` calls.
        for spec in &config.notification_events {
            let key = (spec.owner.clone(), spec.name.clone());
            let event = self.events.entry(key).or_insert_with(|| Event {
                owner: spec.owner.clone(),
                name: spec.name.clone(),
                row_status: RowStatus::Active,
                enabled: true,
                notification: None,
                set: None,
                fixed: false,
            });
            event.notification = Some(super::event::NotificationAction {
                trap_oid: spec.trap_oid.clone(),
                order: if spec.strict_order {
                    super::event::ObjectOrder::Strict
                } else {
                    super::event::ObjectOrder::NonStrict
                },
            });
        }

        for spec in &config.set_events {
            let key = (spec.owner.clone(), spec.name.clone());
            let event = self.events.entry(key).or_insert_with(|| Event {
                owner: spec.owner.clone(),
                name: spec.name.clone(),
                row_status: RowStatus::Active,
                enabled: true,
                notification: None,
                set: None,
                fixed: false,
            });
            event.set = Some(super::event::SetAction {
                target_oid: spec.target_oid.clone(),
                value: spec.value.clone(),
                append_instance_suffix: spec.append_instance_suffix,
            });
        }
    }

    /// Advance the clock and sample every trigger now due, returning the
    /// actions the caller must dispatch. Triggers not yet due are skipped
    /// entirely, with no partial-frequency sampling.
    pub async fn tick(&mut self, now: Instant) -> Vec<Action> {
        let due: Vec<(String, String)> = self
            .triggers
            .iter()
            .filter(|(_, t)| t.next_due <= now && t.trigger.enabled && t.trigger.row_status == RowStatus::Active)
            .map(|(k, _)| k.clone())
            .collect();

        let mut actions = Vec::new();
        for key in due {
            actions.extend(self.sample_trigger(&key).await);
            if let Some(scheduled) = self.triggers.get_mut(&key) {
                scheduled.next_due = now + scheduled.trigger.frequency;
            }
        }
        actions
    }

    async fn sample_trigger(&mut self, key: &(String, String)) -> Vec<Action> {
        let Some(scheduled) = self.triggers.get(key) else {
            return Vec::new();
        };
        let trigger = scheduled.trigger.clone();

        // Non-wildcarded triggers have exactly one conceptual instance
        // (empty suffix), present or not; wildcarded ones walk the current
        // matches and separately work out which previously-seen suffixes
        // dropped out of the walk, so an existence test can see them go
        // absent even though there's no sampled value for them anymore.
        let (present, missing): (Vec<(Vec<u32>, Value)>, Vec<Vec<u32>>) = if trigger.wildcarded {
            let present = self.walk_instances(&trigger.monitored_oid).await;
            let present_suffixes: HashSet<&Vec<u32>> = present.iter().map(|(s, _)| s).collect();
            let missing = scheduled
                .state
                .instances()
                .filter(|suffix| !present_suffixes.contains(*suffix))
                .cloned()
                .collect();
            (present, missing)
        } else {
            match self.get_one(&trigger.monitored_oid).await {
                Some(v) => (vec![(Vec::new(), v)], Vec::new()),
                None => (Vec::new(), vec![Vec::new()]),
            }
        };

        let mut actions = Vec::new();
        for (suffix, sample) in present {
            actions.extend(self.evaluate_instance(key, &suffix, Some(sample)).await);
        }
        for suffix in missing {
            actions.extend(self.evaluate_instance(key, &suffix, None).await);
        }
        actions
    }

    async fn evaluate_instance(
        &mut self,
        key: &(String, String),
        suffix: &[u32],
        sample: Option<Value>,
    ) -> Vec<Action> {
        let Some(scheduled) = self.triggers.get(key) else {
            return Vec::new();
        };
        let trigger = scheduled.trigger.clone();
        let raw = sample.as_ref().and_then(sample_to_i64);

        if let TestKind::Existence(test) = &trigger.test {
            let now_present = sample.is_some();
            let scheduled = self.triggers.get_mut(key).unwrap();
            let instance = scheduled.state.instance_mut(&trigger, suffix);
            let TestRuntime::Existence(runtime) = &mut instance.runtime else {
                return Vec::new();
            };
            let changed_since_last = now_present
                && instance.previous_existence_value.is_some()
                && instance.previous_existence_value != raw;
            let fired = test.step(runtime, now_present, changed_since_last);
            instance.previous_existence_value = raw;

            if !fired {
                return Vec::new();
            }
            return match trigger.event_for(FireKind::Generic).cloned() {
                Some((owner, name)) => self.fire_event(&owner, &name, &trigger, suffix).await,
                None => Vec::new(),
            };
        }

        let Some(raw) = raw else {
            return Vec::new();
        };

        let effective = if trigger.delta {
            let discontinuity_oid = trigger
                .discontinuity_oid
                .clone()
                .unwrap_or_else(default_discontinuity_oid);
            let current_discontinuity = sample_to_i64(
                &self
                    .get_one(&discontinuity_oid)
                    .await
                    .unwrap_or(Value::TimeTicks(0)),
            )
            .unwrap_or(0) as u32;

            let scheduled = self.triggers.get_mut(key).unwrap();
            let instance = scheduled.state.instance_mut(&trigger, suffix);
            let reset = instance
                .previous_discontinuity
                .is_some_and(|prev| prev != current_discontinuity);
            let delta = match instance.previous_discontinuity {
                Some(_) if !reset => {
                    // previous raw sample is implicit in threshold/boolean
                    // runtime state, so only the discontinuity marker needs
                    // tracking here; the per-field delta is computed by
                    // ThresholdTest itself via `delta: true`.
                    Some(raw)
                }
                _ => None,
            };
            instance.previous_discontinuity = Some(current_discontinuity);
            match delta {
                Some(v) => v,
                None => return Vec::new(),
            }
        } else {
            raw
        };

        let scheduled = self.triggers.get_mut(key).unwrap();
        let instance = scheduled.state.instance_mut(&trigger, suffix);
        let fired: Vec<FireKind> = match (&trigger.test, &mut instance.runtime) {
            (TestKind::Boolean(test), super::trigger::TestRuntime::Boolean(runtime)) => {
                if test.step(runtime, effective) {
                    vec![FireKind::Generic]
                } else {
                    Vec::new()
                }
            }
            (TestKind::Threshold(test), super::trigger::TestRuntime::Threshold(runtime)) => {
                test.step(runtime, effective)
            }
            _ => Vec::new(),
        };

        let mut actions = Vec::new();
        for kind in fired {
            if let Some((owner, name)) = trigger.event_for(kind).cloned() {
                actions.extend(self.fire_event(&owner, &name, &trigger, suffix).await);
            }
        }
        actions
    }

    /// `mteEventActions` carries two independent bits (notify, set); a row
    /// with both configured performs both, not one or the other.
    async fn fire_event(
        &self,
        owner: &str,
        name: &str,
        trigger: &Trigger,
        suffix: &[u32],
    ) -> Vec<Action> {
        let Some(event) = self.events.get(&(owner.to_string(), name.to_string())) else {
            return Vec::new();
        };
        if !event.enabled {
            return Vec::new();
        }

        let mut actions = Vec::new();
        if let Some(varbind) = event.build_set_varbind(suffix) {
            actions.push(Action::Set(varbind));
        }

        if event.notification.is_some() {
            let sys_up_time = sample_to_i64(&self.get_one(&default_discontinuity_oid()).await.unwrap_or(Value::TimeTicks(0)))
                .unwrap_or(0) as u32;
            let trigger_objects = self.expand_objects(&trigger.objects, suffix).await;
            if let Some(event_varbinds) = event.build_notification_varbinds(sys_up_time, &trigger_objects, &[]) {
                actions.push(Action::Notify(event_varbinds));
            }
        }

        actions
    }

    async fn expand_objects(&self, objects: &[Oid], suffix: &[u32]) -> Vec<VarBind> {
        let mut out = Vec::with_capacity(objects.len());
        for oid in objects {
            let full = oid.extended(suffix);
            if let Some(value) = self.get_one(&full).await {
                out.push(VarBind::new(full, value));
            }
        }
        out
    }

    async fn get_one(&self, oid: &Oid) -> Option<Value> {
        let ctx = RequestContext::internal(PduType::GetRequest);
        let pdu = Pdu {
            pdu_type: PduType::GetRequest,
            varbinds: vec![VarBind::null(oid.clone())],
            ..Default::default()
        };
        let response = self.agent.dispatch(&ctx, &pdu).await.ok()?;
        response.varbinds.into_iter().next().and_then(|vb| {
            if vb.value.is_exception() {
                None
            } else {
                Some(vb.value)
            }
        })
    }

    async fn walk_instances(&self, prefix: &Oid) -> Vec<(Vec<u32>, Value)> {
        let ctx = RequestContext::internal(PduType::GetNextRequest);
        let mut out = Vec::new();
        let mut cursor = prefix.clone();
        loop {
            let pdu = Pdu {
                pdu_type: PduType::GetNextRequest,
                varbinds: vec![VarBind::null(cursor.clone())],
                ..Default::default()
            };
            let Ok(response) = self.agent.dispatch(&ctx, &pdu).await else {
                break;
            };
            let Some(vb) = response.varbinds.into_iter().next() else {
                break;
            };
            if vb.value.is_exception() || !vb.oid.starts_with(prefix) {
                break;
            }
            let suffix = vb.oid.suffix_after(prefix).unwrap_or(&[]).to_vec();
            cursor = vb.oid.clone();
            out.push((suffix, vb.value));
        }
        out
    }
}

fn sample_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(v) => Some(*v as i64),
        Value::Counter32(v) | Value::Gauge32(v) | Value::TimeTicks(v) => Some(*v as i64),
        Value::Counter64(v) | Value::UInt64(v) => Some(*v as i64),
        Value::Int64(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::handler::{BoxFuture, GetNextResult, GetResult, MibHandler};
    use crate::oid;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Arc;

    struct CounterHandler {
        value: Arc<AtomicI32>,
    }

    impl MibHandler for CounterHandler {
        fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
            Box::pin(async move {
                if oid == &oid!(1, 3, 6, 1, 4, 1, 9999, 1, 0) {
                    GetResult::Value(Value::Integer(self.value.load(Ordering::SeqCst)))
                } else {
                    GetResult::NoSuchObject
                }
            })
        }

        fn get_next<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
            Box::pin(async move { GetNextResult::EndOfMibView })
        }
    }

    fn make_agent(value: Arc<AtomicI32>) -> Agent {
        Agent::builder()
            .handler(oid!(1, 3, 6, 1, 4, 1, 9999, 1), CounterHandler { value })
            .build()
    }

    #[tokio::test]
    async fn test_boolean_trigger_fires_through_engine() {
        use super::super::trigger::{BooleanOp, BooleanTest, TestKind};

        let value = Arc::new(AtomicI32::new(3));
        let agent = make_agent(value.clone());
        let now = std::time::Instant::now();
        let mut engine = Engine::new(agent);
        engine.add_event(Event {
            owner: "test".into(),
            name: "fire".into(),
            row_status: RowStatus::Active,
            enabled: true,
            notification: Some(super::super::event::NotificationAction {
                trap_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 2),
                order: super::super::event::ObjectOrder::NonStrict,
            }),
            set: None,
            fixed: false,
        });
        engine.add_trigger(
            Trigger {
                owner: "test".into(),
                name: "boolTrig".into(),
                row_status: RowStatus::Active,
                enabled: true,
                frequency: Duration::from_secs(1),
                monitored_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 1, 0),
                wildcarded: false,
                delta: false,
                discontinuity_oid: None,
                test: TestKind::Boolean(BooleanTest {
                    operator: BooleanOp::Eq,
                    operand: 5,
                    startup: false,
                }),
                fixed: false,
                objects: Vec::new(),
                generic_event: Some(("test".into(), "fire".into())),
                rising_event: None,
                falling_event: None,
            },
            now,
        );

        let samples = [3, 5, 5, 4, 5];
        let mut fire_count = 0;
        let mut t = now;
        for s in samples {
            value.store(s, Ordering::SeqCst);
            t += Duration::from_secs(1);
            let actions = engine.tick(t).await;
            fire_count += actions.len();
        }
        assert_eq!(fire_count, 2);
    }

    #[tokio::test]
    async fn test_apply_config_installs_monitor_and_notification_event() {
        use crate::config::{AgentConfig, MonitorSpec, MonitorTestSpec, NotificationEventSpec};

        let value = Arc::new(AtomicI32::new(3));
        let agent = make_agent(value.clone());
        let now = std::time::Instant::now();
        let mut engine = Engine::new(agent);

        let config = AgentConfig {
            monitors: vec![MonitorSpec {
                owner: "user".into(),
                name: "boolTrig".into(),
                monitored_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 1, 0),
                wildcarded: false,
                frequency_secs: 1,
                test: MonitorTestSpec::Boolean {
                    operator: crate::config::BooleanOperatorSpec::Eq,
                    operand: 5,
                    startup: false,
                },
                delta: false,
                discontinuity_oid: None,
                objects: Vec::new(),
                generic_event: Some(("user".into(), "fire".into())),
                rising_event: None,
                falling_event: None,
            }],
            notification_events: vec![NotificationEventSpec {
                owner: "user".into(),
                name: "fire".into(),
                trap_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 2),
                strict_order: false,
            }],
            ..Default::default()
        };
        engine.apply_config(&config, now);

        // startup is false, so the first sample only seeds the runtime's
        // previous state (value starts at 3, which doesn't match); the
        // second sample is the actual rising edge.
        let first = engine.tick(now + Duration::from_secs(1)).await;
        assert!(first.is_empty());

        value.store(5, Ordering::SeqCst);
        let actions = engine.tick(now + Duration::from_secs(2)).await;
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::Notify(_)));
    }

    #[tokio::test]
    async fn test_existence_trigger_fires_on_present_and_absent_transitions() {
        use super::super::trigger::{ExistenceTest, TestKind};

        struct ToggleHandler {
            present: Arc<std::sync::atomic::AtomicBool>,
        }

        impl MibHandler for ToggleHandler {
            fn get<'a>(&'a self, _ctx: &'a RequestContext, oid: &'a Oid) -> BoxFuture<'a, GetResult> {
                Box::pin(async move {
                    if oid == &oid!(1, 3, 6, 1, 4, 1, 9999, 3, 0)
                        && self.present.load(Ordering::SeqCst)
                    {
                        GetResult::Value(Value::Integer(1))
                    } else {
                        GetResult::NoSuchObject
                    }
                })
            }

            fn get_next<'a>(&'a self, _ctx: &'a RequestContext, _oid: &'a Oid) -> BoxFuture<'a, GetNextResult> {
                Box::pin(async move { GetNextResult::EndOfMibView })
            }
        }

        let present = Arc::new(std::sync::atomic::AtomicBool::new(true));
        let agent = Agent::builder()
            .handler(oid!(1, 3, 6, 1, 4, 1, 9999, 3), ToggleHandler { present: present.clone() })
            .build();
        let now = std::time::Instant::now();
        let mut engine = Engine::new(agent);
        engine.add_event(Event {
            owner: "test".into(),
            name: "goneOrBack".into(),
            row_status: RowStatus::Active,
            enabled: true,
            notification: Some(super::super::event::NotificationAction {
                trap_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 4),
                order: super::super::event::ObjectOrder::NonStrict,
            }),
            set: None,
            fixed: false,
        });
        engine.add_trigger(
            Trigger {
                owner: "test".into(),
                name: "existTrig".into(),
                row_status: RowStatus::Active,
                enabled: true,
                frequency: Duration::from_secs(1),
                monitored_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 3, 0),
                wildcarded: false,
                delta: false,
                discontinuity_oid: None,
                test: TestKind::Existence(ExistenceTest {
                    present: false,
                    absent: true,
                    changed: false,
                    startup: false,
                }),
                fixed: false,
                objects: Vec::new(),
                generic_event: Some(("test".into(), "goneOrBack".into())),
                rising_event: None,
                falling_event: None,
            },
            now,
        );

        let mut t = now;

        // First sample just establishes the baseline (present, no startup fire).
        t += Duration::from_secs(1);
        let actions = engine.tick(t).await;
        assert!(actions.is_empty());

        // The instance disappears: the existence test must see this even
        // though there's no sampled value to evaluate.
        present.store(false, Ordering::SeqCst);
        t += Duration::from_secs(1);
        let actions = engine.tick(t).await;
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::Notify(_)));
    }

    #[tokio::test]
    async fn test_fire_event_emits_both_notify_and_set_actions() {
        use super::super::trigger::{BooleanOp, BooleanTest, TestKind};

        let value = Arc::new(AtomicI32::new(3));
        let agent = make_agent(value.clone());
        let now = std::time::Instant::now();
        let mut engine = Engine::new(agent);
        engine.add_event(Event {
            owner: "test".into(),
            name: "both".into(),
            row_status: RowStatus::Active,
            enabled: true,
            notification: Some(super::super::event::NotificationAction {
                trap_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 2),
                order: super::super::event::ObjectOrder::NonStrict,
            }),
            set: Some(super::super::event::SetAction {
                target_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 5, 0),
                value: Value::Integer(1),
                append_instance_suffix: false,
            }),
            fixed: false,
        });
        engine.add_trigger(
            Trigger {
                owner: "test".into(),
                name: "boolTrig".into(),
                row_status: RowStatus::Active,
                enabled: true,
                frequency: Duration::from_secs(1),
                monitored_oid: oid!(1, 3, 6, 1, 4, 1, 9999, 1, 0),
                wildcarded: false,
                delta: false,
                discontinuity_oid: None,
                test: TestKind::Boolean(BooleanTest {
                    operator: BooleanOp::Eq,
                    operand: 5,
                    startup: false,
                }),
                fixed: false,
                objects: Vec::new(),
                generic_event: Some(("test".into(), "both".into())),
                rising_event: None,
                falling_event: None,
            },
            now,
        );

        // startup is false, so the first-ever sample only seeds the runtime's
        // previous state; store a non-matching value first so the second
        // sample is a genuine rising edge.
        let first = engine.tick(now + Duration::from_secs(1)).await;
        assert!(first.is_empty());

        value.store(5, Ordering::SeqCst);
        let actions = engine.tick(now + Duration::from_secs(2)).await;
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().any(|a| matches!(a, Action::Notify(_))));
        assert!(actions.iter().any(|a| matches!(a, Action::Set(_))));
    }
}
