//! The Disman Event-MIB trigger/event engine (§4.4).
//!
//! Three layers, grounded across the `Firmware/Plugin/disman/event/`
//! sources: [`trigger`] holds the pure existence/boolean/threshold
//! predicate state machines (`mteTriggerThresholdTable.c` and friends),
//! [`event`] holds the notification/set action builders and the four
//! hardcoded lifecycle events (`mteEvent.c`), and [`engine`] drives
//! scheduling and sampling against an in-process [`crate::agent::Agent`]
//! (`mteEvent_fire`'s callers).

pub mod engine;
pub mod event;
pub mod trigger;

pub use engine::{Action, Engine};
pub use event::Event;
pub use trigger::{RowStatus, Trigger};

use serde::{Deserialize, Serialize};

use crate::oid::Oid;
use crate::value::Value;

/// On-disk form of a non-`fixed` trigger row, persisted at shutdown and
/// reloaded at startup (§4.4 Persistence). `fixed` rows are never written
/// here since they're recreated by the binary that built them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedTrigger {
    pub owner: String,
    pub name: String,
    pub enabled: bool,
    pub frequency_secs: u64,
    pub monitored_oid: Vec<u32>,
    pub wildcarded: bool,
    pub delta: bool,
    pub discontinuity_oid: Option<Vec<u32>>,
    pub objects: Vec<Vec<u32>>,
    pub generic_event: Option<(String, String)>,
    pub rising_event: Option<(String, String)>,
    pub falling_event: Option<(String, String)>,
}

/// On-disk form of a non-`fixed` event row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedEvent {
    pub owner: String,
    pub name: String,
    pub enabled: bool,
    pub notify_trap_oid: Option<Vec<u32>>,
    pub notify_strict_order: bool,
    pub set_target_oid: Option<Vec<u32>>,
    pub set_value_oid_hint: Option<Vec<u32>>,
    pub set_append_instance_suffix: bool,
}

/// Serialize every non-`fixed` trigger currently loaded in `engine`, for
/// writing to the persistence directive file on shutdown.
pub fn persist_triggers(triggers: &[Trigger]) -> Vec<PersistedTrigger> {
    triggers
        .iter()
        .filter(|t| !t.fixed)
        .map(|t| PersistedTrigger {
            owner: t.owner.clone(),
            name: t.name.clone(),
            enabled: t.enabled,
            frequency_secs: t.frequency.as_secs(),
            monitored_oid: t.monitored_oid.arcs().to_vec(),
            wildcarded: t.wildcarded,
            delta: t.delta,
            discontinuity_oid: t.discontinuity_oid.as_ref().map(|o| o.arcs().to_vec()),
            objects: t.objects.iter().map(|o| o.arcs().to_vec()).collect(),
            generic_event: t.generic_event.clone(),
            rising_event: t.rising_event.clone(),
            falling_event: t.falling_event.clone(),
        })
        .collect()
}

/// Rebuild a trigger's static configuration from its persisted form. The
/// caller still needs to supply the test-kind (existence/boolean/threshold
/// parameters are persisted as part of the owning configuration layer, not
/// here, since they come from `mteTriggerConf`'s type-specific tables and
/// this struct only covers the fields common to every trigger row).
impl PersistedTrigger {
    pub fn monitored_oid(&self) -> Oid {
        Oid::from_slice(&self.monitored_oid)
    }

    pub fn discontinuity_oid(&self) -> Option<Oid> {
        self.discontinuity_oid.as_deref().map(Oid::from_slice)
    }

    pub fn objects(&self) -> Vec<Oid> {
        self.objects.iter().map(|o| Oid::from_slice(o)).collect()
    }
}

impl PersistedEvent {
    pub fn notify_trap_oid(&self) -> Option<Oid> {
        self.notify_trap_oid.as_deref().map(Oid::from_slice)
    }

    pub fn set_target_oid(&self) -> Option<Oid> {
        self.set_target_oid.as_deref().map(Oid::from_slice)
    }
}

/// A set action's configured value, reduced to a small serializable sum
/// type for persistence (the full [`Value`] enum carries variants, such as
/// `Opaque`, that don't roundtrip meaningfully through a config file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PersistedSetValue {
    Integer(i32),
    Unsigned(u32),
    OctetString(Vec<u8>),
}

impl PersistedSetValue {
    pub fn to_value(&self) -> Value {
        match self {
            PersistedSetValue::Integer(v) => Value::Integer(*v),
            PersistedSetValue::Unsigned(v) => Value::Gauge32(*v),
            PersistedSetValue::OctetString(v) => Value::OctetString(v.clone().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use std::time::Duration;
    use trigger::{BooleanOp, BooleanTest, TestKind};

    #[test]
    fn test_persist_roundtrips_monitored_oid() {
        let trigger = Trigger {
            owner: "owner".into(),
            name: "trig".into(),
            row_status: RowStatus::Active,
            enabled: true,
            frequency: Duration::from_secs(30),
            monitored_oid: oid!(1, 3, 6, 1, 4, 1, 1, 2, 0),
            wildcarded: false,
            delta: false,
            discontinuity_oid: None,
            test: TestKind::Boolean(BooleanTest {
                operator: BooleanOp::Gt,
                operand: 0,
                startup: false,
            }),
            fixed: false,
            objects: vec![oid!(1, 3, 6, 1, 4, 1, 1, 3, 0)],
            generic_event: Some(("owner".into(), "evt".into())),
            rising_event: None,
            falling_event: None,
        };
        let persisted = persist_triggers(std::slice::from_ref(&trigger));
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].monitored_oid(), trigger.monitored_oid);
        assert_eq!(persisted[0].objects(), trigger.objects);
    }

    #[test]
    fn test_fixed_triggers_are_not_persisted() {
        let trigger = Trigger {
            owner: "_builtin".into(),
            name: "internal".into(),
            row_status: RowStatus::Active,
            enabled: true,
            frequency: Duration::from_secs(30),
            monitored_oid: oid!(1, 3, 6, 1, 4, 1, 1, 2, 0),
            wildcarded: false,
            delta: false,
            discontinuity_oid: None,
            test: TestKind::Boolean(BooleanTest {
                operator: BooleanOp::Gt,
                operand: 0,
                startup: false,
            }),
            fixed: true,
            objects: Vec::new(),
            generic_event: None,
            rising_event: None,
            falling_event: None,
        };
        assert!(persist_triggers(&[trigger]).is_empty());
    }
}
